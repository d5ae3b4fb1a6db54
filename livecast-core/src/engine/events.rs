//! Event fan-out for engine implementations

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use super::{EngineEvent, EngineFault};

/// Delivers engine events to every subscriber in emission order
///
/// Channels are unbounded so a slow subscriber never loses events.
#[derive(Default)]
pub struct EngineEventHub {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<EngineEvent>>>,
}

impl EngineEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Send an event to all live subscribers, dropping closed ones
    pub fn emit(&self, event: EngineEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        trace!("Engine event {:?} sent to {} subscriber(s)", event, subscribers.len());
    }

    /// Emit an error event
    pub fn emit_error(&self, message: impl Into<String>) {
        self.emit(EngineEvent::Error(Some(EngineFault::new(message))));
    }

    /// Emit a streaming-state event
    pub fn emit_streaming(&self, streaming: bool) {
        self.emit(EngineEvent::StreamingChanged(streaming));
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}
