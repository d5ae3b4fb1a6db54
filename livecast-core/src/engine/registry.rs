//! Lazily created engine instance

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use super::StreamingEngine;
use crate::error::Result;

type EngineFactory = Box<dyn Fn() -> Result<Arc<dyn StreamingEngine>> + Send + Sync>;

/// Creates the engine on first use and hands out the same instance until
/// disposed
pub struct InstanceRegistry {
    factory: EngineFactory,
    instance: Mutex<Option<Arc<dyn StreamingEngine>>>,
}

impl InstanceRegistry {
    /// Create a registry with an engine factory
    pub fn new(
        factory: impl Fn() -> Result<Arc<dyn StreamingEngine>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            instance: Mutex::new(None),
        }
    }

    /// Get the engine, creating it if needed
    pub fn get(&self) -> Result<Arc<dyn StreamingEngine>> {
        let mut instance = self.instance.lock();
        if let Some(engine) = instance.as_ref() {
            return Ok(engine.clone());
        }

        let engine = (self.factory)()?;
        info!("Streaming engine created");
        *instance = Some(engine.clone());
        Ok(engine)
    }

    /// Whether an engine currently exists
    pub fn is_created(&self) -> bool {
        self.instance.lock().is_some()
    }

    /// Forget the current engine; the next `get` creates a new one
    pub fn dispose(&self) {
        if self.instance.lock().take().is_some() {
            info!("Streaming engine released");
        }
    }
}
