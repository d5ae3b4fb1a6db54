//! Live stream session controller
//!
//! Owns one streaming engine and enforces the session state machine:
//!
//! ```text
//! Idle ──setVideoConfig──▶ Configured ──startPreview──▶ Previewing
//!                              │                            │
//!                              └────────startStream─────────┴──▶ Streaming
//!                                                                  │
//!                    any state ──dispose──▶ Disposed ◀─────────────┘
//! ```
//!
//! Previewing and streaming are independent flags. Every operation runs
//! under one session lock, which doubles as the serialization queue for
//! callers and for the engine event relay. Engine events are applied in
//! emission order: each operation first applies whatever the engine has
//! emitted so far, and the relay task applies events that arrive while the
//! session is idle.

use parking_lot::Mutex as SyncMutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::{AudioConfig, VideoConfig};
use crate::destination::mask_stream_url;
use crate::engine::{EngineEvent, StreamingEngine};
use crate::error::{LivecastError, Result};
use crate::permission::{Permission, PermissionGate};
use crate::surface::{PreviewTarget, SurfaceAllocator};
use crate::types::{Handle, SessionEvent, SessionPhase};

/// Receives caller-visible session outcomes
pub trait SessionListener: Send + Sync {
    fn on_event(&self, event: SessionEvent);
}

impl<F> SessionListener for F
where
    F: Fn(SessionEvent) + Send + Sync,
{
    fn on_event(&self, event: SessionEvent) {
        self(event)
    }
}

/// Listener that forwards every event into an unbounded channel
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionListener for ChannelListener {
    fn on_event(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            trace!("Session event receiver dropped");
        }
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub handle: u64,
    pub phase: SessionPhase,
    pub previewing: bool,
    pub streaming: bool,
    pub muted: bool,
    pub camera_id: Option<String>,
    pub texture_id: i64,
    pub video_config: Option<VideoConfig>,
    pub audio_config: Option<AudioConfig>,
}

/// Mutable session state, only touched under the session lock
struct SessionState {
    video_config: Option<VideoConfig>,
    audio_config: Option<AudioConfig>,
    previewing: bool,
    streaming: bool,
    /// Last connection state reported to the listener
    connected: bool,
    disposed: bool,
    target: Box<dyn PreviewTarget>,
}

impl SessionState {
    fn phase(&self) -> SessionPhase {
        if self.disposed {
            SessionPhase::Disposed
        } else if self.streaming {
            SessionPhase::Streaming
        } else if self.previewing {
            SessionPhase::Previewing
        } else if self.video_config.is_some() {
            SessionPhase::Configured
        } else {
            SessionPhase::Idle
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.disposed {
            Err(LivecastError::invalid_operation("Session has been disposed"))
        } else {
            Ok(())
        }
    }

    fn ensure_not_streaming(&self) -> Result<()> {
        if self.streaming {
            Err(LivecastError::invalid_operation(
                "You have to stop streaming first",
            ))
        } else {
            Ok(())
        }
    }
}

/// Engine events received but not yet applied to the session
struct EngineInbox {
    rx: mpsc::UnboundedReceiver<EngineEvent>,
    pending: VecDeque<EngineEvent>,
}

impl EngineInbox {
    fn new(rx: mpsc::UnboundedReceiver<EngineEvent>) -> Self {
        Self {
            rx,
            pending: VecDeque::new(),
        }
    }

    /// Ready once an event is pending; `false` when the engine hung up
    fn poll_arrival(&mut self, cx: &mut Context<'_>) -> Poll<bool> {
        if !self.pending.is_empty() {
            return Poll::Ready(true);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                self.pending.push_back(event);
                Poll::Ready(true)
            }
            Poll::Ready(None) => Poll::Ready(false),
            Poll::Pending => Poll::Pending,
        }
    }

    /// Take every event emitted so far, oldest first
    fn take_all(&mut self) -> Vec<EngineEvent> {
        let mut events: Vec<EngineEvent> = self.pending.drain(..).collect();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Session controller
///
/// Must be created inside a Tokio runtime; construction spawns the engine
/// event relay.
pub struct SessionController {
    handle: Handle,
    engine: Arc<dyn StreamingEngine>,
    permissions: PermissionGate,
    listener: Arc<dyn SessionListener>,
    state: Arc<Mutex<SessionState>>,
    inbox: Arc<SyncMutex<EngineInbox>>,
    relay: SyncMutex<Option<JoinHandle<()>>>,
    /// Mirrors `SessionState::disposed` for the lock-free accessors
    released: AtomicBool,
    texture_id: i64,
}

impl SessionController {
    /// Create a session over an engine
    pub fn new(
        engine: Arc<dyn StreamingEngine>,
        permissions: PermissionGate,
        surfaces: &dyn SurfaceAllocator,
        listener: Arc<dyn SessionListener>,
    ) -> Result<Self> {
        let target = surfaces.create_surface_texture()?;
        let texture_id = target.id();
        let handle = Handle::new();

        let state = Arc::new(Mutex::new(SessionState {
            video_config: None,
            audio_config: None,
            previewing: false,
            streaming: false,
            connected: false,
            disposed: false,
            target,
        }));

        let inbox = Arc::new(SyncMutex::new(EngineInbox::new(engine.subscribe())));
        let relay = tokio::spawn(relay_engine_events(
            handle,
            inbox.clone(),
            state.clone(),
            listener.clone(),
        ));

        info!("{} created with preview texture {}", handle, texture_id);

        Ok(Self {
            handle,
            engine,
            permissions,
            listener,
            state,
            inbox,
            relay: SyncMutex::new(Some(relay)),
            released: AtomicBool::new(false),
            texture_id,
        })
    }

    /// Take the session lock and catch up on engine events
    async fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        let mut state = self.state.lock().await;
        if !state.disposed {
            let events = self.inbox.lock().take_all();
            for event in events {
                apply_engine_event(self.handle, &mut state, self.listener.as_ref(), event);
            }
        }
        state
    }

    /// Get the session handle
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Identifier of the preview texture
    pub fn texture_id(&self) -> i64 {
        self.texture_id
    }

    /// Current video configuration
    pub async fn video_config(&self) -> Option<VideoConfig> {
        self.lock_state().await.video_config.clone()
    }

    /// Current audio configuration
    pub async fn audio_config(&self) -> Option<AudioConfig> {
        self.lock_state().await.audio_config.clone()
    }

    pub async fn is_previewing(&self) -> bool {
        self.lock_state().await.previewing
    }

    pub async fn is_streaming(&self) -> bool {
        self.lock_state().await.streaming
    }

    /// Snapshot of the whole session
    pub async fn state(&self) -> SessionSnapshot {
        let state = self.lock_state().await;
        SessionSnapshot {
            handle: self.handle.as_u64(),
            phase: state.phase(),
            previewing: state.previewing,
            streaming: state.streaming,
            muted: self.is_muted(),
            camera_id: self.camera_id(),
            texture_id: self.texture_id,
            video_config: state.video_config.clone(),
            audio_config: state.audio_config.clone(),
        }
    }

    /// Apply a video configuration
    ///
    /// Fails with `InvalidOperation` while streaming. A running preview is
    /// stopped, the engine reconfigured and the preview restarted at the new
    /// resolution; the result then reflects the restart.
    pub async fn set_video_config(&self, config: VideoConfig) -> Result<()> {
        config.validate()?;

        let mut state = self.lock_state().await;
        state.ensure_active()?;
        state.ensure_not_streaming()?;

        for warning in config.warnings() {
            warn!("{}: {}", self.handle, warning);
        }

        self.listener.on_event(SessionEvent::VideoSizeChanged {
            resolution: config.resolution,
        });

        let was_previewing = state.previewing;
        if was_previewing {
            debug!("{} stopping preview for reconfiguration", self.handle);
            self.stop_preview_locked(&mut state).await?;
        }

        self.engine
            .set_video_config(&config)
            .await
            .map_err(|e| e.into_engine_failure("setVideoConfig"))?;
        info!("{} video configured: {}", self.handle, config);
        state.video_config = Some(config);

        if was_previewing {
            self.start_preview_locked(&mut state).await
        } else {
            Ok(())
        }
    }

    /// Apply an audio configuration
    ///
    /// Requires the record-audio permission. Fails with `InvalidOperation`
    /// while streaming.
    pub async fn set_audio_config(&self, config: AudioConfig) -> Result<()> {
        config.validate()?;

        let mut state = self.lock_state().await;
        state.ensure_active()?;
        state.ensure_not_streaming()?;

        self.permissions.require(Permission::RecordAudio).await?;

        self.engine
            .set_audio_config(&config)
            .await
            .map_err(|e| e.into_engine_failure("setAudioConfig"))?;
        info!("{} audio configured: {}", self.handle, config);
        state.audio_config = Some(config);
        Ok(())
    }

    /// Switch the capture device
    ///
    /// Requires the camera permission.
    pub async fn set_capture_device(&self, camera_id: &str) -> Result<()> {
        let state = self.lock_state().await;
        state.ensure_active()?;

        self.permissions.require(Permission::Camera).await?;

        self.engine
            .set_camera_id(camera_id)
            .await
            .map_err(|e| e.into_engine_failure("setCameraId"))?;
        info!("{} switched to camera {}", self.handle, camera_id);
        Ok(())
    }

    /// Start previewing into the session's texture
    ///
    /// Requires the camera permission and a video configuration.
    pub async fn start_preview(&self) -> Result<()> {
        let mut state = self.lock_state().await;
        state.ensure_active()?;
        self.start_preview_locked(&mut state).await
    }

    /// Stop previewing
    ///
    /// Clears the previewing flag even if the engine reports an error.
    pub async fn stop_preview(&self) -> Result<()> {
        let mut state = self.lock_state().await;
        state.ensure_active()?;
        self.stop_preview_locked(&mut state).await
    }

    /// Start publishing to a destination
    ///
    /// Resolves once the engine's publish attempt resolves. On failure a
    /// `ConnectionFailed` event is emitted and the error is also returned.
    pub async fn start_stream(&self, url: &str) -> Result<()> {
        let mut state = self.lock_state().await;
        state.ensure_active()?;
        if state.streaming {
            return Err(LivecastError::invalid_operation(
                "Stream already active; stop it first",
            ));
        }

        let safe_url = mask_stream_url(url);
        info!("{} starting stream to {}", self.handle, safe_url);

        match self.engine.start_stream(url).await {
            Ok(()) => {
                state.streaming = true;
                info!("{} streaming to {}", self.handle, safe_url);
                Ok(())
            }
            Err(e) => {
                let reason = format!("Failed to start stream: {}", e);
                warn!("{} {}", self.handle, reason);
                self.listener
                    .on_event(SessionEvent::ConnectionFailed { reason });
                Err(e.into_engine_failure("startStream"))
            }
        }
    }

    /// Stop publishing
    ///
    /// Emits `Disconnected` only if a stream was active and the engine
    /// stopped it. The streaming flag is cleared unconditionally.
    pub async fn stop_stream(&self) -> Result<()> {
        let mut state = self.lock_state().await;
        state.ensure_active()?;
        self.stop_stream_locked(&mut state).await
    }

    /// Whether the active audio input is muted
    ///
    /// `false` when no audio input is bound or the session is disposed.
    pub fn is_muted(&self) -> bool {
        if self.released.load(Ordering::Acquire) {
            return false;
        }
        self.engine
            .audio_input()
            .map(|input| input.is_muted())
            .unwrap_or(false)
    }

    /// Mute or unmute the active audio input
    ///
    /// No-op when no audio input is bound or the session is disposed.
    pub fn set_muted(&self, muted: bool) {
        if self.released.load(Ordering::Acquire) {
            debug!("{} disposed, ignoring mute", self.handle);
            return;
        }
        match self.engine.audio_input() {
            Some(input) => {
                input.set_muted(muted);
                info!("{} audio {}", self.handle, if muted { "muted" } else { "unmuted" });
            }
            None => debug!("{} has no audio input, ignoring mute", self.handle),
        }
    }

    /// Identifier of the active camera
    ///
    /// `None` for non-camera sources and after dispose.
    pub fn camera_id(&self) -> Option<String> {
        if self.released.load(Ordering::Acquire) {
            return None;
        }
        self.engine
            .video_input()
            .and_then(|input| input.camera_source())
            .map(|camera| camera.camera_id())
    }

    /// Stop everything and release the preview texture
    ///
    /// Idempotent. Teardown failures are logged, not returned.
    pub async fn dispose(&self) {
        let mut state = self.lock_state().await;
        if state.disposed {
            debug!("{} already disposed", self.handle);
            return;
        }

        info!("Disposing {}", self.handle);

        if let Err(e) = self.stop_stream_locked(&mut state).await {
            warn!("{} failed to stop stream during dispose: {}", self.handle, e);
        }
        if let Err(e) = self.stop_preview_locked(&mut state).await {
            warn!("{} failed to stop preview during dispose: {}", self.handle, e);
        }

        state.target.release();
        state.disposed = true;
        self.released.store(true, Ordering::Release);

        if let Some(relay) = self.relay.lock().take() {
            relay.abort();
        }
    }

    async fn start_preview_locked(&self, state: &mut SessionState) -> Result<()> {
        self.permissions.require(Permission::Camera).await?;

        let resolution = state
            .video_config
            .as_ref()
            .map(|config| config.resolution)
            .ok_or(LivecastError::NotConfigured)?;

        let surface = state.target.surface(resolution)?;
        self.engine
            .start_preview(surface)
            .await
            .map_err(|e| e.into_engine_failure("startPreview"))?;

        state.previewing = true;
        info!(
            "{} previewing at {} on texture {}",
            self.handle, resolution, surface.texture_id
        );
        Ok(())
    }

    async fn stop_preview_locked(&self, state: &mut SessionState) -> Result<()> {
        let result = self.engine.stop_preview().await;
        state.previewing = false;
        result.map_err(|e| e.into_engine_failure("stopPreview"))
    }

    async fn stop_stream_locked(&self, state: &mut SessionState) -> Result<()> {
        let was_connected = state.connected || self.engine.is_streaming();

        let result = self.engine.stop_stream().await;
        state.streaming = false;

        // A failed stop leaves the connection state untouched so the
        // eventual disconnect is still reported once
        result.map_err(|e| e.into_engine_failure("stopStream"))?;

        if was_connected {
            state.connected = false;
            info!("{} stream stopped", self.handle);
            self.listener.on_event(SessionEvent::Disconnected);
        }
        Ok(())
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.lock().take() {
            relay.abort();
        }
    }
}

/// Apply engine events that arrive while no operation is running
async fn relay_engine_events(
    handle: Handle,
    inbox: Arc<SyncMutex<EngineInbox>>,
    state: Arc<Mutex<SessionState>>,
    listener: Arc<dyn SessionListener>,
) {
    loop {
        let open = std::future::poll_fn(|cx| inbox.lock().poll_arrival(cx)).await;

        let mut state = state.lock().await;
        if state.disposed {
            break;
        }
        let events = inbox.lock().take_all();
        for event in events {
            apply_engine_event(handle, &mut state, listener.as_ref(), event);
        }

        if !open {
            debug!("{} engine event stream closed", handle);
            break;
        }
    }

    debug!("{} event relay finished", handle);
}

/// Apply one engine event to the session and report it
///
/// Connected and Disconnected are only reported on a change of the last
/// reported connection state.
fn apply_engine_event(
    handle: Handle,
    state: &mut SessionState,
    listener: &dyn SessionListener,
    event: EngineEvent,
) {
    match event {
        EngineEvent::Error(None) => trace!("{} engine error cleared", handle),
        EngineEvent::Error(Some(fault)) => {
            warn!("{} engine error: {}", handle, fault);
            state.streaming = false;
            listener.on_event(SessionEvent::Error {
                message: fault.message,
            });
        }
        EngineEvent::StreamingChanged(true) => {
            if state.connected {
                debug!("{} already reported connected", handle);
            } else {
                state.connected = true;
                info!("{} connected", handle);
                listener.on_event(SessionEvent::Connected);
            }
        }
        EngineEvent::StreamingChanged(false) => {
            if state.connected {
                state.connected = false;
                info!("{} disconnected", handle);
                listener.on_event(SessionEvent::Disconnected);
            } else {
                debug!("{} already reported disconnected", handle);
            }
        }
    }
}
