//! Host boundary
//!
//! Everything an embedding application needs to expose live streaming:
//! device queries, live camera settings and one lazily created session
//! whose events are fanned out to any number of subscribers.

use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::capture::{CameraPlatform, CaptureSettings, CaptureSourceRegistry};
use crate::engine::InstanceRegistry;
use crate::error::Result;
use crate::permission::{PermissionGate, PermissionPrompt};
use crate::session::{SessionController, SessionListener, SessionSnapshot};
use crate::surface::SurfaceAllocator;
use crate::types::SessionEvent;

/// Capacity of the session event fan-out
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Live streaming facade for an embedding application
pub struct LiveStreamHost {
    engines: Arc<InstanceRegistry>,
    cameras: CaptureSourceRegistry,
    settings: CaptureSettings,
    permissions: PermissionGate,
    surfaces: Arc<dyn SurfaceAllocator>,
    events: broadcast::Sender<SessionEvent>,
    last_event: Arc<SyncMutex<Option<SessionEvent>>>,
    session: Mutex<Option<Arc<SessionController>>>,
}

impl LiveStreamHost {
    pub fn new(
        engines: Arc<InstanceRegistry>,
        platform: Arc<dyn CameraPlatform>,
        prompt: Arc<dyn PermissionPrompt>,
        surfaces: Arc<dyn SurfaceAllocator>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            settings: CaptureSettings::new(engines.clone()),
            engines,
            cameras: CaptureSourceRegistry::new(platform),
            permissions: PermissionGate::new(prompt),
            surfaces,
            events,
            last_event: Arc::new(SyncMutex::new(None)),
            session: Mutex::new(None),
        }
    }

    /// Replace the camera query registry (e.g. to change the zoom ladder)
    pub fn with_cameras(mut self, cameras: CaptureSourceRegistry) -> Self {
        self.cameras = cameras;
        self
    }

    /// Create the session if needed and return its preview texture id
    pub async fn create(&self) -> Result<i64> {
        Ok(self.session().await?.texture_id())
    }

    /// Get the session, creating it on first use
    pub async fn session(&self) -> Result<Arc<SessionController>> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        let engine = self.engines.get()?;
        let session = Arc::new(SessionController::new(
            engine,
            self.permissions.clone(),
            self.surfaces.as_ref(),
            self.listener(),
        )?);
        info!("Live stream {} ready", session.handle());
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Whether a session currently exists
    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Most recent session event
    pub fn last_event(&self) -> Option<SessionEvent> {
        self.last_event.lock().clone()
    }

    /// Snapshot of the session, if one exists
    pub async fn status(&self) -> Option<SessionSnapshot> {
        let session = self.session.lock().await.clone()?;
        Some(session.state().await)
    }

    /// Whether the engine instance exists
    pub fn engine_created(&self) -> bool {
        self.engines.is_created()
    }

    /// Dispose the session and release the engine instance
    pub async fn dispose(&self) {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            session.dispose().await;
        }
        self.engines.dispose();
        *self.last_event.lock() = None;
    }

    /// Camera queries
    pub fn cameras(&self) -> &CaptureSourceRegistry {
        &self.cameras
    }

    /// Live settings of the active camera
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Permission gate shared by the session
    pub fn permissions(&self) -> &PermissionGate {
        &self.permissions
    }

    fn listener(&self) -> Arc<dyn SessionListener> {
        let events = self.events.clone();
        let last_event = self.last_event.clone();
        Arc::new(move |event: SessionEvent| {
            *last_event.lock() = Some(event.clone());
            // No subscribers is fine
            let _ = events.send(event);
        })
    }
}
