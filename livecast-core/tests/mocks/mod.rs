//! Mock infrastructure for testing
//!
//! Provides a scripted streaming engine, camera platform, permission prompt
//! and surface allocator, plus an event collector for session outcomes.

#![allow(dead_code)]

use async_trait::async_trait;
use livecast_core::capture::{CameraCharacteristics, CameraPlatform};
use livecast_core::config::{AudioConfig, Resolution, VideoConfig};
use livecast_core::engine::{
    AudioInput, CameraSource, EngineEvent, EngineEventHub, StreamingEngine, VideoInput,
    ZoomControl,
};
use livecast_core::error::{LivecastError, Result};
use livecast_core::permission::{Permission, PermissionOutcome, PermissionPrompt, PermissionGate};
use livecast_core::session::{SessionController, SessionListener};
use livecast_core::surface::{PreviewSurface, PreviewTarget, SurfaceAllocator};
use livecast_core::types::SessionEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Engine that records calls and fails on request
pub struct MockEngine {
    hub: EngineEventHub,
    streaming: AtomicBool,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, String>>,
    audio: Option<Arc<MockAudio>>,
    video: Mutex<Option<Arc<dyn VideoInput>>>,
    camera: Arc<MockCamera>,
    last_surface: Mutex<Option<PreviewSurface>>,
    video_config: Mutex<Option<VideoConfig>>,
}

impl MockEngine {
    /// Engine with a microphone and camera "0" bound
    pub fn new() -> Self {
        let camera = Arc::new(MockCamera::new("0"));
        let video: Arc<dyn VideoInput> = Arc::new(MockVideoInput {
            camera: Some(camera.clone()),
        });
        Self {
            hub: EngineEventHub::new(),
            streaming: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            audio: Some(Arc::new(MockAudio::default())),
            video: Mutex::new(Some(video)),
            camera,
            last_surface: Mutex::new(None),
            video_config: Mutex::new(None),
        }
    }

    /// Engine without a microphone
    pub fn without_audio() -> Self {
        Self {
            audio: None,
            ..Self::new()
        }
    }

    /// Bind a video input that is not a camera
    pub fn bind_screen_source(&self) {
        *self.video.lock() = Some(Arc::new(MockVideoInput { camera: None }));
    }

    /// Unbind the video input
    pub fn unbind_video(&self) {
        *self.video.lock() = None;
    }

    /// Make an operation fail with a message
    pub fn fail(&self, operation: &'static str, message: &str) {
        self.failures.lock().insert(operation, message.to_string());
    }

    /// Make an operation succeed again
    pub fn heal(&self, operation: &'static str) {
        self.failures.lock().remove(operation);
    }

    /// Operations called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == operation).count()
    }

    pub fn last_surface(&self) -> Option<PreviewSurface> {
        *self.last_surface.lock()
    }

    pub fn applied_video_config(&self) -> Option<VideoConfig> {
        self.video_config.lock().clone()
    }

    pub fn camera(&self) -> Arc<MockCamera> {
        self.camera.clone()
    }

    pub fn audio(&self) -> Option<Arc<MockAudio>> {
        self.audio.clone()
    }

    /// Emit an event as if from the engine's own threads
    pub fn emit(&self, event: EngineEvent) {
        self.hub.emit(event);
    }

    pub fn emit_error(&self, message: &str) {
        self.hub.emit_error(message);
    }

    /// Simulate the publish state changing on the engine side
    pub fn set_streaming(&self, streaming: bool) {
        self.streaming.store(streaming, Ordering::SeqCst);
        self.hub.emit_streaming(streaming);
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().push(operation.to_string());
        match self.failures.lock().get(operation) {
            Some(message) => Err(LivecastError::engine(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StreamingEngine for MockEngine {
    async fn set_video_config(&self, config: &VideoConfig) -> Result<()> {
        self.record("set_video_config")?;
        *self.video_config.lock() = Some(config.clone());
        Ok(())
    }

    async fn set_audio_config(&self, _config: &AudioConfig) -> Result<()> {
        self.record("set_audio_config")
    }

    async fn set_camera_id(&self, camera_id: &str) -> Result<()> {
        self.record("set_camera_id")?;
        *self.camera.id.lock() = camera_id.to_string();
        Ok(())
    }

    async fn start_preview(&self, surface: PreviewSurface) -> Result<()> {
        self.record("start_preview")?;
        *self.last_surface.lock() = Some(surface);
        Ok(())
    }

    async fn stop_preview(&self) -> Result<()> {
        self.record("stop_preview")
    }

    async fn start_stream(&self, _url: &str) -> Result<()> {
        self.record("start_stream")?;
        self.set_streaming(true);
        Ok(())
    }

    async fn stop_stream(&self) -> Result<()> {
        self.record("stop_stream")?;
        if self.streaming.load(Ordering::SeqCst) {
            self.set_streaming(false);
        }
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
        self.hub.subscribe()
    }

    fn audio_input(&self) -> Option<Arc<dyn AudioInput>> {
        self.audio.clone().map(|audio| audio as Arc<dyn AudioInput>)
    }

    fn video_input(&self) -> Option<Arc<dyn VideoInput>> {
        self.video.lock().clone()
    }
}

#[derive(Default)]
pub struct MockAudio {
    muted: AtomicBool,
}

impl MockAudio {
    pub fn is_muted_now(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

impl AudioInput for MockAudio {
    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }
}

struct MockVideoInput {
    camera: Option<Arc<MockCamera>>,
}

impl VideoInput for MockVideoInput {
    fn camera_source(&self) -> Option<Arc<dyn CameraSource>> {
        self.camera.clone().map(|camera| camera as Arc<dyn CameraSource>)
    }
}

pub struct MockCamera {
    id: Mutex<String>,
    pub zoom: Arc<MockZoom>,
}

impl MockCamera {
    fn new(id: &str) -> Self {
        Self {
            id: Mutex::new(id.to_string()),
            zoom: Arc::new(MockZoom::default()),
        }
    }
}

impl CameraSource for MockCamera {
    fn camera_id(&self) -> String {
        self.id.lock().clone()
    }

    fn zoom(&self) -> Arc<dyn ZoomControl> {
        self.zoom.clone()
    }
}

/// Zoom control that records every write
pub struct MockZoom {
    ratio: Mutex<f32>,
    pub writes: Mutex<Vec<f32>>,
    /// Concurrent writers observed at once
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Default for MockZoom {
    fn default() -> Self {
        Self {
            ratio: Mutex::new(1.0),
            writes: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ZoomControl for MockZoom {
    async fn set_zoom_ratio(&self, ratio: f32) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        *self.ratio.lock() = ratio;
        self.writes.lock().push(ratio);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn zoom_ratio(&self) -> Result<f32> {
        Ok(*self.ratio.lock())
    }
}

/// Camera platform backed by a fixed table
#[derive(Default)]
pub struct MockPlatform {
    order: Mutex<Vec<String>>,
    cameras: Mutex<HashMap<String, CameraCharacteristics>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_camera(self, id: &str, characteristics: CameraCharacteristics) -> Self {
        self.plug(id, characteristics);
        self
    }

    /// Attach a camera at runtime
    pub fn plug(&self, id: &str, characteristics: CameraCharacteristics) {
        self.order.lock().push(id.to_string());
        self.cameras.lock().insert(id.to_string(), characteristics);
    }

    /// Detach a camera at runtime
    pub fn unplug(&self, id: &str) {
        self.order.lock().retain(|c| c != id);
        self.cameras.lock().remove(id);
    }
}

impl CameraPlatform for MockPlatform {
    fn camera_ids(&self) -> Result<Vec<String>> {
        Ok(self.order.lock().clone())
    }

    fn characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics> {
        self.cameras
            .lock()
            .get(camera_id)
            .cloned()
            .ok_or_else(|| LivecastError::invalid_device(format!("No camera with id {}", camera_id)))
    }
}

/// Permission prompt with scripted answers, granting by default
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<HashMap<Permission, PermissionOutcome>>,
    broken: AtomicBool,
    requests: Mutex<Vec<Permission>>,
}

impl ScriptedPrompt {
    pub fn granting() -> Self {
        Self::default()
    }

    pub fn answer(self, permission: Permission, outcome: PermissionOutcome) -> Self {
        self.answers.lock().insert(permission, outcome);
        self
    }

    /// Make every request fail at the platform level
    pub fn broken() -> Self {
        let prompt = Self::default();
        prompt.broken.store(true, Ordering::SeqCst);
        prompt
    }

    pub fn requests(&self) -> Vec<Permission> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PermissionPrompt for ScriptedPrompt {
    async fn request(&self, permission: Permission) -> Result<PermissionOutcome> {
        self.requests.lock().push(permission);
        if self.broken.load(Ordering::SeqCst) {
            return Err(LivecastError::engine("permission service unavailable"));
        }
        Ok(self
            .answers
            .lock()
            .get(&permission)
            .cloned()
            .unwrap_or(PermissionOutcome::Granted))
    }
}

/// What happened to the textures handed out by [`RecordingSurfaces`]
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub sizes: Vec<(i64, Resolution)>,
    pub released: Vec<i64>,
}

/// Surface allocator that records sizing and release
#[derive(Default)]
pub struct RecordingSurfaces {
    next_id: AtomicI64,
    pub log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurfaces {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            log: Arc::new(Mutex::new(SurfaceLog::default())),
        }
    }

    /// Last size a texture was given
    pub fn last_size(&self) -> Option<Resolution> {
        self.log.lock().sizes.last().map(|(_, size)| *size)
    }

    pub fn released(&self) -> Vec<i64> {
        self.log.lock().released.clone()
    }
}

impl SurfaceAllocator for RecordingSurfaces {
    fn create_surface_texture(&self) -> Result<Box<dyn PreviewTarget>> {
        Ok(Box::new(RecordingTarget {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            log: self.log.clone(),
        }))
    }
}

struct RecordingTarget {
    id: i64,
    log: Arc<Mutex<SurfaceLog>>,
}

impl PreviewTarget for RecordingTarget {
    fn id(&self) -> i64 {
        self.id
    }

    fn surface(&mut self, resolution: Resolution) -> Result<PreviewSurface> {
        self.log.lock().sizes.push((self.id, resolution));
        Ok(PreviewSurface {
            texture_id: self.id,
            resolution,
        })
    }

    fn release(&mut self) {
        self.log.lock().released.push(self.id);
    }
}

/// Collects session events for assertions
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&SessionEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    /// Wait until at least `len` events have arrived
    pub async fn wait_for(&self, len: usize) -> Vec<SessionEvent> {
        for _ in 0..200 {
            if self.events.lock().len() >= len {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.events()
    }
}

impl SessionListener for EventCollector {
    fn on_event(&self, event: SessionEvent) {
        self.events.lock().push(event);
    }
}

/// Give the event relay a chance to drain
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

/// A session over a mock engine
pub struct Fixture {
    pub engine: Arc<MockEngine>,
    pub prompt: Arc<ScriptedPrompt>,
    pub surfaces: RecordingSurfaces,
    pub events: EventCollector,
    pub session: SessionController,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(MockEngine::new(), ScriptedPrompt::granting())
    }

    pub fn with(engine: MockEngine, prompt: ScriptedPrompt) -> Self {
        let engine = Arc::new(engine);
        let prompt = Arc::new(prompt);
        let surfaces = RecordingSurfaces::new();
        let events = EventCollector::new();
        let session = SessionController::new(
            engine.clone(),
            PermissionGate::new(prompt.clone()),
            &surfaces,
            Arc::new(events.clone()),
        )
        .expect("session");
        Self {
            engine,
            prompt,
            surfaces,
            events,
            session,
        }
    }
}

/// Characteristics of a classified camera
pub fn camera(facing: livecast_core::capture::LensFacing) -> CameraCharacteristics {
    CameraCharacteristics {
        lens_facing: Some(facing),
        ..CameraCharacteristics::default()
    }
}
