//! Streaming engine interface
//!
//! The engine performs the actual capture, encoding and network publish.
//! This crate only drives it through [`StreamingEngine`] and listens to the
//! events it emits.

mod events;
mod registry;

pub use events::EngineEventHub;
pub use registry::InstanceRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::{AudioConfig, VideoConfig};
use crate::error::Result;
use crate::surface::PreviewSurface;

/// Error reported asynchronously by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFault {
    pub message: String,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Event emitted by the engine
///
/// Error and streaming-state changes share one channel so their relative
/// order is kept.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Error state changed; `None` means the error was cleared
    Error(Option<EngineFault>),
    /// Publish became active or inactive
    StreamingChanged(bool),
}

/// Capture, encode and publish engine
#[async_trait]
pub trait StreamingEngine: Send + Sync {
    /// Reconfigure the video encoder
    async fn set_video_config(&self, config: &VideoConfig) -> Result<()>;

    /// Reconfigure the audio encoder
    async fn set_audio_config(&self, config: &AudioConfig) -> Result<()>;

    /// Switch the capture device
    async fn set_camera_id(&self, camera_id: &str) -> Result<()>;

    /// Start rendering frames into a surface
    async fn start_preview(&self, surface: PreviewSurface) -> Result<()>;

    /// Stop rendering preview frames
    async fn stop_preview(&self) -> Result<()>;

    /// Connect and start publishing to a destination
    async fn start_stream(&self, url: &str) -> Result<()>;

    /// Stop publishing
    async fn stop_stream(&self) -> Result<()>;

    /// Whether the engine is currently publishing
    fn is_streaming(&self) -> bool;

    /// Subscribe to engine events
    fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent>;

    /// The active audio input, if any
    fn audio_input(&self) -> Option<Arc<dyn AudioInput>>;

    /// The active video input, if any
    fn video_input(&self) -> Option<Arc<dyn VideoInput>>;
}

/// Audio input of the engine
pub trait AudioInput: Send + Sync {
    fn is_muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
}

/// Video input of the engine
pub trait VideoInput: Send + Sync {
    /// The backing camera, or `None` for non-camera sources
    fn camera_source(&self) -> Option<Arc<dyn CameraSource>>;
}

/// Device-backed capture source
pub trait CameraSource: Send + Sync {
    /// Platform identifier of the camera
    fn camera_id(&self) -> String;

    /// Live zoom control
    fn zoom(&self) -> Arc<dyn ZoomControl>;
}

/// Live zoom control of a camera
#[async_trait]
pub trait ZoomControl: Send + Sync {
    async fn set_zoom_ratio(&self, ratio: f32) -> Result<()>;
    async fn zoom_ratio(&self) -> Result<f32>;
}
