//! Live camera settings
//!
//! Reads and writes live parameters on whichever camera currently backs the
//! engine's video input. Calls are serialized so zoom writes never
//! interleave.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::engine::{InstanceRegistry, ZoomControl};
use crate::error::{LivecastError, Result};

/// Settings proxy for the active camera
pub struct CaptureSettings {
    engines: Arc<InstanceRegistry>,
    queue: Mutex<()>,
}

impl CaptureSettings {
    pub fn new(engines: Arc<InstanceRegistry>) -> Self {
        Self {
            engines,
            queue: Mutex::new(()),
        }
    }

    fn zoom_control(&self) -> Result<Arc<dyn ZoomControl>> {
        let engine = self.engines.get()?;
        engine
            .video_input()
            .and_then(|input| input.camera_source())
            .map(|camera| camera.zoom())
            .ok_or(LivecastError::NotACaptureSource)
    }

    /// Set the zoom ratio of the active camera
    pub async fn set_zoom_ratio(&self, ratio: f64) -> Result<()> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(LivecastError::invalid_config(format!(
                "Zoom ratio must be positive, got {}",
                ratio
            )));
        }

        let _turn = self.queue.lock().await;
        let zoom = self.zoom_control()?;
        zoom.set_zoom_ratio(ratio as f32)
            .await
            .map_err(|e| e.into_engine_failure("setZoomRatio"))?;
        debug!("Zoom ratio set to {:.2}", ratio);
        Ok(())
    }

    /// Get the zoom ratio of the active camera
    pub async fn zoom_ratio(&self) -> Result<f64> {
        let _turn = self.queue.lock().await;
        let zoom = self.zoom_control()?;
        let ratio = zoom
            .zoom_ratio()
            .await
            .map_err(|e| e.into_engine_failure("getZoomRatio"))?;
        Ok(ratio as f64)
    }
}
