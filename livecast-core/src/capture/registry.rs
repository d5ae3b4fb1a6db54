//! Capture source registry
//!
//! Answers device queries against the platform at call time. Nothing is
//! cached here so hot-plugged cameras show up on the next call.

use std::sync::Arc;
use tracing::{debug, warn};

use super::zoom::{resolve_zoom_range, ZoomRange, ZoomTier, DEFAULT_ZOOM_TIERS};
use super::{CameraPlatform, LensFacing};
use crate::error::{LivecastError, Result};
use crate::types::{CaptureDeviceDescriptor, LensDirection};

/// Camera queries over a [`CameraPlatform`]
pub struct CaptureSourceRegistry {
    platform: Arc<dyn CameraPlatform>,
    zoom_tiers: Vec<ZoomTier>,
}

impl CaptureSourceRegistry {
    /// Create a registry using the default zoom ladder
    pub fn new(platform: Arc<dyn CameraPlatform>) -> Self {
        Self {
            platform,
            zoom_tiers: DEFAULT_ZOOM_TIERS.to_vec(),
        }
    }

    /// Replace the zoom tier order
    pub fn with_zoom_tiers(mut self, tiers: impl Into<Vec<ZoomTier>>) -> Self {
        self.zoom_tiers = tiers.into();
        self
    }

    /// Current zoom tier order
    pub fn zoom_tiers(&self) -> &[ZoomTier] {
        &self.zoom_tiers
    }

    /// List camera identifiers in platform order
    pub fn list_device_ids(&self) -> Result<Vec<String>> {
        let ids = self.platform.camera_ids()?;
        debug!("Found {} camera(s)", ids.len());
        Ok(ids)
    }

    /// Sensor rotation in degrees, 0 if the platform reports none
    pub fn sensor_rotation_degrees(&self, camera_id: &str) -> Result<i32> {
        let characteristics = self.platform.characteristics(camera_id)?;
        Ok(characteristics.sensor_orientation.unwrap_or(0))
    }

    /// Lens direction of a camera
    pub fn lens_direction(&self, camera_id: &str) -> Result<LensDirection> {
        let characteristics = self.platform.characteristics(camera_id)?;
        match characteristics.lens_facing {
            Some(LensFacing::Front) => Ok(LensDirection::Front),
            Some(LensFacing::Back) => Ok(LensDirection::Back),
            Some(LensFacing::External) => Ok(LensDirection::Other),
            None => Err(LivecastError::invalid_device(format!(
                "Invalid camera position for camera {}",
                camera_id
            ))),
        }
    }

    /// Zoom ratio range of a camera
    pub fn zoom_range(&self, camera_id: &str) -> Result<ZoomRange> {
        let characteristics = self.platform.characteristics(camera_id)?;
        Ok(resolve_zoom_range(&self.zoom_tiers, &characteristics))
    }

    /// Lower bound of the zoom ratio range
    pub fn min_zoom_ratio(&self, camera_id: &str) -> Result<f64> {
        Ok(self.zoom_range(camera_id)?.min as f64)
    }

    /// Upper bound of the zoom ratio range
    pub fn max_zoom_ratio(&self, camera_id: &str) -> Result<f64> {
        Ok(self.zoom_range(camera_id)?.max as f64)
    }

    /// All facts about one camera
    pub fn describe(&self, camera_id: &str) -> Result<CaptureDeviceDescriptor> {
        Ok(CaptureDeviceDescriptor {
            id: camera_id.to_string(),
            lens_direction: self.lens_direction(camera_id)?,
            sensor_rotation_degrees: self.sensor_rotation_degrees(camera_id)?,
            zoom_range: self.zoom_range(camera_id)?,
        })
    }

    /// Describe every camera, skipping ones the platform cannot classify
    pub fn describe_all(&self) -> Result<Vec<CaptureDeviceDescriptor>> {
        let mut descriptors = Vec::new();
        for id in self.list_device_ids()? {
            match self.describe(&id) {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(LivecastError::InvalidDevice(reason)) => {
                    warn!("Skipping camera {}: {}", id, reason);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(descriptors)
    }
}
