//! Capture device discovery and live settings
//!
//! This module handles:
//! - Camera enumeration and per-device characteristics via [`CameraPlatform`]
//! - The zoom capability ladder
//! - Live zoom control of the active camera

pub mod registry;
pub mod settings;
pub mod sysfs;
pub mod zoom;

pub use registry::CaptureSourceRegistry;
pub use settings::CaptureSettings;
pub use sysfs::SysfsCameraPlatform;
pub use zoom::{ZoomRange, ZoomTier, DEFAULT_ZOOM_TIERS};

use crate::error::Result;

/// Platform-reported lens facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LensFacing {
    Front,
    Back,
    External,
}

/// Raw per-device characteristics as reported by the platform
///
/// Every field is optional because platforms report different subsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraCharacteristics {
    /// Sensor orientation in degrees
    pub sensor_orientation: Option<i32>,
    /// Lens facing, if the platform can classify it
    pub lens_facing: Option<LensFacing>,
    /// Supported zoom ratio range (min, max)
    pub zoom_ratio_range: Option<(f32, f32)>,
    /// Maximum digital zoom factor
    pub max_digital_zoom: Option<f32>,
}

/// Platform camera enumeration and characteristics lookup
pub trait CameraPlatform: Send + Sync {
    /// Identifiers of the cameras currently present
    fn camera_ids(&self) -> Result<Vec<String>>;

    /// Characteristics of one camera
    ///
    /// Fails with `InvalidDevice` for unknown identifiers.
    fn characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics>;
}
