//! Zoom capability ladder
//!
//! Platforms report zoom capability in tiers: newer ones report a ratio
//! range, older ones only a maximum digital zoom factor, and some report
//! nothing. The tiers are tried in order and the first one that yields a
//! range wins.

use serde::{Deserialize, Serialize};

use super::CameraCharacteristics;

/// Inclusive zoom ratio range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f32,
    pub max: f32,
}

impl ZoomRange {
    /// No zoom capability
    pub const FIXED: ZoomRange = ZoomRange { min: 1.0, max: 1.0 };

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether a ratio falls inside the range
    pub fn contains(&self, ratio: f32) -> bool {
        ratio >= self.min && ratio <= self.max
    }
}

/// One capability tier of the zoom ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoomTier {
    /// Platform-reported zoom ratio range, used unmodified
    RatioRange,
    /// `(1.0, max digital zoom)`
    MaxDigitalZoom,
    /// `(1.0, 1.0)`, always available
    Fixed,
}

/// Tier order used by the capture source registry
pub const DEFAULT_ZOOM_TIERS: [ZoomTier; 3] =
    [ZoomTier::RatioRange, ZoomTier::MaxDigitalZoom, ZoomTier::Fixed];

impl ZoomTier {
    /// Probe this tier against a device's characteristics
    pub fn probe(&self, characteristics: &CameraCharacteristics) -> Option<ZoomRange> {
        match self {
            Self::RatioRange => characteristics
                .zoom_ratio_range
                .map(|(min, max)| ZoomRange::new(min, max)),
            Self::MaxDigitalZoom => characteristics
                .max_digital_zoom
                .map(|max| ZoomRange::new(1.0, max)),
            Self::Fixed => Some(ZoomRange::FIXED),
        }
    }
}

/// Resolve a zoom range by trying tiers in order
///
/// Falls back to [`ZoomRange::FIXED`] if no tier matches.
pub fn resolve_zoom_range(tiers: &[ZoomTier], characteristics: &CameraCharacteristics) -> ZoomRange {
    tiers
        .iter()
        .find_map(|tier| tier.probe(characteristics))
        .unwrap_or(ZoomRange::FIXED)
}
