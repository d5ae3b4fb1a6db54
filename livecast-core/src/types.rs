//! Core types for Livecast
//!
//! These types describe capture devices and the events a live stream
//! session reports back to its caller.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::capture::ZoomRange;
use crate::config::Resolution;

/// Global handle counter for unique session IDs
static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque handle for a live stream session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    /// Create a new unique handle
    pub fn new() -> Self {
        Self(HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// Which way a camera lens points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensDirection {
    /// Facing the user
    Front,
    /// Facing away from the user
    Back,
    /// External or otherwise attached camera
    Other,
}

impl std::fmt::Display for LensDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Immutable facts about one capture device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureDeviceDescriptor {
    /// Platform identifier
    pub id: String,
    /// Lens facing classification
    pub lens_direction: LensDirection,
    /// Sensor rotation in degrees
    pub sensor_rotation_degrees: i32,
    /// Supported zoom ratio range
    pub zoom_range: ZoomRange,
}

impl std::fmt::Display for CaptureDeviceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {}°, zoom {:.1}x-{:.1}x)",
            self.id,
            self.lens_direction,
            self.sensor_rotation_degrees,
            self.zoom_range.min,
            self.zoom_range.max
        )
    }
}

/// Outcome reported to the caller of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The engine started publishing
    Connected,
    /// The engine stopped publishing
    Disconnected,
    /// A publish attempt failed
    ConnectionFailed { reason: String },
    /// The engine reported an error; streaming has stopped
    Error { message: String },
    /// The video resolution is about to change
    VideoSizeChanged { resolution: Resolution },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::ConnectionFailed { reason } => write!(f, "connection failed: {}", reason),
            Self::Error { message } => write!(f, "error: {}", message),
            Self::VideoSizeChanged { resolution } => write!(f, "video size changed: {}", resolution),
        }
    }
}

/// Coarse lifecycle phase of a session
///
/// Previewing and streaming are independent flags; the phase reports the
/// most advanced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No video configuration set
    Idle,
    /// Video configuration set
    Configured,
    /// Preview surface bound
    Previewing,
    /// Publish active
    Streaming,
    /// Session released
    Disposed,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Configured => write!(f, "Configured"),
            Self::Previewing => write!(f, "Previewing"),
            Self::Streaming => write!(f, "Streaming"),
            Self::Disposed => write!(f, "Disposed"),
        }
    }
}
