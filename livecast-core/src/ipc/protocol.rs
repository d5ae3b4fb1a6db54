//! IPC protocol definitions
//!
//! Newline-delimited JSON messages exchanged between the host daemon and
//! CLI clients.

use serde::{Deserialize, Serialize};

use crate::config::{AudioConfig, VideoConfig};
use crate::error::{ErrorKind, LivecastError};
use crate::session::SessionSnapshot;
use crate::types::{CaptureDeviceDescriptor, SessionEvent};

/// Messages that can be sent to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcMessage {
    /// Check if daemon is alive
    Ping,
    /// Request current status
    Status,
    /// List cameras with their descriptors
    ListCameras,
    /// Describe one camera
    DescribeCamera { camera_id: String },
    /// Apply a video configuration
    SetVideoConfig { config: VideoConfig },
    /// Apply an audio configuration
    SetAudioConfig { config: AudioConfig },
    /// Switch the capture device
    SetCamera { camera_id: String },
    StartPreview,
    StopPreview,
    /// Start publishing to a destination
    StartStream { url: String },
    StopStream,
    SetMuted { muted: bool },
    GetMuted,
    SetZoomRatio { ratio: f64 },
    GetZoomRatio,
    /// Receive session events until the connection closes
    Subscribe,
    /// Dispose the session and engine
    Dispose,
    /// Stop the daemon gracefully
    Shutdown,
}

/// Responses from the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcResponse {
    /// Simple acknowledgment
    Ok,
    /// Pong response to ping
    Pong,
    /// Error response
    Error { kind: ErrorKind, message: String },
    /// Status response
    Status(SessionStatus),
    /// Camera list
    Cameras { cameras: Vec<CaptureDeviceDescriptor> },
    /// One camera
    Camera { camera: CaptureDeviceDescriptor },
    Muted { muted: bool },
    ZoomRatio { ratio: f64 },
    /// Session event pushed to a subscriber
    Event { event: SessionEvent },
    /// Shutdown acknowledgment
    Stopping,
}

/// Current host status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Session snapshot, if a session exists
    pub session: Option<SessionSnapshot>,
    /// Whether the engine instance exists
    pub engine_created: bool,
    /// Most recent session event
    pub last_event: Option<SessionEvent>,
    /// Process ID
    pub pid: u32,
    /// Uptime in seconds
    pub uptime_seconds: f64,
}

impl IpcMessage {
    /// Serialize message to JSON bytes with newline terminator
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = serde_json::to_vec(self).unwrap_or_default();
        bytes.push(b'\n');
        bytes
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl IpcResponse {
    /// Serialize response to JSON bytes with newline terminator
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = serde_json::to_vec(self).unwrap_or_default();
        bytes.push(b'\n');
        bytes
    }

    /// Deserialize response from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Create an error response
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        IpcResponse::Error {
            kind,
            message: message.into(),
        }
    }
}

impl From<&LivecastError> for IpcResponse {
    fn from(err: &LivecastError) -> Self {
        IpcResponse::error(err.kind(), err.to_string())
    }
}

impl From<LivecastError> for IpcResponse {
    fn from(err: LivecastError) -> Self {
        IpcResponse::from(&err)
    }
}
