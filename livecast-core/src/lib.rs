//! Livecast Core Library
//!
//! Session control for live camera streaming over RTMP and SRT.
//!
//! This library provides:
//! - Camera discovery and per-device characteristics
//! - Permission gating for camera and microphone access
//! - A session state machine driving a pluggable streaming engine
//! - A host facade and Unix socket IPC for daemon mode
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌───────────────────┐    ┌─────────────────┐
//! │ LiveStreamHost  │───▶│ SessionController │───▶│ StreamingEngine │
//! │ (IPC / caller)  │◀───│ (state machine)   │◀───│ (capture+encode)│
//! └─────────────────┘    └───────────────────┘    └─────────────────┘
//!         events              relay                  engine events
//! ```

pub mod capture;
pub mod config;
pub mod destination;
pub mod engine;
pub mod error;
pub mod host;
pub mod ipc;
pub mod permission;
pub mod session;
pub mod surface;
pub mod types;

pub use capture::{CaptureSettings, CaptureSourceRegistry, SysfsCameraPlatform};
pub use config::{AudioConfig, Preset, Resolution, VideoConfig};
pub use engine::{EngineEvent, InstanceRegistry, StreamingEngine};
pub use error::{ErrorKind, LivecastError, Result};
pub use host::LiveStreamHost;
pub use permission::{Permission, PermissionGate, PermissionOutcome, PolicyPrompt};
pub use session::{SessionController, SessionListener, SessionSnapshot};
pub use types::{CaptureDeviceDescriptor, Handle, LensDirection, SessionEvent, SessionPhase};
