//! Error types for Livecast

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permission::Permission;

/// Result type alias using LivecastError
pub type Result<T> = std::result::Result<T, LivecastError>;

/// Main error type for Livecast operations
#[derive(Debug, Error)]
pub enum LivecastError {
    /// State-machine precondition violated (e.g. reconfigure while streaming)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Unknown device identifier or unclassifiable lens direction
    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    /// Settings operation targeted a video input that is not a camera
    #[error("Not a camera source")]
    NotACaptureSource,

    /// Preview requested before any video configuration was set
    #[error("Video has not been configured")]
    NotConfigured,

    /// Permission was denied or needs a rationale the caller did not act on
    #[error("Missing permission {permission}")]
    PermissionDenied {
        permission: Permission,
        rationale: Option<String>,
    },

    /// Failure surfaced by the streaming engine
    #[error("Engine error: {0}")]
    Engine(String),

    /// Value object invariant violated
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IPC transport error
    #[error("IPC error: {0}")]
    Ipc(String),

    /// Error reported by a remote daemon
    #[error("{message}")]
    Remote { kind: ErrorKind, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LivecastError>,
    },
}

/// Wire-stable classification of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidOperation,
    InvalidDevice,
    NotACaptureSource,
    NotConfigured,
    PermissionDenied,
    EngineFailure,
    InvalidConfig,
    Config,
    Ipc,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidOperation => "invalid operation",
            Self::InvalidDevice => "invalid device",
            Self::NotACaptureSource => "not a capture source",
            Self::NotConfigured => "not configured",
            Self::PermissionDenied => "permission denied",
            Self::EngineFailure => "engine failure",
            Self::InvalidConfig => "invalid configuration",
            Self::Config => "configuration",
            Self::Ipc => "ipc",
            Self::Io => "i/o",
        };
        write!(f, "{}", name)
    }
}

impl LivecastError {
    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create an invalid device error
    pub fn invalid_device(msg: impl Into<String>) -> Self {
        Self::InvalidDevice(msg.into())
    }

    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a config file error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IPC error
    pub fn ipc(msg: impl Into<String>) -> Self {
        Self::Ipc(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(permission: Permission, rationale: Option<String>) -> Self {
        Self::PermissionDenied {
            permission,
            rationale,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Reclassify an error returned by the streaming engine.
    ///
    /// Engine implementations may return any variant; the session reports
    /// all of them as engine failures with the operation as context.
    pub fn into_engine_failure(self, operation: &str) -> Self {
        match self {
            Self::Engine(_) => self.with_context(operation.to_string()),
            other => Self::Engine(format!("{}: {}", operation, other)),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::InvalidDevice(_) => ErrorKind::InvalidDevice,
            Self::NotACaptureSource => ErrorKind::NotACaptureSource,
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Engine(_) => ErrorKind::EngineFailure,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::Config(_) => ErrorKind::Config,
            Self::Ipc(_) => ErrorKind::Ipc,
            Self::Remote { kind, .. } => *kind,
            Self::Io(_) => ErrorKind::Io,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// Whether this error is security-classified (permission related)
    pub fn is_security(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }

    /// Rationale text attached to a permission denial, if any
    pub fn rationale(&self) -> Option<&str> {
        match self {
            Self::PermissionDenied { rationale, .. } => rationale.as_deref(),
            Self::WithContext { source, .. } => source.rationale(),
            _ => None,
        }
    }

    /// A short hint for the user on how to resolve the error
    pub fn user_hint(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::InvalidOperation => Some("Stop streaming before changing the session"),
            ErrorKind::InvalidDevice => Some("Run `livecast cameras` to list valid camera ids"),
            ErrorKind::NotACaptureSource => Some("Select a camera with `livecast camera <id>`"),
            ErrorKind::NotConfigured => Some("Set a video configuration with `livecast configure`"),
            ErrorKind::PermissionDenied => {
                Some("Grant camera/microphone access in the [permissions] section of config.toml")
            }
            ErrorKind::Config => Some("Check ~/.config/livecast/config.toml for syntax errors"),
            ErrorKind::Ipc => Some("Make sure the livecast host daemon is running"),
            ErrorKind::EngineFailure | ErrorKind::InvalidConfig | ErrorKind::Io => None,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl From<serde_json::Error> for LivecastError {
    fn from(err: serde_json::Error) -> Self {
        Self::Ipc(format!("Malformed message: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_survives_context() {
        let err = LivecastError::NotConfigured.with_context("Starting preview");
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
    }

    #[test]
    fn test_engine_failure_reclassification() {
        let err = LivecastError::invalid_device("42").into_engine_failure("setCameraId");
        assert_eq!(err.kind(), ErrorKind::EngineFailure);
        assert!(err.to_string().contains("setCameraId"));
    }
}
