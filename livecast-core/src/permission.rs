//! Permission gate
//!
//! Resolves a named system permission to exactly one of three outcomes.
//! The platform prompt is behind [`PermissionPrompt`]; [`PermissionGate`]
//! makes sure a failing prompt still resolves (to `Denied`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{LivecastError, Result};

/// Permissions a live stream session needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Camera capture
    Camera,
    /// Microphone capture
    RecordAudio,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Camera => write!(f, "CAMERA"),
            Self::RecordAudio => write!(f, "RECORD_AUDIO"),
        }
    }
}

/// Result of one permission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// Access granted
    Granted,
    /// The platform wants the app to explain why it needs access
    NeedsRationale { rationale: Option<String> },
    /// Access denied
    Denied,
}

impl PermissionOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Platform permission-request primitive
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    /// Ask the platform for a permission
    async fn request(&self, permission: Permission) -> Result<PermissionOutcome>;
}

/// Stateless permission gate in front of a platform prompt
#[derive(Clone)]
pub struct PermissionGate {
    prompt: Arc<dyn PermissionPrompt>,
}

impl PermissionGate {
    /// Create a gate over the given prompt
    pub fn new(prompt: Arc<dyn PermissionPrompt>) -> Self {
        Self { prompt }
    }

    /// Request a permission
    ///
    /// A prompt failure resolves to [`PermissionOutcome::Denied`].
    pub async fn request(&self, permission: Permission) -> PermissionOutcome {
        match self.prompt.request(permission).await {
            Ok(outcome) => {
                debug!("Permission {} resolved: {:?}", permission, outcome);
                outcome
            }
            Err(e) => {
                warn!("Permission prompt for {} failed: {}. Treating as denied.", permission, e);
                PermissionOutcome::Denied
            }
        }
    }

    /// Request a permission and invoke exactly one of the continuations
    pub async fn request_with<T>(
        &self,
        permission: Permission,
        on_granted: impl FnOnce() -> T,
        on_needs_rationale: impl FnOnce(Option<String>) -> T,
        on_denied: impl FnOnce() -> T,
    ) -> T {
        match self.request(permission).await {
            PermissionOutcome::Granted => on_granted(),
            PermissionOutcome::NeedsRationale { rationale } => on_needs_rationale(rationale),
            PermissionOutcome::Denied => on_denied(),
        }
    }

    /// Require a permission, failing with a security-classified error
    pub async fn require(&self, permission: Permission) -> Result<()> {
        self.request_with(
            permission,
            || Ok(()),
            |rationale| Err(LivecastError::permission_denied(permission, rationale)),
            || Err(LivecastError::permission_denied(permission, None)),
        )
        .await
    }
}

/// Configured answer for a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    #[default]
    Grant,
    Deny,
    Rationale,
}

/// Prompt that answers from fixed policies
///
/// Used by hosts that have no interactive permission UI.
#[derive(Debug, Clone, Default)]
pub struct PolicyPrompt {
    camera: PermissionPolicy,
    record_audio: PermissionPolicy,
    rationale: Option<String>,
}

impl PolicyPrompt {
    pub fn new(camera: PermissionPolicy, record_audio: PermissionPolicy) -> Self {
        Self {
            camera,
            record_audio,
            rationale: None,
        }
    }

    /// Grant everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Set the rationale text returned for `Rationale` policies
    pub fn with_rationale(mut self, rationale: Option<String>) -> Self {
        self.rationale = rationale;
        self
    }

    fn policy(&self, permission: Permission) -> PermissionPolicy {
        match permission {
            Permission::Camera => self.camera,
            Permission::RecordAudio => self.record_audio,
        }
    }
}

#[async_trait]
impl PermissionPrompt for PolicyPrompt {
    async fn request(&self, permission: Permission) -> Result<PermissionOutcome> {
        Ok(match self.policy(permission) {
            PermissionPolicy::Grant => PermissionOutcome::Granted,
            PermissionPolicy::Deny => PermissionOutcome::Denied,
            PermissionPolicy::Rationale => PermissionOutcome::NeedsRationale {
                rationale: self.rationale.clone(),
            },
        })
    }
}
