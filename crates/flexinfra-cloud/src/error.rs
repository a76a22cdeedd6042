//! Cloud provider error types.

use thiserror::Error;

/// Failure categories for provisioning operations.
///
/// Validation errors are raised before any mutating vendor call; upstream
/// engine failures are surfaced unchanged, wrapped with the server and
/// provider context, and never retried at this layer.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("server '{server}' rejected by provider '{provider}': {reason}")]
    InvalidResource {
        server: String,
        provider: String,
        reason: String,
    },

    #[error("provider '{provider}' does not support {operation}")]
    Unsupported {
        provider: String,
        operation: String,
    },

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("provider '{0}' is not ready: private network has not been provisioned")]
    NotReady(String),

    #[error("provisioning engine failed for '{resource}' on provider '{provider}': {message}")]
    Upstream {
        provider: String,
        resource: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Wrap a provisioning-engine failure with its provider and resource
    /// context.
    pub fn upstream(
        provider: impl Into<String>,
        resource: impl Into<String>,
        error: impl std::fmt::Display,
    ) -> Self {
        CloudError::Upstream {
            provider: provider.into(),
            resource: resource.into(),
            message: error.to_string(),
        }
    }
}

impl From<flexinfra_core::CoreError> for CloudError {
    fn from(err: flexinfra_core::CoreError) -> Self {
        CloudError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
