//! Scaleway provider error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScalewayError {
    #[error("scw CLI not found. Please install: https://github.com/scaleway/scaleway-cli")]
    ScwNotFound,

    #[error("scw command failed: {0}")]
    CommandFailed(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cloud error: {0}")]
    Cloud(#[from] flexinfra_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, ScalewayError>;
