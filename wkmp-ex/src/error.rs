//! Error types for wkmp-ex
//!
//! Every external call site returns `ExploreError`. The explorer folds these
//! into a single `had_errors` flag; only the orchestrator turns failures into
//! a user-facing status string.

use std::time::Duration;
use thiserror::Error;

/// Explore error type
#[derive(Debug, Error)]
pub enum ExploreError {
    /// Transport failure (DNS, connect, TLS, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Lookup returned nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Call exceeded the configured deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Collaborator-specific failure
    #[error("Service error: {0}")]
    Service(String),

    /// Generic error from host-provided collaborators
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// wkmp-common error
    #[error("Common error: {0}")]
    Common(#[from] wkmp_common::Error),
}

impl From<reqwest::Error> for ExploreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExploreError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ExploreError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ExploreError::Network(err.to_string())
        }
    }
}

/// Result type for explore operations
pub type Result<T> = std::result::Result<T, ExploreError>;
