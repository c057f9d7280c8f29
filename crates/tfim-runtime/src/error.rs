//! Error types for the runtime crate.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while selecting a backend or running the sweep.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// Building an operator failed.
    #[error("Operator error: {0}")]
    Operator(#[from] tfim_ops::OpsError),

    /// No backend matched the selection filter.
    #[error("No backend available: {0}")]
    NoBackendAvailable(String),

    /// Authentication with the remote service failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The service rejected or failed to accept a job.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// A program input or option is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic service error.
    #[error("Runtime service error: {0}")]
    Backend(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
