//! Error types for the IBM Quantum adapter.

use thiserror::Error;
use tfim_runtime::RuntimeError;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when talking to IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// No credentials in the environment.
    #[error(
        "IBM Quantum credentials not found. Set IBM_API_KEY (with IBM_SERVICE_CRN) or IBM_QUANTUM_TOKEN."
    )]
    MissingToken,

    /// Token cannot be used as a header value.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// API key given without a service CRN.
    #[error("IBM_SERVICE_CRN environment variable is required when using IBM_API_KEY")]
    MissingServiceCrn,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error code from the body, if any.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Backend not found or offline.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl IbmError {
    /// Whether the service rejected the credentials.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::MissingServiceCrn => true,
            IbmError::ApiError { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }
}

impl From<IbmError> for RuntimeError {
    fn from(e: IbmError) -> Self {
        if e.is_auth_failure() {
            return RuntimeError::AuthenticationFailed(e.to_string());
        }
        match e {
            IbmError::JobNotFound(id) => RuntimeError::JobNotFound(id),
            IbmError::BackendUnavailable(name) => RuntimeError::NoBackendAvailable(name),
            IbmError::InvalidParameter(msg) => RuntimeError::InvalidParameter(msg),
            IbmError::JsonError(err) => RuntimeError::Serialization(err),
            other => RuntimeError::Backend(other.to_string()),
        }
    }
}
