//! Error types for the IBM Quantum adapter.

use qrun_hal::HalError;
use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when talking to IBM Quantum.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IbmError {
    /// No credentials were supplied.
    #[error(
        "IBM Quantum credentials not found. Set IBM_API_KEY and IBM_SERVICE_CRN, or IBM_QUANTUM_TOKEN."
    )]
    MissingToken,

    /// Token cannot be used as a header value.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// An API key was given without a service CRN.
    #[error("IBM_SERVICE_CRN is required when using IBM_API_KEY")]
    MissingServiceCrn,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or body.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Backend not found or offline.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Circuit could not be serialized.
    #[error("Circuit conversion error: {0}")]
    Circuit(#[from] qrun_qasm3::Qasm3Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Result payload did not have the expected shape.
    #[error("Malformed result: {0}")]
    MalformedResult(String),
}

impl From<IbmError> for HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::MissingServiceCrn => HalError::AuthenticationFailed(e.to_string()),
            IbmError::Api { status: 401 | 403, .. } => HalError::AuthenticationFailed(e.to_string()),
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::BackendUnavailable(name) => HalError::BackendUnavailable(name),
            IbmError::Circuit(e) => HalError::InvalidCircuit(e.to_string()),
            IbmError::Http(e) => HalError::Network(e),
            IbmError::Json(e) => HalError::Serialization(e),
            IbmError::MalformedResult(msg) => HalError::UnexpectedResult(msg),
            IbmError::Api { .. } => HalError::Backend(e.to_string()),
        }
    }
}
