//! Recognition client errors.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Recognition server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered but marked the result invalid.
    #[error("Recognition rejected: {}", .description.as_deref().unwrap_or("no description"))]
    Rejected { description: Option<String> },

    /// The same request is already being recognised.
    #[error("Recognition already in flight")]
    InFlight,
}

impl RecognitionError {
    /// Whether a later attempt with the same input could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RecognitionError::Network(_)
                | RecognitionError::Api { .. }
                | RecognitionError::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for RecognitionError {
    fn from(err: reqwest::Error) -> Self {
        RecognitionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for RecognitionError {
    fn from(err: serde_json::Error) -> Self {
        RecognitionError::InvalidResponse(err.to_string())
    }
}
