//! Client error types

use shelfscan_identity::GateError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Identity-bound request attempted before the gate was ready
    #[error("request blocked: {0}")]
    NotReady(#[from] GateError),

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {status_text}")]
    Status {
        status: u16,
        status_text: String,
        /// Raw response body, often `{"error": "..."}`
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("invalid JSON from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Rejected before sending
    #[error("{0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `error` field from a JSON error body, when present.
    pub fn backend_message(&self) -> Option<String> {
        let ClientError::Status { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("error")?
            .as_str()
            .map(str::to_string)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
