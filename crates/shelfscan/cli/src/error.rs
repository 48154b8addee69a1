//! CLI error types

use shelfscan_client::ClientError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Backend call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Device identity could not be initialized
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
