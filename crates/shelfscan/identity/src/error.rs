use thiserror::Error;

/// Result type for storage backing operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for identity resolution.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors raised by a single storage backing.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing refuses access (disabled, quota exceeded, locked down).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing file exists but does not hold the expected shape.
    #[error("corrupt storage: {0}")]
    Corrupt(String),
}

/// Errors surfaced by the device identity manager.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Neither backing accepted the resolved identity and persistence is required.
    #[error("device identity could not be persisted: durable storage: {durable}; cookie: {cookie}")]
    PersistenceUnavailable { durable: String, cookie: String },
}

/// Errors raised when a caller needs the identity but the gate is not ready.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Identity resolution has not completed yet.
    #[error("device identity is not ready (state: {0})")]
    NotReady(String),

    /// Identity resolution finished with an error.
    #[error("device identity initialization failed: {0}")]
    Failed(String),

    /// Waiting for readiness exceeded the allowed bound.
    #[error("timed out after {0}ms waiting for device identity")]
    Timeout(u64),
}
