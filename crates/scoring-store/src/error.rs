//! Error types for store operations

use thiserror::Error;

/// Failure reported by a remote backend for a single attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend could not be reached or the connection dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// The backend did not answer in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The backend answered with an error
    #[error("Command error: {0}")]
    Command(String),
}

impl BackendError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Connection(_) | BackendError::Timeout(_))
    }
}

/// Error returned by [`crate::KeyedStore`] remote operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Every attempt failed with a retryable error
    #[error("Store unavailable: connection failed after {attempts} tries ({last_error})")]
    Unavailable {
        attempts: u32,
        last_error: BackendError,
    },

    /// The backend rejected the operation
    #[error("Store error: {0}")]
    Backend(BackendError),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
