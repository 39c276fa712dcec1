//! Remote backend abstraction
//!
//! A backend executes single attempts against the remote key-value service.
//! Retrying is the store's job; backends report each failure as-is.

use std::fmt;
use std::time::Duration;

use crate::error::BackendError;

/// Result type for single backend attempts
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Connection-oriented key-value service
///
/// Implementations must be safe to share between tasks.
#[async_trait::async_trait]
pub trait RemoteBackend: Send + Sync + fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Establish the connection handle
    async fn connect(&self) -> BackendResult<()>;

    /// Read a key. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Write a key with an optional expiry
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> BackendResult<()>;
}
