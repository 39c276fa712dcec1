//! In-process backend
//!
//! Behaves like the remote service for local runs and tests. It can be
//! switched offline to simulate an unreachable server, and it counts the
//! attempts made against it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::backend::{BackendResult, RemoteBackend};
use crate::error::BackendError;

#[derive(Debug)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

/// Map-backed [`RemoteBackend`]
#[derive(Debug)]
pub struct MemoryBackend {
    data: Mutex<HashMap<String, StoredValue>>,
    available: AtomicBool,
    attempts: AtomicU32,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            attempts: AtomicU32::new(0),
        }
    }

    /// Simulate the server going down or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Number of operations attempted against this backend
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of keys currently held, expired or not
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredValue>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn attempt(&self) -> BackendResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.is_available() {
            Ok(())
        } else {
            Err(BackendError::Connection("memory backend is offline".to_string()))
        }
    }
}

#[async_trait::async_trait]
impl RemoteBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> BackendResult<()> {
        self.attempt()
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.attempt()?;
        let now = Instant::now();
        let data = self.lock();
        Ok(data
            .get(key)
            .filter(|stored| stored.expires_at.map_or(true, |at| at > now))
            .map(|stored| stored.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> BackendResult<()> {
        self.attempt()?;
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.lock().insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_set() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("test").await.unwrap(), None);

        backend.set("test", "ok", None).await.unwrap();
        assert_eq!(backend.get("test").await.unwrap().as_deref(), Some("ok"));
        assert_eq!(backend.attempts(), 3);
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_offline() {
        let backend = MemoryBackend::new();
        backend.set_available(false);
        assert!(matches!(backend.get("k").await, Err(BackendError::Connection(_))));
        assert!(matches!(backend.connect().await, Err(BackendError::Connection(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let backend = MemoryBackend::new();
        backend.set("k", "v", Some(Duration::from_secs(10))).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_ttl_never_expires() {
        let backend = MemoryBackend::new();
        backend.set("k", "v", Some(Duration::MAX)).await.unwrap();

        tokio::time::advance(Duration::from_secs(365 * 24 * 60 * 60)).await;
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
