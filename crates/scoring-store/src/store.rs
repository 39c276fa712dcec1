//! Two-tier keyed store
//!
//! Remote operations (`connect`, `get`, `set`) go through the retry policy
//! and report unavailability to the caller. Cache operations (`cache_get`,
//! `cache_set`) only touch the local map and never fail, which makes them
//! usable for lookups that tolerate stale or missing data.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::RemoteBackend;
use crate::cache::{LocalCache, DEFAULT_CACHE_TTL};
use crate::error::Result;
use crate::retry::RetryPolicy;

/// Remote key-value access with a local TTL cache
#[derive(Debug, Clone)]
pub struct KeyedStore {
    backend: Arc<dyn RemoteBackend>,
    cache: Arc<LocalCache>,
    retry: RetryPolicy,
}

impl KeyedStore {
    /// Create a store with the default retry policy
    pub fn new(backend: Arc<dyn RemoteBackend>) -> Self {
        Self::with_retry(backend, RetryPolicy::default())
    }

    pub fn with_retry(backend: Arc<dyn RemoteBackend>, retry: RetryPolicy) -> Self {
        Self {
            backend,
            cache: Arc::new(LocalCache::new()),
            retry,
        }
    }

    pub fn backend(&self) -> &Arc<dyn RemoteBackend> {
        &self.backend
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Establish the remote connection
    pub async fn connect(&self) -> Result<()> {
        tracing::info!(backend = self.backend.name(), "Connecting to store");
        self.retry.run("connect", move || self.backend.connect()).await
    }

    /// Read a key from the remote layer. A missing key is `Ok(None)`.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        tracing::debug!(key, "Getting value from store");
        self.retry.run("get", move || self.backend.get(key)).await
    }

    /// Write a key to the remote layer. `None` is a no-op.
    pub async fn set(&self, key: &str, value: Option<&str>, ttl: Option<Duration>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        tracing::debug!(key, "Setting value in store");
        self.retry.run("set", move || self.backend.set(key, value, ttl)).await
    }

    /// Read the local cache. Never touches the remote layer.
    pub fn cache_get(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }

    /// Write the local cache with the default one hour lifetime
    pub fn cache_set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.cache.set(key, value, DEFAULT_CACHE_TTL);
    }

    pub fn cache_set_with_ttl(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        self.cache.set(key, value, ttl);
    }
}
