//! Local TTL cache
//!
//! Entries expire lazily: an expired entry is ignored on read and only
//! replaced when the key is written again. There is no background sweep and
//! no size bound, so callers should keep the key space small.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Default lifetime of a cache entry
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    /// `None` when the lifetime is beyond what the clock can represent
    expires_at: Option<Instant>,
}

/// Mutex-guarded map of `key -> (value, expires_at)`
#[derive(Debug, Default)]
pub struct LocalCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value if present and its expiry is strictly in the future
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.lock()
            .get(key)
            .filter(|entry| entry.expires_at.map_or(true, |at| at > now))
            .map(|entry| entry.value.clone())
    }

    /// Write or overwrite an entry expiring `ttl` from now
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.lock().insert(
            key.into(),
            CacheEntry {
                value: value.into(),
                expires_at,
            },
        );
    }

    /// Number of entries held, including expired ones not yet overwritten
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave an entry half-written,
    // so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get() {
        let cache = LocalCache::new();
        assert_eq!(cache.get("cache_test"), None);

        cache.set("cache_test", "test", DEFAULT_CACHE_TTL);
        assert_eq!(cache.get("cache_test").as_deref(), Some("test"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_expired_immediately() {
        let cache = LocalCache::new();
        cache.set("cache_test", "expire_test", Duration::ZERO);
        assert_eq!(cache.get("cache_test"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_ttl_never_expires() {
        let cache = LocalCache::new();
        cache.set("k", "v", Duration::from_secs(u64::MAX));
        cache.set("max", "v", Duration::MAX);

        tokio::time::advance(Duration::from_secs(365 * 24 * 60 * 60)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert_eq!(cache.get("max").as_deref(), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_is_lazy() {
        let cache = LocalCache::new();
        cache.set("k", "v", Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), None);
        // Expired entries stay until overwritten
        assert_eq!(cache.len(), 1);

        cache.set("k", "fresh", Duration::from_secs(60));
        assert_eq!(cache.get("k").as_deref(), Some("fresh"));
        assert_eq!(cache.len(), 1);
    }
}
