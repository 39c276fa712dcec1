//! Keyed store for the scoring API
//!
//! Mediates access to a remote key-value service with bounded retries, and
//! keeps a local TTL cache for lookups that may degrade to "no value".
//!
//! # Supported Backends
//!
//! - **Redis**: [`RedisBackend`], the production backend
//! - **Memory**: [`MemoryBackend`], in-process, for local runs and tests
//!
//! # Example
//!
//! ```rust
//! use scoring_store::{KeyedStore, MemoryBackend};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store = KeyedStore::new(Arc::new(MemoryBackend::new()));
//! store.connect().await.unwrap();
//! store.set("i:1", Some(r#"["cars","pets"]"#), None).await.unwrap();
//! assert!(store.get("i:1").await.unwrap().is_some());
//!
//! store.cache_set("uid:abc", "3.0");
//! assert_eq!(store.cache_get("uid:abc").as_deref(), Some("3.0"));
//! # });
//! ```

pub mod backend;
pub mod cache;
pub mod error;
pub mod memory;
pub mod redis_backend;
pub mod retry;
pub mod store;

pub use backend::{BackendResult, RemoteBackend};
pub use cache::{LocalCache, DEFAULT_CACHE_TTL};
pub use error::{BackendError, Result, StoreError};
pub use memory::MemoryBackend;
pub use redis_backend::{
    RedisBackend, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REDIS_URL, DEFAULT_RESPONSE_TIMEOUT,
};
pub use retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
pub use store::KeyedStore;
