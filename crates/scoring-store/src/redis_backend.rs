//! Redis backend
//!
//! Uses a [`MultiplexedConnection`], which is cheap to clone and safe to use
//! from concurrent tasks. Every connect is a single attempt bounded by the
//! connect timeout, and every command is bounded by the response timeout;
//! retrying is left to the store's [`RetryPolicy`](crate::RetryPolicy).
//! A connection that fails with a retryable error is dropped, and the next
//! operation reconnects.

use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::backend::{BackendResult, RemoteBackend};
use crate::error::BackendError;

/// Default Redis endpoint
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:60722/";

/// Default bound on establishing a connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default bound on a single command round trip
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// [`RemoteBackend`] backed by a Redis server
pub struct RedisBackend {
    url: String,
    client: Client,
    connect_timeout: Duration,
    response_timeout: Duration,
    connection: RwLock<Option<MultiplexedConnection>>,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend")
            .field("url", &self.url)
            .field("connect_timeout", &self.connect_timeout)
            .field("response_timeout", &self.response_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Create a backend for the given URL without connecting
    pub fn new(url: impl Into<String>) -> BackendResult<Self> {
        Self::with_timeouts(url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT)
    }

    /// Create a backend with explicit connect and response timeouts
    pub fn with_timeouts(
        url: impl Into<String>,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> BackendResult<Self> {
        let url = url.into();
        let client = Client::open(url.as_str())
            .map_err(|e| BackendError::Command(format!("invalid redis url '{}': {}", url, e)))?;
        Ok(Self {
            url,
            client,
            connect_timeout,
            response_timeout,
            connection: RwLock::new(None),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    async fn connection(&self) -> BackendResult<MultiplexedConnection> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }
        self.connect().await?;
        self.connection
            .read()
            .await
            .clone()
            .ok_or_else(|| BackendError::Connection("connection was not established".to_string()))
    }

    /// Map a command error, dropping the connection when the error is retryable
    async fn command_failed(&self, err: RedisError) -> BackendError {
        let err = map_redis_error(err);
        if err.is_retryable() {
            self.connection.write().await.take();
        }
        err
    }
}

fn map_redis_error(err: RedisError) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        BackendError::Connection(err.to_string())
    } else {
        BackendError::Command(err.to_string())
    }
}

#[async_trait::async_trait]
impl RemoteBackend for RedisBackend {
    fn name(&self) -> &str {
        "redis"
    }

    async fn connect(&self) -> BackendResult<()> {
        let connection = self
            .client
            .get_multiplexed_async_connection_with_timeouts(
                self.response_timeout,
                self.connect_timeout,
            )
            .await
            .map_err(map_redis_error)?;
        *self.connection.write().await = Some(connection);
        tracing::debug!(url = %self.url, "Connected to redis");
        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut conn = self.connection().await?;
        match redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(value) => Ok(value),
            Err(e) => Err(self.command_failed(e).await),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        match cmd.query_async::<_, ()>(&mut conn).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.command_failed(e).await),
        }
    }
}
