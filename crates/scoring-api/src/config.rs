//! Server configuration
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional TOML file (`--config`), then command line flags and their
//! environment fallbacks.

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use scoring_store::{
    KeyedStore, MemoryBackend, RedisBackend, RemoteBackend, RetryPolicy, DEFAULT_BASE_DELAY,
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_ATTEMPTS, DEFAULT_REDIS_URL, DEFAULT_RESPONSE_TIMEOUT,
};

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

/// Command line flags
#[derive(Parser, Debug, Default)]
#[command(name = "scoring-api")]
#[command(about = "Scoring API server")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "SCORING_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "SCORING_HOST")]
    pub host: Option<String>,

    /// Log file, stderr when omitted
    #[arg(short, long, env = "SCORING_LOG")]
    pub log: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, env = "SCORING_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Remote store backend
    #[arg(long, value_enum, env = "SCORING_STORE")]
    pub store: Option<StoreKind>,

    /// Redis connection URL
    #[arg(long, env = "SCORING_REDIS_URL")]
    pub redis_url: Option<String>,

    /// Attempts per remote store operation
    #[arg(long, env = "SCORING_RETRY_ATTEMPTS")]
    pub retry_attempts: Option<u32>,

    /// Base delay between attempts, multiplied by the attempt number
    #[arg(long, env = "SCORING_RETRY_BASE_DELAY_MS")]
    pub retry_base_delay_ms: Option<u64>,

    /// Bound on a single Redis connect
    #[arg(long, env = "SCORING_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Bound on a single Redis command round trip
    #[arg(long, env = "SCORING_RESPONSE_TIMEOUT_MS")]
    pub response_timeout_ms: Option<u64>,

    /// TOML configuration file
    #[arg(short, long, env = "SCORING_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub format: LogFormat,
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            format: LogFormat::Text,
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreKind,
    pub redis_url: String,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub connect_timeout_ms: u64,
    pub response_timeout_ms: u64,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreKind::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            retry_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: millis(DEFAULT_BASE_DELAY),
            connect_timeout_ms: millis(DEFAULT_CONNECT_TIMEOUT),
            response_timeout_ms: millis(DEFAULT_RESPONSE_TIMEOUT),
        }
    }
}

impl StoreConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    /// Build the keyed store for the configured backend. Does not connect.
    pub fn build_store(&self) -> Result<KeyedStore, ConfigError> {
        let backend: Arc<dyn RemoteBackend> = match self.backend {
            StoreKind::Redis => Arc::new(
                RedisBackend::with_timeouts(
                    self.redis_url.clone(),
                    Duration::from_millis(self.connect_timeout_ms),
                    Duration::from_millis(self.response_timeout_ms),
                )
                .map_err(|e| ConfigError::Invalid(format!("redis_url: {}", e)))?,
            ),
            StoreKind::Memory => Arc::new(MemoryBackend::new()),
        };
        Ok(KeyedStore::with_retry(backend, self.retry_policy()))
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the effective configuration for the given flags
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(log) = &cli.log {
            self.logging.file = Some(log.clone());
        }
        if let Some(format) = cli.log_format {
            self.logging.format = format;
        }
        if let Some(store) = cli.store {
            self.store.backend = store;
        }
        if let Some(url) = &cli.redis_url {
            self.store.redis_url = url.clone();
        }
        if let Some(attempts) = cli.retry_attempts {
            self.store.retry_attempts = attempts;
        }
        if let Some(delay) = cli.retry_base_delay_ms {
            self.store.retry_base_delay_ms = delay;
        }
        if let Some(timeout) = cli.connect_timeout_ms {
            self.store.connect_timeout_ms = timeout;
        }
        if let Some(timeout) = cli.response_timeout_ms {
            self.store.response_timeout_ms = timeout;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "store.retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.store.connect_timeout_ms == 0 || self.store.response_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store timeouts must be at least 1 ms".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
