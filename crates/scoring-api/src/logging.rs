//! Tracing subscriber setup for the server binary

use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::ConfigError;

/// Filter from `RUST_LOG`, falling back to the configured directives
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

fn make_writer(config: &LoggingConfig) -> Result<BoxMakeWriter, ConfigError> {
    match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(std::io::stderr)),
    }
}

/// Install the global subscriber
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let writer = make_writer(config)?;
    let ansi = config.file.is_none();
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };
    result.map_err(|e| ConfigError::Logging(e.to_string()))
}
