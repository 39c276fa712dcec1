//! Error types for the scoring API
//!
//! [`MethodError`] covers everything a method call can fail with and knows
//! its HTTP status. [`ConfigError`] covers startup.

use axum::http::StatusCode;
use scoring_schema::ValidationError;
use scoring_store::StoreError;
use thiserror::Error;

/// Error returned by the method handler
#[derive(Error, Debug)]
pub enum MethodError {
    /// The envelope or the method arguments failed validation
    #[error("Sorry, your request contains errors: {0}")]
    Validation(#[from] ValidationError),

    /// The token does not match the account and login
    #[error("Auth failed")]
    Forbidden,

    /// The envelope names a method that does not exist
    #[error("Sorry, your request contains errors: unknown method '{0}'")]
    UnknownMethod(String),

    /// The store could not serve a lookup the method depends on
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl MethodError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MethodError::Validation(_) | MethodError::UnknownMethod(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            MethodError::Forbidden => StatusCode::FORBIDDEN,
            MethodError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the client, `None` to use the status text
    pub fn public_message(&self) -> Option<String> {
        match self {
            MethodError::Forbidden | MethodError::Store(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Short kind used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            MethodError::Validation(err) => err.kind(),
            MethodError::Forbidden => "forbidden",
            MethodError::UnknownMethod(_) => "unknown_method",
            MethodError::Store(_) => "store",
        }
    }
}

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Default status text, used when an error carries no message
pub fn status_text(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad Request",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::NOT_FOUND => "Not Found",
        StatusCode::UNPROCESSABLE_ENTITY => "Invalid Request",
        StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
        _ => "Unknown Error",
    }
}
