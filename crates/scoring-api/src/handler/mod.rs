//! HTTP transport for the scoring API
//!
//! - `routes`: router, shared state and endpoint handlers
//!
//! Every `/method` response, success or failure, uses the same JSON
//! envelope: `{"response": ..., "code": 200}` or `{"error": "...", "code": c}`
//! with the HTTP status equal to `code`.

pub mod routes;

pub use routes::{create_router, AppState, REQUEST_ID_HEADER};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::status_text;

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Success { response: Value, code: u16 },
    Error { error: String, code: u16 },
}

impl Envelope {
    pub fn success(response: Value) -> Self {
        Envelope::Success {
            response,
            code: StatusCode::OK.as_u16(),
        }
    }

    /// Error envelope, falling back to the status text when `message` is `None`
    pub fn error(status: StatusCode, message: Option<String>) -> Self {
        Envelope::Error {
            error: message.unwrap_or_else(|| status_text(status).to_string()),
            code: status.as_u16(),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Envelope::Success { code, .. } | Envelope::Error { code, .. } => *code,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store_backend: String,
    pub uptime_seconds: u64,
}
