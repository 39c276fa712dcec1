//! Scoring API
//!
//! A single `POST /method` endpoint taking an authenticated envelope:
//!
//! ```json
//! {"account": "horns&hoofs", "login": "h&f", "method": "online_score",
//!  "token": "<sha512 hex>", "arguments": {"phone": "79175002040", "email": "a@b.c"}}
//! ```
//!
//! ## Methods
//!
//! - `online_score`: scores a person from the submitted fields; cached
//!   locally, answers even when the remote store is down
//! - `clients_interests`: interests per client id, read from the remote store
//!
//! ## Modules
//!
//! - `auth`: token checks
//! - `method`: envelope validation and dispatch
//! - `scoring`: score and interests lookups against the keyed store
//! - `handler`: axum router and response envelopes
//! - `config`, `logging`, `metrics`: server plumbing

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod method;
pub mod metrics;
pub mod scoring;

pub use auth::{admin_token, check_auth, user_token, ADMIN_SALT, SALT};
pub use config::{AppConfig, Cli, LogFormat, StoreKind};
pub use error::{ConfigError, MethodError};
pub use handler::{create_router, AppState, Envelope};
pub use method::{method_handler, method_handler_at, Method, RequestContext, ADMIN_SCORE};
pub use metrics::ApiMetrics;
pub use scoring::{get_interests, get_score};
