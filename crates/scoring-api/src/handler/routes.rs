//! Route definitions
//!
//! - POST /method - API call envelope, see [`crate::method`]
//! - GET /health - Liveness check
//! - GET /metrics - Prometheus exposition
//!
//! Any other path answers with a 404 envelope.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use scoring_store::KeyedStore;

use super::{Envelope, HealthResponse};
use crate::method::{method_handler, Method, RequestContext};
use crate::metrics::ApiMetrics;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub store: KeyedStore,
    pub metrics: Arc<ApiMetrics>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: KeyedStore, metrics: Arc<ApiMetrics>) -> Self {
        Self {
            store,
            metrics,
            start_time: Instant::now(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/method", post(method_endpoint))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// Metrics label for the requested method, bounded to the known names
fn method_label(body: &Value) -> &'static str {
    body.get("method")
        .and_then(Value::as_str)
        .and_then(Method::from_name)
        .map(|method| method.as_str())
        .unwrap_or("unknown")
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn method_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = request_id(&headers);
    let mut method = "unknown";
    let mut timer = state.metrics.start_timer(method);

    let envelope = match serde_json::from_slice::<Value>(&body) {
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body is not JSON");
            state.metrics.record_error("bad_request");
            Envelope::error(StatusCode::BAD_REQUEST, None)
        }
        Ok(body) => {
            method = method_label(&body);
            timer.set_method(method);
            tracing::info!(request_id = %request_id, method, "Handling method request");

            let mut ctx = RequestContext::new(request_id.clone());
            match method_handler(&body, &mut ctx, &state.store).await {
                Ok(response) => {
                    tracing::info!(
                        request_id = %request_id,
                        method,
                        is_admin = ctx.is_admin,
                        has = ?ctx.has,
                        nclients = ctx.nclients,
                        "Method request succeeded"
                    );
                    Envelope::success(response)
                }
                Err(err) => {
                    let status = err.status_code();
                    if status.is_server_error() {
                        tracing::error!(request_id = %request_id, method, error = %err, "Method request failed");
                    }
                    state.metrics.record_error(err.kind());
                    Envelope::error(status, err.public_message())
                }
            }
        }
    };

    drop(timer);
    state.metrics.record_request(method, envelope.code());
    with_request_id(envelope.into_response(), &request_id)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_backend: state.store.backend().name().to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            Envelope::error(StatusCode::INTERNAL_SERVER_ERROR, None).into_response()
        }
    }
}

async fn not_found(headers: HeaderMap) -> Response {
    let request_id = request_id(&headers);
    with_request_id(
        Envelope::error(StatusCode::NOT_FOUND, None).into_response(),
        &request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[test]
    fn test_request_id_generated() {
        let id = request_id(&HeaderMap::new());
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_method_label() {
        assert_eq!(method_label(&json!({"method": "online_score"})), "online_score");
        assert_eq!(method_label(&json!({"method": "drop_tables"})), "unknown");
        assert_eq!(method_label(&json!([])), "unknown");
    }
}
