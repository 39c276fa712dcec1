//! Method dispatch
//!
//! [`method_handler`] validates the envelope, authenticates it and runs the
//! named method. The [`RequestContext`] collects what the transport wants to
//! log about the call.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use serde_json::{json, Map, Value};

use scoring_schema::{ClientsInterestsRequest, MethodRequest, OnlineScoreRequest};
use scoring_store::KeyedStore;

use crate::auth::check_auth;
use crate::error::MethodError;
use crate::scoring::{get_interests, get_score};

/// Score returned to the admin regardless of arguments
pub const ADMIN_SCORE: i64 = 42;

/// Methods the API understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    OnlineScore,
    ClientsInterests,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "online_score" => Some(Method::OnlineScore),
            "clients_interests" => Some(Method::ClientsInterests),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::OnlineScore => "online_score",
            Method::ClientsInterests => "clients_interests",
        }
    }
}

/// Per-request facts filled in while handling a call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestContext {
    pub request_id: String,
    pub is_admin: bool,
    /// Arguments submitted with a value (`online_score`)
    pub has: Vec<String>,
    /// Number of requested clients (`clients_interests`)
    pub nclients: usize,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }
}

/// Handle one API call at the current local time
pub async fn method_handler(
    body: &Value,
    ctx: &mut RequestContext,
    store: &KeyedStore,
) -> Result<Value, MethodError> {
    method_handler_at(body, ctx, store, &Local::now()).await
}

pub async fn method_handler_at<Tz: TimeZone>(
    body: &Value,
    ctx: &mut RequestContext,
    store: &KeyedStore,
    now: &DateTime<Tz>,
) -> Result<Value, MethodError>
where
    Tz::Offset: std::fmt::Display,
{
    let result = dispatch(body, ctx, store, now).await;
    if let Err(MethodError::Validation(err)) = &result {
        tracing::error!(
            request_id = %ctx.request_id,
            field = err.field().unwrap_or_default(),
            kind = err.kind(),
            "Request validation failed: {}",
            err
        );
    }
    result
}

async fn dispatch<Tz: TimeZone>(
    body: &Value,
    ctx: &mut RequestContext,
    store: &KeyedStore,
    now: &DateTime<Tz>,
) -> Result<Value, MethodError>
where
    Tz::Offset: std::fmt::Display,
{
    let empty = Map::new();
    let body = body.as_object().unwrap_or(&empty);

    let request = MethodRequest::from_body(body)?;
    ctx.is_admin = request.is_admin();

    if !check_auth(&request, now) {
        tracing::warn!(request_id = %ctx.request_id, login = %request.login, "Authentication failed");
        return Err(MethodError::Forbidden);
    }

    let method = Method::from_name(&request.method)
        .ok_or_else(|| MethodError::UnknownMethod(request.method.clone()))?;
    tracing::debug!(request_id = %ctx.request_id, method = method.as_str(), "Dispatching method");

    match method {
        Method::OnlineScore => online_score(&request, ctx, store),
        Method::ClientsInterests => clients_interests(&request, ctx, store).await,
    }
}

fn online_score(
    request: &MethodRequest,
    ctx: &mut RequestContext,
    store: &KeyedStore,
) -> Result<Value, MethodError> {
    let arguments = OnlineScoreRequest::from_arguments(&request.arguments)?;
    ctx.has = arguments.provided_fields().to_vec();

    if ctx.is_admin {
        return Ok(json!({ "score": ADMIN_SCORE }));
    }
    Ok(json!({ "score": get_score(store, &arguments) }))
}

async fn clients_interests(
    request: &MethodRequest,
    ctx: &mut RequestContext,
    store: &KeyedStore,
) -> Result<Value, MethodError> {
    let arguments = ClientsInterestsRequest::from_arguments(&request.arguments)?;
    ctx.nclients = arguments.client_ids.len();

    let mut response = Map::new();
    for client_id in &arguments.client_ids {
        let interests = get_interests(store, *client_id).await?;
        response.insert(client_id.to_string(), json!(interests));
    }
    Ok(Value::Object(response))
}
