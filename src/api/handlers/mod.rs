//! API handlers and the helpers they share for relaying upstream responses.
//!
//! Error bodies produced by this service (not relayed ones) always use the
//! `{"error": "<message>"}` envelope.

pub mod auth;
pub mod health;
pub mod register;
pub mod todos;

use crate::backend::UpstreamResponse;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub(crate) fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
}

pub(crate) fn bad_gateway(err: &anyhow::Error) -> Response {
    error!("Upstream request failed: {err:#}");
    error_response(StatusCode::BAD_GATEWAY, "Bad gateway")
}

/// Relay status, body and `Content-Type` exactly as the backend sent them.
pub(crate) fn relay(upstream: UpstreamResponse) -> Response {
    let content_type = upstream
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    (upstream.status, [(CONTENT_TYPE, content_type)], upstream.body).into_response()
}

/// Relay only the status code; used for deletes.
pub(crate) fn relay_status(upstream: &UpstreamResponse) -> Response {
    upstream.status.into_response()
}
