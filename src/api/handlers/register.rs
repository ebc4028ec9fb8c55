use super::{bad_gateway, relay};
use crate::api::state::AppState;
use axum::{
    body::Bytes,
    extract::Extension,
    http::Method,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRegister {
    name: String,
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body(content = UserRegister, content_type = "application/json"),
    responses(
        (status = 201, description = "Registration successful"),
        (status = 400, description = "Rejected by the backend, body relayed as-is"),
        (status = 502, description = "Backend unreachable", body = super::ErrorBody)
    ),
    tag = "register"
)]
// Registration is unauthenticated: no session lookup and no bearer token.
#[instrument(skip_all)]
pub async fn register(state: Extension<Arc<AppState>>, body: Bytes) -> Response {
    match state
        .backend()
        .forward(Method::POST, "auth/register", None, Some(body))
        .await
    {
        Ok(upstream) => relay(upstream),
        Err(err) => bad_gateway(&err),
    }
}

#[cfg(test)]
mod tests;
