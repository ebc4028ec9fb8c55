//! Todo CRUD proxied to the backend with the session's bearer token.
//!
//! Every handler checks the session before doing anything else, so a caller
//! without one never causes an upstream request.

use super::{bad_gateway, error_response, relay, relay_status, unauthorized};
use crate::api::state::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::{HeaderMap, Method, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// A todo as the backend represents it. Only used for API documentation; the
/// proxy never parses bodies.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Todo {
    id: u64,
    title: String,
    completed: bool,
    created_at: Option<String>,
    updated_at: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TodoInput {
    title: Option<String>,
    completed: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "Backend response relayed as-is", body = [Todo]),
        (status = 401, description = "No active session", body = super::ErrorBody),
        (status = 502, description = "Backend unreachable", body = super::ErrorBody)
    ),
    tag = "todos"
)]
#[instrument(skip_all)]
pub async fn list_todos(headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    let Some(token) = state.sessions().bearer_token(&headers) else {
        return unauthorized();
    };

    match state
        .backend()
        .forward(Method::GET, "todos", Some(&token), None)
        .await
    {
        Ok(upstream) => relay(upstream),
        Err(err) => bad_gateway(&err),
    }
}

#[utoipa::path(
    post,
    path = "/api/todos",
    request_body(content = TodoInput, content_type = "application/json"),
    responses(
        (status = 201, description = "Backend response relayed as-is", body = Todo),
        (status = 401, description = "No active session", body = super::ErrorBody),
        (status = 502, description = "Backend unreachable", body = super::ErrorBody)
    ),
    tag = "todos"
)]
#[instrument(skip_all)]
pub async fn create_todo(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let Some(token) = state.sessions().bearer_token(&headers) else {
        return unauthorized();
    };

    match state
        .backend()
        .forward(Method::POST, "todos", Some(&token), Some(body))
        .await
    {
        Ok(upstream) => relay(upstream),
        Err(err) => bad_gateway(&err),
    }
}

#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(("id" = u64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Backend response relayed as-is", body = Todo),
        (status = 400, description = "Id is not a number", body = super::ErrorBody),
        (status = 401, description = "No active session", body = super::ErrorBody),
        (status = 502, description = "Backend unreachable", body = super::ErrorBody)
    ),
    tag = "todos"
)]
#[instrument(skip(headers, state))]
pub async fn get_todo(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(token) = state.sessions().bearer_token(&headers) else {
        return unauthorized();
    };
    let Some(id) = parse_id(&id) else {
        return invalid_id();
    };

    match state
        .backend()
        .forward(Method::GET, &format!("todos/{id}"), Some(&token), None)
        .await
    {
        Ok(upstream) => relay(upstream),
        Err(err) => bad_gateway(&err),
    }
}

#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(("id" = u64, Path, description = "Todo id")),
    request_body(content = TodoInput, content_type = "application/json"),
    responses(
        (status = 200, description = "Backend response relayed as-is", body = Todo),
        (status = 400, description = "Id is not a number", body = super::ErrorBody),
        (status = 401, description = "No active session", body = super::ErrorBody),
        (status = 502, description = "Backend unreachable", body = super::ErrorBody)
    ),
    tag = "todos"
)]
#[instrument(skip(headers, state, body))]
pub async fn update_todo(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let Some(token) = state.sessions().bearer_token(&headers) else {
        return unauthorized();
    };
    let Some(id) = parse_id(&id) else {
        return invalid_id();
    };

    match state
        .backend()
        .forward(Method::PUT, &format!("todos/{id}"), Some(&token), Some(body))
        .await
    {
        Ok(upstream) => relay(upstream),
        Err(err) => bad_gateway(&err),
    }
}

#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = u64, Path, description = "Todo id")),
    responses(
        (status = 204, description = "Backend status relayed without a body"),
        (status = 400, description = "Id is not a number", body = super::ErrorBody),
        (status = 401, description = "No active session", body = super::ErrorBody),
        (status = 502, description = "Backend unreachable", body = super::ErrorBody)
    ),
    tag = "todos"
)]
#[instrument(skip(headers, state))]
pub async fn delete_todo(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(token) = state.sessions().bearer_token(&headers) else {
        return unauthorized();
    };
    let Some(id) = parse_id(&id) else {
        return invalid_id();
    };

    match state
        .backend()
        .forward(Method::DELETE, &format!("todos/{id}"), Some(&token), None)
        .await
    {
        Ok(upstream) => relay_status(&upstream),
        Err(err) => bad_gateway(&err),
    }
}

// Ids go into the upstream path, so only plain integers are accepted.
fn parse_id(id: &str) -> Option<u64> {
    id.parse().ok()
}

fn invalid_id() -> Response {
    error_response(StatusCode::BAD_REQUEST, "Invalid todo id")
}
