//! Session endpoints backed by the encrypted cookie.

use super::SessionResponse;
use crate::api::state::AppState;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    // Missing or invalid cookies both read as "no session".
    match state.sessions().read(&headers) {
        Some(session) => (
            StatusCode::OK,
            Json(SessionResponse {
                email: session.subject,
            }),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(state: Extension<Arc<AppState>>) -> Response {
    // Always clear the cookie, even when no session was presented.
    let mut response_headers = HeaderMap::new();
    match state.sessions().clear() {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}
