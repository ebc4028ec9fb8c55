use super::SessionResponse;
use crate::{
    api::{
        handlers::{error_response, ErrorBody},
        state::AppState,
    },
    backend::Credentials,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = Credentials, content_type = "application/json"),
    responses(
        (status = 200, description = "Session cookie issued", body = SessionResponse),
        (status = 400, description = "Missing payload", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let Some(identity) = state.backend().login(&credentials).await else {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    let cookie = match state.sessions().issue(&identity) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to issue session cookie: {err:#}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    info!(email = %identity.subject, "session issued");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    (
        StatusCode::OK,
        headers,
        Json(SessionResponse {
            email: identity.subject,
        }),
    )
        .into_response()
}
