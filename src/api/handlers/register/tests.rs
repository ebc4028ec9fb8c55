//! Registration is forwarded without a session or bearer token.

use crate::api::{app, handlers::ErrorBody, state::AppState};
use crate::{backend::BackendClient, session::SessionStore};
use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use secrecy::SecretString;
use serde_json::json;
use std::{net::TcpListener, sync::Arc};
use tower::ServiceExt;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "register-test-secret-register-test-secret";

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn app_router(backend_url: &str) -> Result<Router> {
    let sessions = SessionStore::new(&SecretString::from(SECRET.to_string()), 3600, false)?;
    let state = AppState::new(BackendClient::new(backend_url)?, sessions);
    Ok(app(Arc::new(state)))
}

fn register_request(payload: &'static str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload))?)
}

#[tokio::test]
async fn register_is_forwarded_without_authorization() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let payload = "{\"name\":\"Ann\",\"email\":\"ann@example.com\",\"password\":\"secret1\"}";

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_string(payload))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"message": "user created"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = app_router(&server.uri())?
        .oneshot(register_request(payload)?)
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);

    let received = server.received_requests().await.context("request recording")?;
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
    Ok(())
}

#[tokio::test]
async fn register_relays_backend_rejection() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_raw("email already exists\n", "text/plain; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = app_router(&server.uri())?
        .oneshot(register_request("{}")?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(b"text/plain; charset=utf-8".as_slice())
    );
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(body, Bytes::from_static(b"email already exists\n"));
    Ok(())
}

#[tokio::test]
async fn register_with_unreachable_backend_is_bad_gateway() -> Result<()> {
    let response = app_router("http://127.0.0.1:9")?
        .oneshot(register_request("{}")?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let parsed: ErrorBody = serde_json::from_slice(&body)?;
    assert_eq!(parsed.error, "Bad gateway");
    Ok(())
}
