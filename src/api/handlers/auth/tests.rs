//! Auth handler tests: login issues the cookie, session/logout read and clear it.

use super::SessionResponse;
use crate::{
    api::{app, handlers::ErrorBody, state::AppState},
    backend::BackendClient,
    session::{SessionStore, SESSION_COOKIE_NAME},
};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, StatusCode,
    },
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::{net::TcpListener, sync::Arc};
use tower::ServiceExt;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "auth-handler-test-secret-auth-handler";

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn sessions() -> Result<SessionStore> {
    SessionStore::new(&SecretString::from(SECRET.to_string()), 600, false)
}

fn app_router(backend_url: &str) -> Result<Router> {
    let state = AppState::new(BackendClient::new(backend_url)?, sessions()?);
    Ok(app(Arc::new(state)))
}

fn login_request(email: &str, password: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": email, "password": password}).to_string(),
        ))?)
}

#[tokio::test]
async fn login_sets_encrypted_session_cookie() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-login"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_router(&server.uri())?;
    let response = app
        .clone()
        .oneshot(login_request("a@b.com", "secret1")?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?
        .to_string();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
    assert!(set_cookie.contains("HttpOnly"));
    // Decoding the cookie value must not reveal the token or the email.
    let value = set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")))
        .context("cookie value")?;
    let decoded = URL_SAFE_NO_PAD.decode(value)?;
    let decoded = String::from_utf8_lossy(&decoded);
    assert!(!decoded.contains("jwt-login"), "{decoded}");
    assert!(!decoded.contains("a@b.com"), "{decoded}");

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let parsed: SessionResponse = serde_json::from_slice(&body)?;
    assert_eq!(parsed.email, "a@b.com");

    // The same token comes back out of the cookie.
    let pair = set_cookie.split(';').next().context("cookie pair")?.to_string();
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(COOKIE, pair.parse()?);
    let token = sessions()?.bearer_token(&headers).context("session token")?;
    assert_eq!(token.expose_secret(), "jwt-login");

    let session = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/session")
                .header(COOKIE, pair)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(session.status(), StatusCode::OK);
    let body = to_bytes(session.into_body(), usize::MAX).await?;
    let parsed: SessionResponse = serde_json::from_slice(&body)?;
    assert_eq!(parsed.email, "a@b.com");
    Ok(())
}

#[tokio::test]
async fn login_failure_is_generic_and_sets_no_cookie() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let response = app_router(&server.uri())?
        .oneshot(login_request("a@b.com", "wrong")?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let parsed: ErrorBody = serde_json::from_slice(&body)?;
    assert_eq!(parsed.error, "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn login_without_payload_is_bad_request() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = app_router(&server.uri())?
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn session_without_cookie_is_no_content() -> Result<()> {
    let response = app_router("http://127.0.0.1:9")?
        .oneshot(Request::builder().uri("/api/auth/session").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let response = app_router("http://127.0.0.1:9")?
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?;
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=;")));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}
