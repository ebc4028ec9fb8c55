//! Client for the external todo backend.
//!
//! Two kinds of calls go upstream: the credential exchange performed at login
//! and the pass-through requests issued by the proxy handlers. Neither retries
//! nor sets a timeout.

use anyhow::{anyhow, Context, Result};
use axum::body::Bytes;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};
use url::Url;
use utoipa::ToSchema;

/// Maximum number of upstream body characters written to logs.
const MAX_LOGGED_BODY_CHARS: usize = 200;

/// Email/password pair submitted at login. Used once, never stored.
#[derive(ToSchema, Deserialize)]
pub struct Credentials {
    pub email: String,
    #[serde(deserialize_with = "deserialize_secret")]
    #[schema(value_type = String)]
    pub password: SecretString,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Result of a successful credential exchange.
#[derive(Clone)]
pub struct Identity {
    pub subject: String,
    pub bearer_token: SecretString,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &self.subject)
            .field("bearer_token", &"***")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// What came back from the backend, kept raw so it can be relayed as-is.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// # Errors
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {base_url}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Backend URL must use http or https: {}",
                base_url.as_str()
            ));
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/api/<path>`, tolerating a trailing slash on the base.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/api/{}", path.trim_start_matches('/'))
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Any failure (bad status, missing token, transport error) yields `None`;
    /// the caller only learns that authentication did not succeed.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Option<Identity> {
        let password = credentials.password.expose_secret();
        if credentials.email.trim().is_empty() || password.is_empty() {
            warn!("No credentials provided");
            return None;
        }

        let request = LoginRequest {
            email: &credentials.email,
            password,
        };

        let response = match self
            .client
            .post(self.api_url("auth/login"))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("Login request failed: {err}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %truncate(&body),
                "Backend login failed"
            );
            return None;
        }

        let json: Value = match response.json().await {
            Ok(json) => json,
            Err(err) => {
                error!("Failed to decode login response: {err}");
                return None;
            }
        };

        match json.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Some(Identity {
                subject: credentials.email.clone(),
                bearer_token: SecretString::from(token.to_string()),
            }),
            _ => {
                warn!("No token in backend login response");
                None
            }
        }
    }

    /// Send a request upstream and capture the raw response.
    ///
    /// `body` is forwarded byte-for-byte as `application/json`. The bearer
    /// token, when given, goes into the `Authorization` header.
    ///
    /// # Errors
    /// Returns an error on transport failures; HTTP error statuses are not errors.
    #[instrument(skip(self, token, body), fields(authenticated = token.is_some()))]
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse> {
        let url = self.api_url(path);
        let mut request = self.client.request(method, &url);

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Upstream request to {url} failed"))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read upstream response from {url}"))?;

        debug!(status = status.as_u16(), bytes = body.len(), "upstream response");

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

fn truncate(body: &str) -> String {
    body.trim().chars().take(MAX_LOGGED_BODY_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    #[test]
    fn api_url_joins_paths() {
        let client = BackendClient::new("http://backend:8080/").unwrap();
        assert_eq!(client.api_url("todos"), "http://backend:8080/api/todos");
        assert_eq!(client.api_url("/todos/7"), "http://backend:8080/api/todos/7");

        let client = BackendClient::new("http://backend:8080").unwrap();
        assert_eq!(client.api_url("auth/login"), "http://backend:8080/api/auth/login");
    }

    #[test]
    fn new_rejects_bad_urls() {
        assert!(BackendClient::new("not a url").is_err());
        assert!(BackendClient::new("ftp://backend").is_err());
    }

    #[test]
    fn debug_masks_secrets() {
        let creds = credentials("a@b.com", "hunter22");
        assert!(!format!("{creds:?}").contains("hunter22"));

        let identity = Identity {
            subject: "a@b.com".to_string(),
            bearer_token: SecretString::from("jwt".to_string()),
        };
        assert!(!format!("{identity:?}").contains("jwt"));
    }

    #[tokio::test]
    async fn login_returns_identity_with_token() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-abc"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let identity = client.login(&credentials("a@b.com", "secret1")).await.unwrap();

        assert_eq!(identity.subject, "a@b.com");
        assert_eq!(identity.bearer_token.expose_secret(), "jwt-abc");
    }

    #[tokio::test]
    async fn login_rejected_by_backend_returns_none() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert!(client.login(&credentials("a@b.com", "wrong")).await.is_none());
    }

    #[tokio::test]
    async fn login_without_token_field_returns_none() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert!(client.login(&credentials("a@b.com", "secret1")).await.is_none());
    }

    #[tokio::test]
    async fn login_with_non_json_body_returns_none() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert!(client.login(&credentials("a@b.com", "secret1")).await.is_none());
    }

    #[tokio::test]
    async fn login_with_empty_credentials_skips_backend() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert!(client.login(&credentials("", "secret1")).await.is_none());
        assert!(client.login(&credentials("a@b.com", "")).await.is_none());
    }

    #[tokio::test]
    async fn login_network_failure_returns_none() {
        // Nothing listens on port 9 (discard) in the test environment.
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        assert!(client.login(&credentials("a@b.com", "secret1")).await.is_none());
    }

    #[tokio::test]
    async fn forward_attaches_bearer_and_body() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/todos"))
            .and(header("authorization", "Bearer jwt-1"))
            .and(header("content-type", "application/json"))
            .and(body_string("{\"title\":\"milk\"}"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_raw("{\"id\":3}", "application/json; charset=utf-8"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let token = SecretString::from("jwt-1".to_string());
        let response = client
            .forward(
                Method::POST,
                "todos",
                Some(&token),
                Some(Bytes::from_static(b"{\"title\":\"milk\"}")),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(
            response.content_type.as_deref(),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(response.body, Bytes::from_static(b"{\"id\":3}"));
    }

    #[tokio::test]
    async fn forward_transport_error_is_err() {
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        let result = client.forward(Method::GET, "todos", None, None).await;
        assert!(result.is_err());
    }
}
