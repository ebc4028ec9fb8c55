//! HTTP client for the proxy's JSON API with a shared cookie jar. Calls wait
//! for the proxy without a client-side deadline. The session cookie set by `/api/auth/login` is replayed on every
//! later call; callers never handle tokens directly.

use super::{
    errors::AppError,
    types::{
        LoginRequest, NewTodo, RegisterRequest, RegisterResponse, Todo, TodoUpdate, UserSession,
    },
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges credentials for a session cookie, kept in the client's jar.
    ///
    /// # Errors
    /// Returns `AppError::Http` with status 401 when the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession, AppError> {
        let request = self.json_request(
            Method::POST,
            "/api/auth/login",
            &LoginRequest { email, password },
        )?;
        handle_json_response(send(request).await?).await
    }

    /// # Errors
    /// Returns an error if the proxy is unreachable or answers with a failure.
    pub async fn logout(&self) -> Result<(), AppError> {
        let request = self.request(Method::POST, "/api/auth/logout");
        handle_empty_response(send(request).await?).await
    }

    /// Current session, `None` when there is no valid cookie.
    ///
    /// # Errors
    /// Returns an error if the proxy is unreachable or the body cannot be decoded.
    pub async fn session(&self) -> Result<Option<UserSession>, AppError> {
        let request = self.request(Method::GET, "/api/auth/session");
        handle_optional_json_response(send(request).await?).await
    }

    /// Registration relays the backend's status and text verbatim, so any
    /// status is a successful call here.
    ///
    /// # Errors
    /// Returns an error only when the request cannot be sent or read.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, AppError> {
        let request = self.json_request(
            Method::POST,
            "/api/register",
            &RegisterRequest {
                name,
                email,
                password,
            },
        )?;
        let response = send(request).await?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to read response: {err}")))?;
        Ok(RegisterResponse { status, text })
    }

    /// # Errors
    /// Returns an error if the request fails or the list cannot be decoded.
    pub async fn fetch_todos(&self) -> Result<Vec<Todo>, AppError> {
        let request = self.request(Method::GET, "/api/todos");
        handle_json_response(send(request).await?).await
    }

    /// # Errors
    /// Returns an error if the request fails or the created todo cannot be decoded.
    pub async fn create_todo(&self, title: &str) -> Result<Todo, AppError> {
        let request = self.json_request(Method::POST, "/api/todos", &NewTodo { title })?;
        handle_json_response(send(request).await?).await
    }

    /// The response body is ignored; callers update their own copy.
    ///
    /// # Errors
    /// Returns an error if the request fails or the proxy answers with a failure.
    pub async fn update_todo(&self, id: u64, update: &TodoUpdate) -> Result<(), AppError> {
        let request = self.json_request(Method::PUT, &format!("/api/todos/{id}"), update)?;
        handle_empty_response(send(request).await?).await
    }

    /// # Errors
    /// Returns an error if the request fails or the proxy answers with a failure.
    pub async fn delete_todo(&self, id: u64) -> Result<(), AppError> {
        let request = self.request(Method::DELETE, &format!("/api/todos/{id}"));
        handle_empty_response(send(request).await?).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, build_url(&self.base_url, path))
    }

    fn json_request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<RequestBuilder, AppError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;
        Ok(self
            .request(method, path)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload))
    }
}

fn build_url(base_url: &str, path: &str) -> String {
    let path = path.trim();
    if base_url.is_empty() {
        path.to_string()
    } else {
        format!("{base_url}/{}", path.trim_start_matches('/'))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, AppError> {
    request.send().await.map_err(map_request_error)
}

fn map_request_error(err: reqwest::Error) -> AppError {
    debug!("request failed: {err}");
    if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<(), AppError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

/// 204 and 401 both mean "no session".
async fn handle_optional_json_response<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, AppError> {
    match response.status() {
        StatusCode::NO_CONTENT | StatusCode::UNAUTHORIZED => Ok(None),
        status if status.is_success() => response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}"))),
        _ => Err(http_error(response).await),
    }
}

async fn http_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    AppError::Http {
        status,
        message: sanitize_body(&body),
    }
}

fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
