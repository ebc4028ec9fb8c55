//! Cookie-backed session store.
//!
//! The session carries the backend bearer token issued at login. It is written
//! once, encrypted with a key derived from the server secret, and read back on
//! every proxied request. There is no server-side state: the sealed cookie is
//! the session.

mod cipher;

pub use cipher::CookieCipher;

use crate::backend::Identity;
use anyhow::{Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const SESSION_COOKIE_NAME: &str = "todogate_session";

/// An authenticated session as read from the cookie.
#[derive(Clone)]
pub struct Session {
    pub subject: String,
    pub bearer_token: SecretString,
    pub issued_at: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("subject", &self.subject)
            .field("bearer_token", &"***")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

// Wire form of the cookie payload. Short keys keep the cookie small.
#[derive(Serialize, Deserialize)]
struct SessionPayload {
    sub: String,
    tok: String,
    iat: u64,
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    cipher: CookieCipher,
    ttl_seconds: u64,
    secure: bool,
}

impl SessionStore {
    /// # Errors
    /// Returns an error if the session store cannot be initialized.
    pub fn new(secret: &SecretString, ttl_seconds: u64, secure: bool) -> Result<Self> {
        Ok(Self {
            cipher: CookieCipher::new(secret, SESSION_COOKIE_NAME),
            ttl_seconds,
            secure,
        })
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Persist the identity's token into a new session cookie.
    ///
    /// # Errors
    /// Returns an error if the payload cannot be encrypted or encoded into a
    /// header value.
    pub fn issue(&self, identity: &Identity) -> Result<HeaderValue> {
        self.issue_at(identity, now_unix_seconds())
    }

    pub(crate) fn issue_at(&self, identity: &Identity, issued_at: u64) -> Result<HeaderValue> {
        let payload = SessionPayload {
            sub: identity.subject.clone(),
            tok: identity.bearer_token.expose_secret().to_string(),
            iat: issued_at,
        };
        let json = serde_json::to_vec(&payload).context("failed to encode session")?;
        let value = self.cipher.seal(&json)?;

        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl_seconds
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).context("failed to build session cookie")
    }

    /// Resolve the request's session cookie.
    ///
    /// Returns `None` when the cookie is missing, forged, expired or carries
    /// no bearer token.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> Option<Session> {
        self.read_at(headers, now_unix_seconds())
    }

    pub(crate) fn read_at(&self, headers: &HeaderMap, now: u64) -> Option<Session> {
        let value = extract_session_cookie(headers)?;
        let Some(json) = self.cipher.open(&value) else {
            debug!("session cookie failed to decrypt");
            return None;
        };
        let payload: SessionPayload = serde_json::from_slice(&json).ok()?;

        if now.saturating_sub(payload.iat) > self.ttl_seconds {
            debug!("session cookie expired");
            return None;
        }

        if payload.tok.is_empty() {
            return None;
        }

        Some(Session {
            subject: payload.sub,
            bearer_token: SecretString::from(payload.tok),
            issued_at: payload.iat,
        })
    }

    /// Shortcut used by the proxy handlers.
    #[must_use]
    pub fn bearer_token(&self, headers: &HeaderMap) -> Option<SecretString> {
        self.read(headers).map(|session| session.bearer_token)
    }

    /// Build an expired cookie that removes the session from the browser.
    ///
    /// # Errors
    /// Returns an error if the header value is invalid.
    pub fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(SESSION_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
