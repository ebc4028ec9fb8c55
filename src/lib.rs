//! # Todogate (todo backend-for-frontend)
//!
//! `todogate` sits between the browser and the external todo backend. It owns
//! the user session and forwards todo CRUD calls upstream with the session's
//! bearer token attached.
//!
//! ## Sessions
//!
//! Logging in exchanges an email/password pair for a backend bearer token via
//! `POST <backend>/api/auth/login`. The token is written once into an
//! encrypted `HttpOnly` cookie and read back unchanged on every proxied call.
//! A cookie that fails to decrypt or has expired reads as "no session".
//!
//! ## Proxying
//!
//! Every `/api/todos` route resolves the session first and answers `401` with
//! `{"error": "Unauthorized"}` when there is none; the backend is never called
//! in that case. Otherwise the caller's body is forwarded verbatim and the
//! upstream status, body and `Content-Type` are relayed back as-is. Nothing is
//! retried.
//!
//! ## Web client
//!
//! [`web`] is the headless counterpart of the browser UI. It validates forms
//! and drives the pages against this service over HTTP.

pub mod api;
pub mod backend;
pub mod cli;
pub mod session;
pub mod web;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
