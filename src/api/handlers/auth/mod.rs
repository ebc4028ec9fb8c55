//! Login, logout and session introspection.
//!
//! Login is the only place a session is created: the credential exchange
//! result is written into the encrypted cookie exactly once. Failures are all
//! reported as "Invalid credentials" so callers cannot tell an unknown user
//! from a wrong password.

pub mod login;
pub mod session;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SessionResponse {
    pub email: String,
}

#[cfg(test)]
mod tests;
