use crate::{backend::BackendClient, cli::globals::GlobalArgs, session::SessionStore};
use anyhow::{Context, Result};

/// Shared, read-only state handed to every handler through an `Extension`.
#[derive(Debug, Clone)]
pub struct AppState {
    backend: BackendClient,
    sessions: SessionStore,
}

impl AppState {
    #[must_use]
    pub fn new(backend: BackendClient, sessions: SessionStore) -> Self {
        Self { backend, sessions }
    }

    /// Build the state from parsed CLI configuration.
    ///
    /// # Errors
    /// Returns an error if the backend URL or session secret is unusable.
    pub fn from_globals(globals: &GlobalArgs) -> Result<Self> {
        let backend = BackendClient::new(&globals.backend_url).context("backend client")?;
        let sessions = SessionStore::new(
            &globals.session_secret,
            globals.session_ttl_seconds,
            globals.cookie_secure,
        )
        .context("session store")?;
        Ok(Self::new(backend, sessions))
    }

    #[must_use]
    pub const fn backend(&self) -> &BackendClient {
        &self.backend
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
