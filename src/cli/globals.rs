use secrecy::SecretString;

/// Runtime configuration shared with the server once the CLI is parsed.
#[derive(Clone)]
pub struct GlobalArgs {
    pub backend_url: String,
    pub session_secret: SecretString,
    pub session_ttl_seconds: u64,
    pub cookie_secure: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(backend_url: String, session_secret: SecretString) -> Self {
        Self {
            backend_url,
            session_secret,
            session_ttl_seconds: crate::cli::commands::session::DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("backend_url", &self.backend_url)
            .field("session_secret", &"***")
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}
