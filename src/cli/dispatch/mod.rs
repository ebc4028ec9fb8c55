use crate::cli::{
    actions::{server::Args, Action},
    commands::{
        session::{
            ARG_COOKIE_SECURE, ARG_SESSION_SECRET, ARG_SESSION_TTL_SECONDS,
            DEFAULT_SESSION_TTL_SECONDS, MIN_SESSION_SECRET_LEN,
        },
        ARG_BACKEND_URL, ARG_PORT,
    },
};
use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let backend_url = matches
        .get_one::<String>(ARG_BACKEND_URL)
        .cloned()
        .context("missing required argument: --backend-url")?;
    validate_backend_url(&backend_url)?;

    let session_secret = matches
        .get_one::<String>(ARG_SESSION_SECRET)
        .cloned()
        .context("missing required argument: --session-secret")?;
    if session_secret.len() < MIN_SESSION_SECRET_LEN {
        bail!("--{ARG_SESSION_SECRET} must be at least {MIN_SESSION_SECRET_LEN} bytes");
    }

    let session_ttl_seconds = matches
        .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
        .copied()
        .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);

    Ok(Action::Server(Args {
        port,
        backend_url,
        session_secret: SecretString::from(session_secret),
        session_ttl_seconds,
        cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
    }))
}

fn validate_backend_url(value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("invalid --{ARG_BACKEND_URL}: {value}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("--{ARG_BACKEND_URL} must use http or https, got {}", url.scheme());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn dispatch(args: &[&str]) -> Result<Action> {
        let mut argv = vec!["todogate"];
        argv.extend_from_slice(args);
        temp_env::with_vars(
            [
                ("TODOGATE_PORT", None::<&str>),
                ("TODOGATE_BACKEND_URL", None),
                ("TODOGATE_SESSION_SECRET", None),
                ("TODOGATE_SESSION_TTL_SECONDS", None),
                ("TODOGATE_COOKIE_SECURE", None),
            ],
            || handler(&commands::new().get_matches_from(argv)),
        )
    }

    #[test]
    fn builds_server_action() {
        let action = dispatch(&[
            "--backend-url",
            "http://localhost:8081",
            "--session-secret",
            SECRET,
            "--cookie-secure",
        ])
        .unwrap();

        let Action::Server(args) = action;
        assert_eq!(args.port, 8080);
        assert_eq!(args.backend_url, "http://localhost:8081");
        assert_eq!(args.session_secret.expose_secret(), SECRET);
        assert_eq!(args.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        assert!(args.cookie_secure);
    }

    #[test]
    fn rejects_short_secret() {
        let err = dispatch(&[
            "--backend-url",
            "http://localhost:8081",
            "--session-secret",
            "short",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
    }

    #[test]
    fn rejects_non_http_backend() {
        let err = dispatch(&[
            "--backend-url",
            "ftp://localhost:8081",
            "--session-secret",
            SECRET,
        ])
        .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn rejects_unparseable_backend() {
        assert!(dispatch(&["--backend-url", "not a url", "--session-secret", SECRET]).is_err());
    }
}
