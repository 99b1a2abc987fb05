use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use gumboard_api::notify::{DEFAULT_DEBOUNCE_WINDOW, DEFAULT_MAX_ENTRIES};

/// Session secrets that ship in sample env files and must never be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub slack_bot_token: Option<String>,
    pub debounce_window: Duration,
    pub debounce_max_entries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let session_secret = get("GUMBOARD_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!(
                "GUMBOARD_SESSION_SECRET is unset or still a placeholder; \
                 it must match the secret of the sign-in service"
            );
        }

        let port = match get("GUMBOARD_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid GUMBOARD_PORT '{}'", raw))?,
            None => 3000,
        };
        let debounce_window = match get("GUMBOARD_SLACK_DEBOUNCE_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid GUMBOARD_SLACK_DEBOUNCE_SECS '{}'", raw))?,
            ),
            None => DEFAULT_DEBOUNCE_WINDOW,
        };
        let debounce_max_entries = match get("GUMBOARD_DEBOUNCE_MAX_ENTRIES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid GUMBOARD_DEBOUNCE_MAX_ENTRIES '{}'", raw))?,
            None => DEFAULT_MAX_ENTRIES,
        };

        Ok(Self {
            host: get("GUMBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("GUMBOARD_DB_PATH")
                .unwrap_or_else(|| "gumboard.db".into())
                .into(),
            session_secret,
            slack_bot_token: get("GUMBOARD_SLACK_BOT_TOKEN").filter(|t| !t.trim().is_empty()),
            debounce_window,
            debounce_max_entries,
        })
    }
}
