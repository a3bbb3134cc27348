//! Client configuration.
//!
//! Values come from environment variables (a `.env` file is loaded by the
//! binary). Missing or unparsable values fall back to their defaults; only
//! an unusable URL is an error.

use crate::environment::DEFAULT_NOTIFICATION_TTL;
use crate::error::{ClientError, Result};
use crate::providers::http::DEFAULT_API_URL;
use std::path::PathBuf;
use std::time::Duration;

/// Default directory of the file-backed session slot.
pub const DEFAULT_SESSION_DIR: &str = ".eventticket";

/// Default admin dashboard location.
pub const DEFAULT_ADMIN_DASHBOARD_URL: &str = "http://localhost:3001";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL, without trailing slash (`EVENTTICKET_API_URL`).
    pub api_url: String,

    /// Directory holding `user.json` (`EVENTTICKET_SESSION_DIR`).
    pub session_dir: PathBuf,

    /// Notification auto-hide window (`EVENTTICKET_NOTIFICATION_TTL_MS`).
    ///
    /// Default: 4000 ms
    pub notification_ttl: Duration,

    /// Link offered to admins (`EVENTTICKET_ADMIN_DASHBOARD_URL`).
    pub admin_dashboard_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            admin_dashboard_url: DEFAULT_ADMIN_DASHBOARD_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`ClientError::Config`] if a URL variable is set but is not a valid
    /// absolute URL.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// [`ClientError::Config`] if a URL value is not a valid absolute URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("EVENTTICKET_API_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let admin_dashboard_url = lookup("EVENTTICKET_ADMIN_DASHBOARD_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_DASHBOARD_URL.to_string());

        let session_dir = lookup("EVENTTICKET_SESSION_DIR")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_DIR), PathBuf::from);

        let notification_ttl = match lookup("EVENTTICKET_NOTIFICATION_TTL_MS") {
            Some(raw) => raw.trim().parse().map(Duration::from_millis).unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Unparsable EVENTTICKET_NOTIFICATION_TTL_MS, using default");
                DEFAULT_NOTIFICATION_TTL
            }),
            None => DEFAULT_NOTIFICATION_TTL,
        };

        Ok(Self {
            api_url: validated_url("EVENTTICKET_API_URL", &api_url)?,
            session_dir,
            notification_ttl,
            admin_dashboard_url: validated_url("EVENTTICKET_ADMIN_DASHBOARD_URL", &admin_dashboard_url)?,
        })
    }
}

fn validated_url(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    reqwest::Url::parse(value)
        .map_err(|e| ClientError::Config(format!("{key}={value}: {e}")))?;
    Ok(value.trim_end_matches('/').to_string())
}
