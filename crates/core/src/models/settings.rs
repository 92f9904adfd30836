use serde::{Deserialize, Serialize};

/// Default API root, matching the development backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Storage key under which the auth token is persisted.
pub const DEFAULT_TOKEN_KEY: &str = "portfolio_auth_token";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding [`Settings::base_url`].
pub const ENV_BASE_URL: &str = "PORTFOLIO_API_BASE_URL";

/// Environment variable overriding [`Settings::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "PORTFOLIO_API_TIMEOUT_SECS";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API root; paths like `/portfolios` are appended to it.
    pub base_url: String,

    /// Per-request timeout (ignored on wasm32, where the browser owns timeouts).
    pub timeout_secs: u64,

    /// Key used by the token store.
    pub token_key: String,

    /// Where the user is sent after logging in when no location was captured.
    pub default_landing: String,

    /// Path of the login view, target of access-gate redirects.
    pub login_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            default_landing: "/portfolios".to_string(),
            login_path: "/login".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, overridden by `PORTFOLIO_API_BASE_URL` / `PORTFOLIO_API_TIMEOUT_SECS`.
    /// Unparseable timeouts are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            settings.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout_secs = secs,
                _ => log::warn!("[Settings] Ignoring invalid {ENV_TIMEOUT_SECS}={raw:?}"),
            }
        }
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        settings
    }
}
