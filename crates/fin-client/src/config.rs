//! Client configuration.
//!
//! Points at a running `fin-api` service. Override via environment
//! variables or explicit construction for tests.

use url::Url;
use zeroize::Zeroizing;

/// Default service address for local development.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the finance API.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct FinClientConfig {
    /// Service root, e.g. `http://127.0.0.1:8080`.
    pub base_url: Url,
    /// Bearer token for operator routes. Public routes work without one.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for FinClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinClientConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FinClientConfig {
    /// Configuration for `base_url` with no token and the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `FIN_API_URL` (default: `http://127.0.0.1:8080`)
    /// - `FIN_API_TOKEN` (optional)
    /// - `FIN_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("FIN_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);

        let timeout_secs = match std::env::var("FIN_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: env_url("FIN_API_URL", DEFAULT_API_URL)?,
            api_token,
            timeout_secs,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e: url::ParseError| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL variable did not parse.
    #[error("invalid URL in {0}: {1}")]
    InvalidUrl(String, String),
    /// `FIN_TIMEOUT_SECS` is not a whole number of seconds.
    #[error("invalid FIN_TIMEOUT_SECS: {0}")]
    InvalidTimeout(String),
    /// The token contains bytes not allowed in an HTTP header.
    #[error("API token is not a valid header value")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let config = FinClientConfig::new("http://localhost:8080".parse().unwrap())
            .with_token("admin:Admin:secret-passcode");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-passcode"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn debug_shows_absent_token() {
        let config = FinClientConfig::new("http://localhost:8080".parse().unwrap());
        let debug = format!("{config:?}");
        assert!(debug.contains("api_token: None"));
    }

    #[test]
    fn env_url_falls_back_to_default() {
        let url = env_url("FIN_CLIENT_TEST_UNSET_URL_VAR", DEFAULT_API_URL).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn env_url_reports_variable_name() {
        let err = env_url("FIN_CLIENT_TEST_UNSET_URL_VAR", "not a url").unwrap_err();
        assert!(err.to_string().contains("FIN_CLIENT_TEST_UNSET_URL_VAR"));
    }
}
