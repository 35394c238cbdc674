//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional, defaulting to a local development backend:
//! - `AGRICHAIN_API_URL` - REST base URL (default: `http://localhost:9810/api`)
//! - `AGRICHAIN_SOCKET_URL` - realtime push base URL (default: `http://localhost:9810/realtime`)
//! - `AGRICHAIN_UPLOAD_URL` - multipart upload endpoint (default: `http://localhost:9810/upload`)
//! - `AGRICHAIN_TIMEOUT_MS` - per-request deadline in milliseconds (default: 10000)
//! - `AGRICHAIN_DATA_DIR` - directory for the persistent local store
//!   (default: `agrichain-market` under the platform temp dir)
//! - `AGRICHAIN_TOKEN` - bearer token attached to every request

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Default REST base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:9810/api";
/// Default realtime push base URL for local development.
pub const DEFAULT_SOCKET_URL: &str = "http://localhost:9810/realtime";
/// Default multipart upload endpoint for local development.
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:9810/upload";
/// Default per-request deadline.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// AgriChain Market client configuration.
#[derive(Clone)]
pub struct MarketConfig {
    /// REST base URL (no trailing slash).
    pub api_base_url: String,
    /// Realtime push base URL.
    pub socket_url: String,
    /// Multipart upload endpoint.
    pub upload_url: String,
    /// Per-request deadline. A single attempt is made per call; expiry
    /// aborts the in-flight request.
    pub request_timeout: Duration,
    /// Directory backing the persistent local store.
    pub data_dir: PathBuf,
    /// Bearer token attached to requests, when authenticated.
    pub auth_token: Option<SecretString>,
}

impl std::fmt::Debug for MarketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketConfig")
            .field("api_base_url", &self.api_base_url)
            .field("socket_url", &self.socket_url)
            .field("upload_url", &self.upload_url)
            .field("request_timeout", &self.request_timeout)
            .field("data_dir", &self.data_dir)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            socket_url: DEFAULT_SOCKET_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            data_dir: std::env::temp_dir().join("agrichain-market"),
            auth_token: None,
        }
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Every
    /// variable is optional; absent ones fall back to local-development
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present variable fails to parse
    /// (currently only `AGRICHAIN_TIMEOUT_MS`).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let timeout_ms = match get_optional_env("AGRICHAIN_TIMEOUT_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("AGRICHAIN_TIMEOUT_MS".to_string(), e.to_string())
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            api_base_url: trim_base(&get_env_or_default("AGRICHAIN_API_URL", DEFAULT_API_URL)),
            socket_url: trim_base(&get_env_or_default(
                "AGRICHAIN_SOCKET_URL",
                DEFAULT_SOCKET_URL,
            )),
            upload_url: trim_base(&get_env_or_default(
                "AGRICHAIN_UPLOAD_URL",
                DEFAULT_UPLOAD_URL,
            )),
            request_timeout: Duration::from_millis(timeout_ms),
            data_dir: get_optional_env("AGRICHAIN_DATA_DIR")
                .map_or(defaults.data_dir, PathBuf::from),
            auth_token: get_optional_env("AGRICHAIN_TOKEN").map(SecretString::from),
        })
    }

    /// Replace the bearer token (e.g., after login).
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(SecretString::from(token.into()));
        self
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Strip a trailing slash so path joining stays predictable.
fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = MarketConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:9810/api");
        assert_eq!(config.request_timeout, Duration::from_millis(10_000));
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_trim_base_strips_trailing_slash() {
        assert_eq!(trim_base("http://x/api/"), "http://x/api");
        assert_eq!(trim_base("http://x/api"), "http://x/api");
    }

    #[test]
    fn test_with_token_sets_token() {
        let config = MarketConfig::default().with_token("abc123");
        assert!(config.auth_token.is_some());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = MarketConfig::default().with_token("super-secret-token");
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-token"));
    }
}
