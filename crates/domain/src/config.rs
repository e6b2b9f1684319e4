//! Client configuration structures
//!
//! Values are supplied from outside (environment or config file, see the
//! infra loader); nothing here is computed at runtime.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CURRENT_USER_PATH, DEFAULT_API_VERSION, DEFAULT_BASE_DELAY_MS, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_JITTER_FACTOR, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_LOG_FILTER, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_USER_AGENT, LOGIN_PATH, LOGOUT_PATH,
    PROFILE_PATH, REFRESH_PATH, REGISTER_PATH,
};
use crate::errors::ErrorKind;
use crate::utils::serde::duration_millis;

/// Configuration error raised while loading or validating settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(String),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("configuration file error: {0}")]
    File(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid { field: field.into(), reason: reason.into() }
    }
}

/// Top-level configuration for the API client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme + host (+ optional prefix), e.g. `https://api.campus.example`.
    pub base_url: String,
    /// Version segment inserted between base URL and endpoint path.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_connect_timeout", with = "duration_millis")]
    pub connect_timeout: Duration,
    /// Longest wait between reads of a response, applied per attempt.
    #[serde(default = "default_read_timeout", with = "duration_millis")]
    pub read_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub endpoints: AuthEndpoints,
    /// Server error code → error kind table used by the classifier.
    #[serde(default)]
    pub error_codes: HashMap<String, ErrorKind>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Keychain service name under which tokens are stored.
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,
}

impl ClientConfig {
    /// Configuration with defaults for everything except the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: default_api_version(),
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            user_agent: default_user_agent(),
            retry: RetrySettings::default(),
            endpoints: AuthEndpoints::default(),
            error_codes: HashMap::new(),
            logging: LoggingConfig::default(),
            keychain_service: default_keychain_service(),
        }
    }

    /// Absolute URL for an endpoint path.
    ///
    /// `https://host` + `v1` + `/auth/me` → `https://host/v1/auth/me`.
    /// An empty `api_version` omits the version segment.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let version = self.api_version.trim_matches('/');
        if version.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{version}/{path}")
        }
    }

    /// Validate cross-field invariants.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for a blank base URL, zero timeouts or
    /// invalid retry settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url", "must not be blank"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::invalid("connect_timeout", "must be greater than zero"));
        }
        if self.read_timeout.is_zero() {
            return Err(ConfigError::invalid("read_timeout", "must be greater than zero"));
        }
        self.retry.validate()
    }
}

/// Retry budget and backoff parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay", with = "duration_millis")]
    pub base_delay: Duration,
    /// Relative jitter in `[0, 1)`; 0.25 means ±25% of the base delay.
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
    #[serde(default = "default_max_delay", with = "duration_millis")]
    pub max_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
            jitter_factor: default_jitter_factor(),
            max_delay: default_max_delay(),
        }
    }
}

impl RetrySettings {
    /// # Errors
    /// Returns `ConfigError::Invalid` when attempts are zero or the jitter
    /// factor falls outside `[0, 1)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be greater than 0"));
        }
        if !(0.0..1.0).contains(&self.jitter_factor) {
            return Err(ConfigError::invalid("retry.jitter_factor", "must be within [0, 1)"));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::invalid("retry.max_delay", "must not be below base_delay"));
        }
        Ok(())
    }
}

/// Paths of the authentication endpoints, relative to the versioned base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEndpoints {
    pub register: String,
    pub login: String,
    pub refresh: String,
    pub current_user: String,
    pub logout: String,
    pub profile: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            register: REGISTER_PATH.to_string(),
            login: LOGIN_PATH.to_string(),
            refresh: REFRESH_PATH.to_string(),
            current_user: CURRENT_USER_PATH.to_string(),
            logout: LOGOUT_PATH.to_string(),
            profile: PROFILE_PATH.to_string(),
        }
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS)
}

fn default_read_timeout() -> Duration {
    Duration::from_millis(DEFAULT_READ_TIMEOUT_MS)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_keychain_service() -> String {
    DEFAULT_KEYCHAIN_SERVICE.to_string()
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay() -> Duration {
    Duration::from_millis(DEFAULT_BASE_DELAY_MS)
}

const fn default_jitter_factor() -> f64 {
    DEFAULT_JITTER_FACTOR
}

fn default_max_delay() -> Duration {
    Duration::from_millis(DEFAULT_MAX_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::new("https://api.example.com");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_millis(1000));
        assert!((config.retry.jitter_factor - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.endpoints.login, "/auth/login");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_url_joins_segments() {
        let mut config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.endpoint_url("/auth/me"), "https://api.example.com/v1/auth/me");

        config.api_version = String::new();
        assert_eq!(config.endpoint_url("auth/me"), "https://api.example.com/auth/me");
    }

    #[test]
    fn validate_rejects_bad_retry_settings() {
        let mut config = ClientConfig::new("https://api.example.com");
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = ClientConfig::new("https://api.example.com");
        config.retry.jitter_factor = 1.5;
        assert!(config.validate().is_err());

        assert!(ClientConfig::new("  ").validate().is_err());
    }

    #[test]
    fn deserializes_partial_toml_like_json() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "base_url": "http://localhost:8000",
                "retry": { "max_attempts": 5, "base_delay": 200 },
                "error_codes": { "EMAIL_TAKEN": "validation_error" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(200));
        assert_eq!(config.retry.max_delay, Duration::from_millis(30_000));
        assert_eq!(config.error_codes.get("EMAIL_TAKEN"), Some(&ErrorKind::ValidationError));
        assert_eq!(config.endpoints.refresh, "/auth/refresh");
    }
}
