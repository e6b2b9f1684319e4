//! Application constants
//!
//! Defaults for the client configuration. Every value can be overridden by
//! the configuration loader.

// Transport
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_USER_AGENT: &str = concat!("campus-client/", env!("CARGO_PKG_VERSION"));

// Retry
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_JITTER_FACTOR: f64 = 0.25;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

// Endpoints
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const CURRENT_USER_PATH: &str = "/auth/me";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const PROFILE_PATH: &str = "/auth/profile";

// Token storage
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "Campus.auth";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const TOKEN_TYPE_KEY: &str = "token_type";

// Logging
pub const DEFAULT_LOG_FILTER: &str = "info";
