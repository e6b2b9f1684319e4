//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CAMPUS_BASE_URL` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CAMPUS_BASE_URL`: API base URL (required)
//! - `CAMPUS_API_VERSION`: version path segment, empty to omit
//! - `CAMPUS_CONNECT_TIMEOUT_MS`, `CAMPUS_READ_TIMEOUT_MS`: timeouts
//! - `CAMPUS_MAX_ATTEMPTS`: total attempts per call
//! - `CAMPUS_BASE_DELAY_MS`, `CAMPUS_MAX_DELAY_MS`: backoff bounds
//! - `CAMPUS_JITTER_FACTOR`: relative jitter in `[0, 1)`
//! - `CAMPUS_USER_AGENT`: `User-Agent` header
//! - `CAMPUS_KEYCHAIN_SERVICE`: keychain service name for tokens
//! - `CAMPUS_LOG`: default tracing filter directive
//! - `CAMPUS_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./campus.toml`, `./campus.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent and grandparent directory
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use campus_domain::{ClientConfig, ConfigError};

const BASE_URL_VAR: &str = "CAMPUS_BASE_URL";
const CANDIDATE_NAMES: [&str; 4] = ["campus.toml", "campus.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Uses environment variables when `CAMPUS_BASE_URL` is set, a config file
/// otherwise. The result is validated either way.
///
/// # Errors
/// Returns `ConfigError` if no source is available, a value cannot be
/// parsed or validation fails.
pub fn load() -> Result<ClientConfig, ConfigError> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(ConfigError::Missing(var)) => {
            tracing::debug!(missing = %var, "Environment incomplete, trying config file");
            load_from_file(None)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// `ConfigError::Missing` when `CAMPUS_BASE_URL` is absent,
/// `ConfigError::Invalid` for unparsable or invalid values.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a configuration from an arbitrary variable lookup.
fn from_lookup<F>(lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = lookup(BASE_URL_VAR).ok_or_else(|| ConfigError::Missing(BASE_URL_VAR.to_string()))?;
    let mut config = ClientConfig::new(base_url);

    if let Some(version) = lookup("CAMPUS_API_VERSION") {
        config.api_version = version;
    }
    if let Some(ms) = parse_var::<u64>(&lookup, "CAMPUS_CONNECT_TIMEOUT_MS")? {
        config.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = parse_var::<u64>(&lookup, "CAMPUS_READ_TIMEOUT_MS")? {
        config.read_timeout = Duration::from_millis(ms);
    }
    if let Some(attempts) = parse_var::<u32>(&lookup, "CAMPUS_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(ms) = parse_var::<u64>(&lookup, "CAMPUS_BASE_DELAY_MS")? {
        config.retry.base_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = parse_var::<u64>(&lookup, "CAMPUS_MAX_DELAY_MS")? {
        config.retry.max_delay = Duration::from_millis(ms);
    }
    if let Some(factor) = parse_var::<f64>(&lookup, "CAMPUS_JITTER_FACTOR")? {
        config.retry.jitter_factor = factor;
    }
    if let Some(agent) = lookup("CAMPUS_USER_AGENT") {
        config.user_agent = agent;
    }
    if let Some(service) = lookup("CAMPUS_KEYCHAIN_SERVICE") {
        config.keychain_service = service;
    }
    if let Some(filter) = lookup("CAMPUS_LOG") {
        config.logging.filter = filter;
    }
    config.logging.json = lookup("CAMPUS_LOG_JSON").is_some_and(|value| parse_bool(&value));

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations (see
/// [`probe_config_paths`]). Format is detected by file extension.
///
/// # Errors
/// Returns `ConfigError::File` if the file is missing, unreadable or
/// malformed, and `ConfigError::Invalid` if validation fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::File(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::File("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfigError::File(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by the extension of `path` (`.toml` or `.json`,
/// JSON when there is none). Does not validate.
///
/// # Errors
/// Returns `ConfigError::File` if the format is unsupported or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::File(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::File(format!("Invalid JSON format: {e}"))),
        _ => Err(ConfigError::File(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first existing candidate, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    first_existing(&roots)
}

fn first_existing(roots: &[PathBuf]) -> Option<PathBuf> {
    roots
        .iter()
        .flat_map(|root| CANDIDATE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.is_file())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().map_err(|e| ConfigError::invalid(key, e.to_string())))
        .transpose()
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`
/// (case-insensitive)
fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
