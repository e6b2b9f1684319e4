//! Platform keychain access for secret strings
//!
//! [`SecretStore`] is the storage seam: a flat `key -> secret` namespace with
//! no business rules. [`KeychainProvider`] implements it over the platform
//! keychain (macOS Keychain Access, Windows Credential Manager, Linux Secret
//! Service) through the `keyring` crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campus_common::security::keychain::{KeychainProvider, SecretStore};
//!
//! let keychain = KeychainProvider::new("Campus.auth");
//! keychain.set_secret("refresh_token", "r1")?;
//! assert_eq!(keychain.get_secret("refresh_token")?, "r1");
//! # Ok::<(), campus_common::security::KeychainError>(())
//! ```

use keyring::Entry;
use thiserror::Error;
use tracing::debug;


/// Durable string storage keyed by name
///
/// Implementations must be safe to call from several threads at once.
/// `delete_secret` is idempotent: deleting a missing key succeeds.
pub trait SecretStore: Send + Sync {
    /// Persist `value` under `key`, replacing any previous value.
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError>;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// `KeychainError::NotFound` when nothing is stored under `key`.
    fn get_secret(&self, key: &str) -> Result<String, KeychainError>;

    /// Remove the value stored under `key`.
    fn delete_secret(&self, key: &str) -> Result<(), KeychainError>;

    /// Check if a secret exists
    fn secret_exists(&self, key: &str) -> bool {
        self.get_secret(key).is_ok()
    }

    /// Read `key`, mapping `NotFound` to `None`.
    fn find_secret(&self, key: &str) -> Result<Option<String>, KeychainError> {
        match self.get_secret(key) {
            Ok(value) => Ok(Some(value)),
            Err(KeychainError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Keychain-backed [`SecretStore`] scoped to one service name
#[derive(Debug, Clone)]
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "Campus.auth")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to create keychain entry: {e}"))
        })
    }
}

impl SecretStore for KeychainProvider {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {key}: {e}"))
        })
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        let entry = self.create_entry(key)?;
        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => KeychainError::NotFound,
            other => KeychainError::AccessFailed(format!(
                "Failed to retrieve secret for {key}: {other}"
            )),
        })
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        let entry = self.create_entry(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to delete secret for {key}: {e}"
            ))),
        }
    }
}

/// Keychain error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),

    /// No secret stored under the requested key
    #[error("Secret not found in keychain")]
    NotFound,
}
