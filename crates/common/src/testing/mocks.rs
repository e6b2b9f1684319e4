//! Mock implementations of common traits

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::security::{KeychainError, SecretStore};

type StorageData = Arc<Mutex<HashMap<String, String>>>;

/// In-memory [`SecretStore`]
///
/// Clones share the same storage, so a test can hand one clone to the code
/// under test and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    storage: StorageData,
    read_only: Arc<Mutex<HashSet<String>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let storage = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { storage: Arc::new(Mutex::new(storage)), read_only: Arc::default() }
    }

    /// Make every later `set_secret` on `key` fail with `AccessFailed`.
    pub fn reject_writes(&self, key: impl Into<String>) {
        self.read_only.lock().insert(key.into());
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.storage.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.lock().is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        if self.read_only.lock().contains(key) {
            return Err(KeychainError::AccessFailed(format!("write to {key} rejected")));
        }
        self.storage.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        self.storage.lock().get(key).cloned().ok_or(KeychainError::NotFound)
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        self.storage.lock().remove(key);
        Ok(())
    }
}

/// [`SecretStore`] whose every operation fails with `AccessFailed`
#[derive(Debug, Clone)]
pub struct FailingSecretStore {
    reason: String,
}

impl FailingSecretStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn error(&self) -> KeychainError {
        KeychainError::AccessFailed(self.reason.clone())
    }
}

impl Default for FailingSecretStore {
    fn default() -> Self {
        Self::new("keychain locked")
    }
}

impl SecretStore for FailingSecretStore {
    fn set_secret(&self, _key: &str, _value: &str) -> Result<(), KeychainError> {
        Err(self.error())
    }

    fn get_secret(&self, _key: &str) -> Result<String, KeychainError> {
        Err(self.error())
    }

    fn delete_secret(&self, _key: &str) -> Result<(), KeychainError> {
        Err(self.error())
    }
}
