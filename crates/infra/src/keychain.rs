//! Token storage in the system keychain
use campus_common::KeychainProvider;
use campus_core::SecretTokenStore;

/// Token store persisting the three token entries in the OS keychain.
pub type KeychainTokenStore = SecretTokenStore<KeychainProvider>;

/// Keychain token store under `service` (e.g. `Campus.auth`).
pub fn keychain_token_store(service: &str) -> KeychainTokenStore {
    SecretTokenStore::new(KeychainProvider::new(service))
}
