//! Security primitives
//!
//! Secret storage over the platform keychain.

pub mod keychain;

pub use keychain::{KeychainError, KeychainProvider, SecretStore};
