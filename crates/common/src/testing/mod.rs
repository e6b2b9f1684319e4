//! Testing utilities and helpers
//!
//! - **[`assertions`]**: duration assertions for backoff tests
//! - **[`mocks`]**: in-memory [`SecretStore`](crate::security::SecretStore)
//!   implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campus_common::security::SecretStore;
//! use campus_common::testing::MemorySecretStore;
//!
//! let store = MemorySecretStore::new();
//! store.set_secret("access_token", "a1").unwrap();
//! assert_eq!(store.get_secret("access_token").unwrap(), "a1");
//! ```

pub mod assertions;
pub mod mocks;

pub use assertions::assert_duration_between;
pub use mocks::{FailingSecretStore, MemorySecretStore};
