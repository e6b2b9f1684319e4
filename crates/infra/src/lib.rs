//! # Campus Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest HTTP transport
//! - Keychain-backed token storage
//! - Configuration loading from environment and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `campus-core`
//! - Contains all "impure" code (network, keychain, filesystem)

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod keychain;
pub mod observability;

// Re-export commonly used items
pub use client::{connect, connect_with_store};
pub use errors::InfraError;
pub use http::{ReqwestTransport, ReqwestTransportBuilder};
pub use keychain::{keychain_token_store, KeychainTokenStore};
pub use observability::init_tracing;
