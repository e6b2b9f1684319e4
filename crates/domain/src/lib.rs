//! # Campus Domain
//!
//! Data vocabulary of the Campus API client.
//!
//! This crate contains:
//! - The classified error type and the `DomainResult` sum type
//! - Token, user and authentication state types
//! - Request/response bodies of the authentication endpoints
//! - Client configuration structures and their defaults
//!
//! ## Architecture
//! - No dependencies on other Campus crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
