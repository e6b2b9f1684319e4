//! # Campus Core
//!
//! Business logic of the Campus API client - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for HTTP transport and token storage
//! - Failure classification and the API-aware retry executor
//! - The authentication coordinator and its state broadcast
//!
//! ## Architecture Principles
//! - Only depends on `campus-common` and `campus-domain`
//! - No HTTP client or keychain code
//! - All external dependencies via traits

pub mod auth;
pub mod classifier;
pub mod retry;
pub mod transport;

pub use auth::{AuthCoordinator, AuthStateStore, SecretTokenStore, TokenStore, TokenStoreError};
pub use classifier::{ApiFailure, Classification, ClassifierPolicy, ErrorClassifier, ErrorCodeTable};
pub use retry::{ApiOutcome, ApiRetryExecutor};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, TransportError};
