//! Domain types and models

pub mod auth;
pub mod requests;
pub mod user;

pub use auth::{AuthState, TokenPair, DEFAULT_TOKEN_TYPE};
pub use requests::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse};
pub use user::{ProfileUpdate, UserSummary};
