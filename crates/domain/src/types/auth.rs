//! Authentication state and token types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::UserSummary;

/// Default token type issued by the API.
pub const DEFAULT_TOKEN_TYPE: &str = "bearer";

/// Access/refresh token pair persisted by the token store.
///
/// Replaced wholesale on refresh; never mutated in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        token_type: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: token_type.into(),
        }
    }
}

// Tokens must never end up in logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Authentication state machine value broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No usable credentials.
    #[default]
    Unauthenticated,
    /// Credentials are present.
    ///
    /// `user` is `None` only right after start-up, when a stored access
    /// token was found but not yet validated by `GET /auth/me`.
    Authenticated { user: Option<UserSummary> },
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The validated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserSummary> {
        match self {
            Self::Authenticated { user } => user.as_ref(),
            Self::Unauthenticated => None,
        }
    }
}
