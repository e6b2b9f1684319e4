//! Port interface for token persistence

use async_trait::async_trait;
use campus_common::security::KeychainError;
use campus_domain::{DomainError, TokenPair, DEFAULT_TOKEN_TYPE};
use thiserror::Error;

/// Failure of the underlying token storage.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token storage failed: {0}")]
    Storage(#[from] KeychainError),

    /// The blocking storage task panicked or was aborted.
    #[error("token storage task failed: {0}")]
    Task(String),
}

impl From<TokenStoreError> for DomainError {
    fn from(error: TokenStoreError) -> Self {
        Self::unknown("Token storage failed").with_details(error.to_string())
    }
}

/// Durable cell holding the current [`TokenPair`].
///
/// Performs no validation, expiry computation or retry. Empty stored values
/// read back as `None`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Replace all three stored values.
    async fn save(&self, tokens: &TokenPair) -> Result<(), TokenStoreError>;

    async fn access_token(&self) -> Result<Option<String>, TokenStoreError>;

    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError>;

    async fn token_type(&self) -> Result<Option<String>, TokenStoreError>;

    /// Remove every stored value. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), TokenStoreError>;

    /// Storage errors count as "no token".
    async fn has_access_token(&self) -> bool {
        matches!(self.access_token().await, Ok(Some(_)))
    }

    /// The stored pair, if both tokens are present.
    async fn load(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        let (Some(access), Some(refresh)) = (self.access_token().await?, self.refresh_token().await?)
        else {
            return Ok(None);
        };
        let token_type = self.token_type().await?.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());
        Ok(Some(TokenPair::new(access, refresh, token_type)))
    }
}
