//! [`TokenStore`] over any [`SecretStore`]
//!
//! Each token lives under its own key. Keychain calls block, so they run on
//! tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use campus_common::security::SecretStore;
use campus_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_TYPE_KEY};
use campus_domain::TokenPair;
use tracing::{debug, warn};

use super::ports::{TokenStore, TokenStoreError};

const TOKEN_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_TYPE_KEY];

pub struct SecretTokenStore<S> {
    secrets: Arc<S>,
}

impl<S> SecretTokenStore<S>
where
    S: SecretStore + 'static,
{
    pub fn new(secrets: S) -> Self {
        Self { secrets: Arc::new(secrets) }
    }

    pub const fn from_shared(secrets: Arc<S>) -> Self {
        Self { secrets }
    }

    async fn blocking<T, F>(&self, task: F) -> Result<T, TokenStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, TokenStoreError> + Send + 'static,
    {
        let secrets = Arc::clone(&self.secrets);
        tokio::task::spawn_blocking(move || task(secrets.as_ref()))
            .await
            .map_err(|e| TokenStoreError::Task(e.to_string()))?
    }

    async fn read(&self, key: &'static str) -> Result<Option<String>, TokenStoreError> {
        self.blocking(move |secrets| {
            Ok(secrets.find_secret(key)?.filter(|value| !value.is_empty()))
        })
        .await
    }
}

#[async_trait]
impl<S> TokenStore for SecretTokenStore<S>
where
    S: SecretStore + 'static,
{
    async fn save(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        let tokens = tokens.clone();
        self.blocking(move |secrets| {
            let written = [
                (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
                (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
                (TOKEN_TYPE_KEY, tokens.token_type.as_str()),
            ]
            .into_iter()
            .try_for_each(|(key, value)| secrets.set_secret(key, value));

            if let Err(e) = written {
                // A half-written pair must never be read back.
                warn!(error = %e, "Token write failed, removing partially stored pair");
                for key in TOKEN_KEYS {
                    if let Err(e) = secrets.delete_secret(key) {
                        warn!(key, error = %e, "Failed to remove token entry");
                    }
                }
                return Err(e.into());
            }
            Ok(())
        })
        .await?;
        debug!("Stored token pair");
        Ok(())
    }

    async fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.read(ACCESS_TOKEN_KEY).await
    }

    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.read(REFRESH_TOKEN_KEY).await
    }

    async fn token_type(&self) -> Result<Option<String>, TokenStoreError> {
        self.read(TOKEN_TYPE_KEY).await
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        self.blocking(|secrets| {
            // Attempt every key even if one fails; report the first failure.
            let results = TOKEN_KEYS.map(|key| secrets.delete_secret(key));
            results.into_iter().collect::<Result<Vec<()>, _>>()?;
            Ok(())
        })
        .await?;
        debug!("Cleared stored tokens");
        Ok(())
    }
}
