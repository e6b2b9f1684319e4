use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use campus_core::{TokenStore, TokenStoreError};
use campus_domain::TokenPair;

/// In-memory `TokenStore` that counts writes.
///
/// Clones share state, so tests keep one clone to inspect what the
/// coordinator stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<Mutex<Option<TokenPair>>>,
    saves: Arc<AtomicUsize>,
    clears: Arc<AtomicUsize>,
    reject_saves: Arc<AtomicBool>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        let store = Self::default();
        *store.tokens.lock().unwrap() = Some(tokens);
        store
    }

    /// Only an access token, as left behind by an older client version.
    pub fn with_access_only(access: &str) -> Self {
        Self::with_tokens(TokenPair::new(access, "", "bearer"))
    }

    /// Make every later `save` fail, leaving the stored pair untouched.
    pub fn reject_saves(&self) {
        self.reject_saves.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Option<TokenPair> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    fn field(&self, pick: fn(&TokenPair) -> &String) -> Option<String> {
        self.tokens.lock().unwrap().as_ref().map(pick).filter(|v| !v.is_empty()).cloned()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        if self.reject_saves.load(Ordering::SeqCst) {
            return Err(TokenStoreError::Task("keychain unavailable".into()));
        }
        *self.tokens.lock().unwrap() = Some(tokens.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.field(|t| &t.access_token))
    }

    async fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.field(|t| &t.refresh_token))
    }

    async fn token_type(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.field(|t| &t.token_type))
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        *self.tokens.lock().unwrap() = None;
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
