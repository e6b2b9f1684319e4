//! Shared test helpers for `campus-core` integration tests.
//!
//! A scripted in-memory transport and token store so coordinator tests can
//! focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod tokens;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use campus_core::AuthCoordinator;
use campus_domain::{ClientConfig, TokenPair};

pub use tokens::MemoryTokenStore;
pub use transport::{Reply, ScriptedTransport};

pub const BASE_URL: &str = "https://api.campus.test";

pub fn test_config() -> ClientConfig {
    let mut config = ClientConfig::new(BASE_URL);
    config.retry.max_attempts = 3;
    config.retry.base_delay = Duration::from_millis(1000);
    config.retry.jitter_factor = 0.25;
    config
}

pub fn user_json(id: &str, email: &str) -> String {
    format!(r#"{{"id":"{id}","email":"{email}","full_name":"Test User","role":"student"}}"#)
}

pub fn tokens_json(access: &str, refresh: &str) -> String {
    format!(r#"{{"access_token":"{access}","refresh_token":"{refresh}","token_type":"bearer"}}"#)
}

pub fn stored(access: &str, refresh: &str) -> TokenPair {
    TokenPair::new(access, refresh, "bearer")
}

pub async fn coordinator(
    transport: &ScriptedTransport,
    tokens: &MemoryTokenStore,
) -> AuthCoordinator {
    AuthCoordinator::start(test_config(), Arc::new(transport.clone()), Arc::new(tokens.clone()))
        .await
        .expect("valid test config")
}
