//! Wiring of the production client
//!
//! Builds an [`AuthCoordinator`] on the reqwest transport and the keychain
//! token store.

use std::sync::Arc;

use campus_core::{AuthCoordinator, TokenStore};
use campus_domain::ClientConfig;
use tracing::info;

use crate::errors::InfraError;
use crate::http::ReqwestTransport;
use crate::keychain::keychain_token_store;

/// Connect with tokens kept in the keychain service named by
/// `config.keychain_service`.
///
/// # Errors
/// `InfraError::Config` for an invalid configuration,
/// `InfraError::Transport` if the HTTP client cannot be built.
pub async fn connect(config: ClientConfig) -> Result<AuthCoordinator, InfraError> {
    let tokens = Arc::new(keychain_token_store(&config.keychain_service));
    connect_with_store(config, tokens).await
}

/// Connect with a caller-supplied token store.
///
/// # Errors
/// See [`connect`].
pub async fn connect_with_store(
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
) -> Result<AuthCoordinator, InfraError> {
    config.validate()?;
    let transport = Arc::new(ReqwestTransport::from_config(&config)?);
    let coordinator = AuthCoordinator::start(config, transport, tokens).await?;
    info!(
        base_url = %coordinator.config().base_url,
        authenticated = coordinator.is_authenticated(),
        "Campus client ready"
    );
    Ok(coordinator)
}
