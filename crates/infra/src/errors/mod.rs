//! Infrastructure errors and conversions from third-party error types.

mod conversions;

use campus_core::TransportError;
use campus_domain::ConfigError;
use thiserror::Error;

pub(crate) use conversions::IntoTransportError;

/// Failure while wiring the client together.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("http client setup failed: {0}")]
    Transport(#[from] TransportError),
}
