//! Transport-level failures raised before an HTTP status is available

use std::time::Duration;

use campus_common::error::{ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// Connect, read or overall request timeout of a single attempt.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection broke while the request or response was in transit.
    #[error("socket error: {0}")]
    Socket(String),

    #[error("request cancelled")]
    Cancelled,

    /// The request could not be built (bad URL, unserializable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ErrorClassification for TransportError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Dns(_) | Self::Timeout(_) | Self::Socket(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Info,
            Self::InvalidRequest(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_failures_are_retryable() {
        assert!(TransportError::Timeout("read".into()).is_retryable());
        assert!(TransportError::Connect("refused".into()).is_retryable());
        assert!(TransportError::Dns("nxdomain".into()).is_retryable());
        assert!(!TransportError::Cancelled.is_retryable());
        assert!(!TransportError::InvalidRequest("bad url".into()).is_retryable());
    }
}
