//! Status-code and transport-error policy

use std::sync::Arc;
use std::time::Duration;

use campus_common::error::{ErrorClassification, ErrorSeverity};
use campus_common::resilience::{RetryDecision, RetryPolicy};
use campus_domain::{DomainError, ErrorKind};
use thiserror::Error;
use tracing::debug;

use super::body::ErrorBody;
use super::table::ErrorCodeTable;
use crate::transport::{ApiResponse, TransportError};

/// Why a single attempt failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("server responded with status {}", .0.status)]
    Status(ApiResponse),

    /// A 2xx response whose body did not match the expected shape.
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ApiFailure {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status(ApiResponse::new(status, body))
    }

    pub fn decode(error: &serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Outcome of classifying one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub error: DomainError,
    pub retryable: bool,
    /// Server-requested delay before the next attempt.
    pub retry_after: Option<Duration>,
}

impl Classification {
    fn terminal(error: DomainError) -> Self {
        Self { error, retryable: false, retry_after: None }
    }
}

impl ErrorClassification for Classification {
    fn is_retryable(&self) -> bool {
        self.retryable
    }

    fn severity(&self) -> ErrorSeverity {
        match self.error.kind {
            _ if self.error.is_cancelled() => ErrorSeverity::Info,
            ErrorKind::ValidationError | ErrorKind::AuthError => ErrorSeverity::Warning,
            ErrorKind::NetworkError => ErrorSeverity::Warning,
            ErrorKind::ServerError | ErrorKind::UnknownError => ErrorSeverity::Error,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }
}

/// Pure mapping from failures to classified domain errors.
///
/// Status policy:
/// - 408 → retryable `NetworkError`
/// - 429 and 5xx → retryable `ServerError`
/// - 401, 403 → `AuthError`; 400, 422 → `ValidationError`
/// - any other status → `UnknownError`
///
/// A server code found in the [`ErrorCodeTable`] overrides the kind but never
/// the retryability, which is decided by status alone.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    codes: ErrorCodeTable,
}

impl ErrorClassifier {
    pub const fn new(codes: ErrorCodeTable) -> Self {
        Self { codes }
    }

    pub const fn codes(&self) -> &ErrorCodeTable {
        &self.codes
    }

    pub fn classify(&self, failure: &ApiFailure) -> Classification {
        let classification = match failure {
            ApiFailure::Transport(error) => Self::classify_transport(error),
            ApiFailure::Status(response) => self.classify_response(response),
            ApiFailure::Decode(reason) => Classification::terminal(
                DomainError::unknown("Unexpected response from server").with_details(reason.clone()),
            ),
        };

        debug!(
            kind = %classification.error.kind,
            retryable = classification.retryable,
            failure = %failure,
            "Classified request failure"
        );

        classification
    }

    fn classify_transport(error: &TransportError) -> Classification {
        let domain = match error {
            TransportError::Cancelled => DomainError::cancelled(),
            TransportError::Timeout(detail) => {
                DomainError::network("Request timed out").with_details(detail.clone())
            }
            TransportError::Connect(detail) | TransportError::Socket(detail) => {
                DomainError::network("Unable to reach server").with_details(detail.clone())
            }
            TransportError::Dns(detail) => {
                DomainError::network("Unable to resolve server address").with_details(detail.clone())
            }
            TransportError::InvalidRequest(detail) => {
                DomainError::unknown("Request could not be built").with_details(detail.clone())
            }
        };
        Classification { error: domain, retryable: error.is_retryable(), retry_after: None }
    }

    fn classify_response(&self, response: &ApiResponse) -> Classification {
        let status = response.status;
        let (status_kind, retryable) = status_policy(status);
        let body = ErrorBody::parse(&response.body).unwrap_or_default();

        let kind = body.code.as_deref().and_then(|code| self.codes.lookup(code)).unwrap_or(status_kind);
        let message = body.message.unwrap_or_else(|| default_message(status).to_string());
        let details = body.details.or(body.code);

        let mut error = DomainError::new(kind, message);
        if let Some(details) = details {
            error = error.with_details(details);
        }

        Classification {
            error,
            retryable,
            retry_after: if retryable { response.retry_after } else { None },
        }
    }
}

const fn status_policy(status: u16) -> (ErrorKind, bool) {
    match status {
        408 => (ErrorKind::NetworkError, true),
        429 | 500..=599 => (ErrorKind::ServerError, true),
        401 | 403 => (ErrorKind::AuthError, false),
        400 | 422 => (ErrorKind::ValidationError, false),
        _ => (ErrorKind::UnknownError, false),
    }
}

const fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Authentication required",
        403 => "Access denied",
        404 => "Resource not found",
        408 => "Request timed out",
        422 => "Invalid request data",
        429 => "Too many requests",
        500..=599 => "Server error",
        _ => "Unexpected response status",
    }
}

/// [`RetryPolicy`] that consults an [`ErrorClassifier`] on each failure.
#[derive(Debug, Clone)]
pub struct ClassifierPolicy {
    classifier: Arc<ErrorClassifier>,
}

impl ClassifierPolicy {
    pub const fn new(classifier: Arc<ErrorClassifier>) -> Self {
        Self { classifier }
    }
}

impl RetryPolicy<ApiFailure> for ClassifierPolicy {
    fn should_retry(&self, error: &ApiFailure, _attempt: u32) -> RetryDecision {
        let classification = self.classifier.classify(error);
        if !classification.is_retryable() {
            return RetryDecision::Stop;
        }
        classification.retry_after().map_or(RetryDecision::Retry, RetryDecision::RetryAfter)
    }
}
