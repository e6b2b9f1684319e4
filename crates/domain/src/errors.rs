//! Error and result vocabulary shared by every layer of the client.
//!
//! Failures never cross the public boundary as panics or boxed errors: they
//! are classified once into a [`DomainError`] and returned inside a
//! [`DomainResult`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::impl_wire_name_conversions;

/// Marker stored in [`DomainError::details`] when a call was cancelled.
pub const CANCELLED_MARKER: &str = "cancelled";

/// Classified failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed caller input (blank email, 400, 422).
    ValidationError,
    /// Missing or rejected credentials (401, 403, no token present).
    AuthError,
    /// Connectivity problems and timeouts.
    NetworkError,
    /// Server-side failures (5xx, 429) that persisted.
    ServerError,
    /// Anything that could not be classified, including cancellation.
    UnknownError,
}

impl_wire_name_conversions!(ErrorKind {
    ValidationError => "validation_error",
    AuthError => "auth_error",
    NetworkError => "network_error",
    ServerError => "server_error",
    UnknownError => "unknown_error",
});

/// Immutable classified error value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct DomainError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DomainError {
    /// Build an error of the given kind without details.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), details: None }
    }

    /// Attach details, replacing any existing ones.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthError, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownError, message)
    }

    /// Terminal error produced when a call is cancelled.
    pub fn cancelled() -> Self {
        Self::unknown("operation cancelled").with_details(CANCELLED_MARKER)
    }

    /// Whether this error represents a cancelled call.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::UnknownError && self.details.as_deref() == Some(CANCELLED_MARKER)
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::AuthError
    }
}

/// Result of an operation as observed by callers and reactive state streams.
///
/// `Loading` only appears in streams while a call is in flight; a completed
/// call always resolves to `Success` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DomainResult<T> {
    Success { data: T },
    Error { error: DomainError },
    Loading,
}

impl<T> DomainResult<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn error(error: DomainError) -> Self {
        Self::Error { error }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Borrow the payload of a successful result.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }

    /// Borrow the error of a failed result.
    pub fn error_ref(&self) -> Option<&DomainError> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> DomainResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success { data } => DomainResult::Success { data: f(data) },
            Self::Error { error } => DomainResult::Error { error },
            Self::Loading => DomainResult::Loading,
        }
    }

    /// Convert a terminal result into a `Result`.
    ///
    /// `Loading` is not terminal; it converts into an `UnknownError` so the
    /// caller never mistakes an in-flight marker for success.
    pub fn into_result(self) -> Result<T, DomainError> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Error { error } => Err(error),
            Self::Loading => Err(DomainError::unknown("result is still loading")),
        }
    }
}

impl<T> From<Result<T, DomainError>> for DomainResult<T> {
    fn from(result: Result<T, DomainError>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(error) => Self::Error { error },
        }
    }
}
