//! Error classification shared by transport, storage and retry code
//!
//! Concrete error enums live next to the code that raises them. What they
//! have in common is captured by [`ErrorClassification`]: whether a failure is
//! transient, how loud it should be logged, and whether the remote side asked
//! for a specific wait before the next attempt.
//!
//! The retry engine in [`crate::resilience`] consumes this trait through
//! `policies::ClassifiedRetry`.

use std::fmt;
use std::time::Duration;

/// Standard trait for error classification
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// use campus_common::error::{ErrorClassification, ErrorSeverity};
///
/// #[derive(Debug)]
/// enum FetchError {
///     Offline,
///     Rejected,
/// }
///
/// impl ErrorClassification for FetchError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, Self::Offline)
///     }
///
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             Self::Offline => ErrorSeverity::Warning,
///             Self::Rejected => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert!(FetchError::Offline.is_retryable());
/// assert_eq!(FetchError::Rejected.retry_after(), None);
/// ```
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: timeouts, dropped connections, rate
    /// limiting, temporary server unavailability.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Decides the level a terminal failure is logged at.
    fn severity(&self) -> ErrorSeverity;

    /// Get the suggested retry delay if applicable
    ///
    /// Returns `Some(Duration)` when the remote side asked for a specific
    /// delay (e.g. a `Retry-After` header).
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
