//! Conversions from reqwest errors into transport errors.

use std::error::Error as StdError;
use std::io;

use campus_core::TransportError;
use reqwest::Error as HttpError;

/// Extension trait that keeps the reqwest-specific mapping on the
/// infrastructure side.
pub(crate) trait IntoTransportError {
    fn into_transport(self) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self) -> TransportError {
        let description = describe(&self);

        if self.is_builder() {
            return TransportError::InvalidRequest(description);
        }
        if self.is_timeout() || timed_out_reading(&self) {
            return TransportError::Timeout(description);
        }
        if self.is_connect() {
            if looks_like_dns_failure(&description) {
                return TransportError::Dns(description);
            }
            return TransportError::Connect(description);
        }
        TransportError::Socket(description)
    }
}

/// reqwest's own message only names the URL; the cause is in the source chain.
fn describe(error: &HttpError) -> String {
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}

/// A read timeout surfaces as an I/O `TimedOut` somewhere down the chain.
fn timed_out_reading(error: &HttpError) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if cause.downcast_ref::<io::Error>().is_some_and(|e| e.kind() == io::ErrorKind::TimedOut) {
            return true;
        }
        source = cause.source();
    }
    false
}

fn looks_like_dns_failure(description: &str) -> bool {
    let lower = description.to_ascii_lowercase();
    lower.contains("dns")
        || lower.contains("failed to lookup address")
        || lower.contains("name or service not known")
        || lower.contains("nodename nor servname")
}
