//! Failure classification
//!
//! Every failed attempt, whether a transport error or a non-2xx response,
//! is turned into a [`Classification`]: the `DomainError` callers will see and
//! whether another attempt could help.

mod body;
mod classify;
mod table;

pub use body::ErrorBody;
pub use classify::{ApiFailure, Classification, ClassifierPolicy, ErrorClassifier};
pub use table::ErrorCodeTable;
