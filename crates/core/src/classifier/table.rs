//! Server error code lookup table

use std::collections::HashMap;

use campus_domain::ErrorKind;

/// Maps backend-defined error codes (e.g. `EMAIL_TAKEN`) to an [`ErrorKind`].
///
/// Supplied from configuration so the classifier carries no knowledge of a
/// particular backend's vocabulary. Lookups are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCodeTable {
    codes: HashMap<String, ErrorKind>,
}

impl ErrorCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, code: impl Into<String>, kind: ErrorKind) -> Self {
        self.codes.insert(code.into(), kind);
        self
    }

    pub fn insert(&mut self, code: impl Into<String>, kind: ErrorKind) -> Option<ErrorKind> {
        self.codes.insert(code.into(), kind)
    }

    pub fn lookup(&self, code: &str) -> Option<ErrorKind> {
        self.codes.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl From<HashMap<String, ErrorKind>> for ErrorCodeTable {
    fn from(codes: HashMap<String, ErrorKind>) -> Self {
        Self { codes }
    }
}

impl<K: Into<String>> FromIterator<(K, ErrorKind)> for ErrorCodeTable {
    fn from_iter<I: IntoIterator<Item = (K, ErrorKind)>>(iter: I) -> Self {
        Self { codes: iter.into_iter().map(|(code, kind)| (code.into(), kind)).collect() }
    }
}
