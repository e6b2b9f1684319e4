//! User record types
//!
//! The server owns the full user profile; the client only keeps the summary
//! returned by `GET /auth/me` and `PUT /auth/profile`.

use serde::{Deserialize, Serialize};

/// User record returned by the authentication endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(deserialize_with = "crate::utils::serde::string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Platform role such as `student` or `teacher`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserSummary {
    /// Name to show in the UI, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or(&self.email)
    }
}

/// Partial profile update sent to `PUT /auth/profile`.
///
/// Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.avatar_url.is_none()
    }
}
