//! Request and response bodies of the authentication endpoints

use serde::{Deserialize, Serialize};

use super::auth::{TokenPair, DEFAULT_TOKEN_TYPE};

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Body of `POST /auth/refresh`.
#[derive(Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token payload returned by register, login and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

impl From<TokenResponse> for TokenPair {
    fn from(response: TokenResponse) -> Self {
        Self::new(response.access_token, response.refresh_token, response.token_type)
    }
}
