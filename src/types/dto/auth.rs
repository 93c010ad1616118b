use poem_openapi::Object;

use crate::types::dto::user::IdentityResponse;

/// Request model for user login
#[derive(Object)]
pub struct LoginRequest {
    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response model containing the session token
#[derive(Object, Debug)]
pub struct LoginResponse {
    /// Signed session token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the token expires
    pub expires_in: i64,

    /// Token expiration time (Unix timestamp)
    pub expires_at: i64,

    pub user: IdentityResponse,
}
