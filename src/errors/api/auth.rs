use crate::errors::internal::{AccessError, InternalError, LoginError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[oai(status = 401)]
    InvalidCredentials(Json<ErrorResponse>),

    /// Account exists but has been deactivated
    #[oai(status = 401)]
    AccountInactive(Json<ErrorResponse>),

    /// Session token is malformed, forged, expired or otherwise unusable
    #[oai(status = 401)]
    InvalidOrExpiredToken(Json<ErrorResponse>),

    /// Authorization header is missing
    #[oai(status = 401)]
    MissingAuthHeader(Json<ErrorResponse>),

    /// Directory could not be reached
    #[oai(status = 503)]
    DirectoryUnavailable(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

fn body(error: &str, message: &str, status_code: u16) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code,
    })
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(body("invalid_credentials", "Invalid username or password", 401))
    }

    pub fn account_inactive() -> Self {
        AuthError::AccountInactive(body("account_inactive", "Account is inactive", 401))
    }

    pub fn invalid_or_expired_token() -> Self {
        AuthError::InvalidOrExpiredToken(body("invalid_token", "Invalid or expired token", 401))
    }

    pub fn missing_auth_header() -> Self {
        AuthError::MissingAuthHeader(body(
            "missing_auth_header",
            "Authorization header is required",
            401,
        ))
    }

    pub fn directory_unavailable() -> Self {
        AuthError::DirectoryUnavailable(body(
            "directory_unavailable",
            "Authentication service is temporarily unavailable",
            503,
        ))
    }

    fn internal_server_error() -> Self {
        AuthError::InternalError(body("internal_error", "An internal error occurred", 500))
    }

    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            // Unknown account and wrong password look identical to the client
            InternalError::Login(LoginError::AccountNotFound { .. })
            | InternalError::Login(LoginError::InvalidCredentials { .. }) => {
                tracing::debug!("Login refused: {}", err);
                Self::invalid_credentials()
            }
            InternalError::Login(LoginError::AccountInactive { .. }) => {
                tracing::debug!("Login refused: {}", err);
                Self::account_inactive()
            }
            InternalError::Login(LoginError::DirectoryUnavailable { detail }) => {
                tracing::warn!("Directory unavailable during login: {}", detail);
                Self::directory_unavailable()
            }
            InternalError::Token(token_err) => {
                tracing::debug!("Token rejected: {:?}", token_err.class);
                Self::invalid_or_expired_token()
            }
            InternalError::Access(AccessError::Unauthenticated { .. }) => Self::missing_auth_header(),
            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(json)
            | AuthError::AccountInactive(json)
            | AuthError::InvalidOrExpiredToken(json)
            | AuthError::MissingAuthHeader(json)
            | AuthError::DirectoryUnavailable(json)
            | AuthError::InternalError(json) => json.0.message.clone(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials(json)
            | AuthError::AccountInactive(json)
            | AuthError::InvalidOrExpiredToken(json)
            | AuthError::MissingAuthHeader(json)
            | AuthError::DirectoryUnavailable(json)
            | AuthError::InternalError(json) => json.0.status_code,
        }
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
