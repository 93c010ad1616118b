use crate::errors::internal::{AccessError, DirectoryError, InternalError, WorkflowError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Admin operation error types
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// Missing, invalid or expired session token
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Administrator role required
    #[oai(status = 403)]
    AdminRequired(Json<ErrorResponse>),

    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// Username or email already in use
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// Directory could not be reached
    #[oai(status = 503)]
    DirectoryUnavailable(Json<ErrorResponse>),

    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

fn body(error: &str, message: impl Into<String>, status_code: u16) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code,
    })
}

impl AdminError {
    pub fn unauthorized() -> Self {
        AdminError::Unauthorized(body("invalid_token", "Invalid or expired token", 401))
    }

    pub fn admin_required() -> Self {
        AdminError::AdminRequired(body("admin_required", "Administrator role required", 403))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AdminError::NotFound(body("not_found", message, 404))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AdminError::BadRequest(body("validation_failed", message, 400))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AdminError::Conflict(body("conflict", message, 409))
    }

    pub fn directory_unavailable(message: impl Into<String>) -> Self {
        AdminError::DirectoryUnavailable(body("directory_unavailable", message, 503))
    }

    fn internal_server_error() -> Self {
        AdminError::InternalError(body("internal_error", "An internal error occurred", 500))
    }

    pub fn from_internal_error(err: InternalError) -> Self {
        match err {
            InternalError::Token(token_err) => {
                tracing::debug!("Token rejected: {:?}", token_err.class);
                Self::unauthorized()
            }
            InternalError::Access(AccessError::Unauthenticated { .. }) => Self::unauthorized(),
            InternalError::Access(AccessError::ForbiddenRole { role, action }) => {
                tracing::warn!("Role {:?} denied admin action {}", role, action);
                Self::admin_required()
            }
            InternalError::Access(AccessError::ForbiddenOwnership { .. })
            | InternalError::Access(AccessError::InactiveCaller { .. }) => Self::admin_required(),
            InternalError::Workflow(WorkflowError::NotFound { resource, .. }) => {
                Self::not_found(format!("{resource} not found"))
            }
            InternalError::Workflow(WorkflowError::Validation(message)) => Self::bad_request(message),
            InternalError::Workflow(WorkflowError::Conflict(message)) => Self::conflict(message),
            InternalError::Workflow(WorkflowError::InvalidTransition { message }) => {
                Self::bad_request(message)
            }
            InternalError::Directory(DirectoryError::Unavailable(detail)) => {
                tracing::warn!("Directory unavailable: {}", detail);
                Self::directory_unavailable("Directory server could not be reached")
            }
            other => {
                tracing::error!("Unexpected error in admin operation: {}", other);
                Self::internal_server_error()
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            AdminError::Unauthorized(json)
            | AdminError::AdminRequired(json)
            | AdminError::NotFound(json)
            | AdminError::BadRequest(json)
            | AdminError::Conflict(json)
            | AdminError::DirectoryUnavailable(json)
            | AdminError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl From<InternalError> for AdminError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
