use crate::errors::internal::{AccessError, InternalError, WorkflowError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Proposal operation error types
#[derive(ApiResponse, Debug)]
pub enum ProposalError {
    /// Missing, invalid or expired session token
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Caller's role or ownership does not permit the operation
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Request body failed validation
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// Operation not allowed from the proposal's current state
    #[oai(status = 400)]
    InvalidTransition(Json<ErrorResponse>),

    /// Decision already recorded
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

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

impl ProposalError {
    pub fn unauthorized() -> Self {
        ProposalError::Unauthorized(body("invalid_token", "Invalid or expired token", 401))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ProposalError::Forbidden(body("forbidden", message, 403))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ProposalError::NotFound(body("not_found", message, 404))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ProposalError::BadRequest(body("validation_failed", message, 400))
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        ProposalError::InvalidTransition(body("invalid_transition", message, 400))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ProposalError::Conflict(body("conflict", message, 409))
    }

    fn internal_server_error() -> Self {
        ProposalError::InternalError(body("internal_error", "An internal error occurred", 500))
    }

    pub fn from_internal_error(err: InternalError) -> Self {
        match err {
            InternalError::Token(token_err) => {
                tracing::debug!("Token rejected: {:?}", token_err.class);
                Self::unauthorized()
            }
            InternalError::Access(AccessError::Unauthenticated { .. }) => Self::unauthorized(),
            InternalError::Access(AccessError::ForbiddenRole { .. }) => {
                Self::forbidden("Your role is not permitted to perform this action")
            }
            InternalError::Access(AccessError::ForbiddenOwnership { .. }) => {
                Self::forbidden("You do not have access to this proposal")
            }
            InternalError::Access(AccessError::InactiveCaller { .. }) => {
                Self::forbidden("Account is inactive")
            }
            InternalError::Workflow(WorkflowError::NotFound { resource, .. }) => {
                Self::not_found(format!("{resource} not found"))
            }
            InternalError::Workflow(WorkflowError::InvalidTransition { message }) => {
                Self::invalid_transition(message)
            }
            InternalError::Workflow(WorkflowError::Validation(message)) => Self::bad_request(message),
            InternalError::Workflow(WorkflowError::Conflict(message)) => Self::conflict(message),
            other => {
                tracing::error!("Unexpected error in proposal operation: {}", other);
                Self::internal_server_error()
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            ProposalError::Unauthorized(json)
            | ProposalError::Forbidden(json)
            | ProposalError::NotFound(json)
            | ProposalError::BadRequest(json)
            | ProposalError::InvalidTransition(json)
            | ProposalError::Conflict(json)
            | ProposalError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl From<InternalError> for ProposalError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for ProposalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::ProposalStatus;

    #[test]
    fn test_invalid_transition_is_bad_request() {
        let err = ProposalError::from_internal_error(
            WorkflowError::not_allowed("edit", ProposalStatus::Approved).into(),
        );
        match err {
            ProposalError::InvalidTransition(json) => {
                assert_eq!(json.0.status_code, 400);
                assert!(json.0.message.contains("approved"));
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_decision_is_conflict() {
        let err = ProposalError::from_internal_error(WorkflowError::conflict("decision already recorded").into());
        assert!(matches!(err, ProposalError::Conflict(_)));
    }

    #[test]
    fn test_ownership_is_forbidden() {
        let err = ProposalError::from_internal_error(
            AccessError::forbidden_ownership("u-1", "proposal 7").into(),
        );
        assert!(matches!(err, ProposalError::Forbidden(_)));
    }

    #[test]
    fn test_database_error_is_opaque() {
        let err = ProposalError::from_internal_error(InternalError::database(
            "insert_proposal",
            sea_orm::DbErr::Custom("disk I/O error".into()),
        ));
        assert!(matches!(err, ProposalError::InternalError(_)));
        assert!(!err.message().contains("disk"));
    }
}
