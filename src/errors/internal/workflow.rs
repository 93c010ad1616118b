use thiserror::Error;

use crate::types::internal::ProposalStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// The operation is not allowed from the current lifecycle state
    #[error("Invalid transition: {message}")]
    InvalidTransition { message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl WorkflowError {
    pub fn not_allowed(action: &str, status: ProposalStatus) -> Self {
        Self::InvalidTransition {
            message: format!("cannot {action} a proposal in status '{status}'"),
        }
    }

    /// A compare-and-swap update found the row in a different state
    pub fn stale(action: &str) -> Self {
        Self::InvalidTransition {
            message: format!("cannot {action}: proposal was changed by another request"),
        }
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound { resource, id: id.to_string() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
