use thiserror::Error;

use crate::types::internal::UserRole;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No usable bearer credential on the request
    #[error("Unauthenticated: {reason}")]
    Unauthenticated { reason: String },

    /// Caller's role is outside the allowed set, or the caller is unknown
    #[error("Role {role:?} is not permitted to {action}")]
    ForbiddenRole { role: Option<UserRole>, action: String },

    /// Caller is neither the owner nor holds an overriding role
    #[error("Caller {caller_id} does not own {resource}")]
    ForbiddenOwnership { caller_id: String, resource: String },

    /// Caller's account was deactivated after the token was issued
    #[error("Caller account {caller_id} is inactive")]
    InactiveCaller { caller_id: String },
}

impl AccessError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated { reason: reason.into() }
    }

    pub fn forbidden_role(role: Option<UserRole>, action: impl Into<String>) -> Self {
        Self::ForbiddenRole { role, action: action.into() }
    }

    pub fn forbidden_ownership(caller_id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::ForbiddenOwnership { caller_id: caller_id.into(), resource: resource.into() }
    }
}
