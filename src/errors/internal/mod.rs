use thiserror::Error;

pub mod access;
pub mod audit;
pub mod database;
pub mod directory;
pub mod login;
pub mod token;
pub mod workflow;

pub use access::AccessError;
pub use audit::AuditError;
pub use database::DatabaseError;
pub use directory::DirectoryError;
pub use login::LoginError;
pub use token::{TokenError, TokenFailClass};
pub use workflow::WorkflowError;

/// Internal error type for store, provider and coordinator operations
///
/// Hybrid design separates infrastructure errors (shared) from domain errors.
/// Not exposed via API - endpoints must convert to AuthError, ProposalError or AdminError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation { operation: operation.to_string(), source })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    pub fn parse(value_type: impl Into<String>, message: impl Into<String>) -> InternalError {
        InternalError::Parse { value_type: value_type.into(), message: message.into() }
    }

    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> InternalError {
        InternalError::Crypto { operation: operation.into(), message: message.into() }
    }

    /// Reason written to the login audit for a failed attempt
    pub fn login_audit_reason(&self) -> &'static str {
        match self {
            InternalError::Login(err) => err.audit_reason(),
            _ => login::REASON_SYSTEM_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_audit_reasons() {
        assert_eq!(
            LoginError::account_not_found("ghost").login_audit_reason(),
            "User tidak terdaftar dalam sistem"
        );
        assert_eq!(LoginError::account_inactive("bob").login_audit_reason(), "User tidak aktif");
        assert_eq!(
            LoginError::invalid_credentials(login::REASON_WRONG_PASSWORD).login_audit_reason(),
            "Password salah"
        );
        assert_eq!(
            LoginError::directory_unavailable("connection refused").login_audit_reason(),
            "Server LDAP tidak dapat dihubungi"
        );
    }

    #[test]
    fn test_infrastructure_errors_audit_as_system_error() {
        let err = InternalError::database("find_user", sea_orm::DbErr::Custom("boom".into()));
        assert_eq!(err.login_audit_reason(), login::REASON_SYSTEM_ERROR);
    }

    #[test]
    fn test_from_conversions() {
        let err: InternalError = WorkflowError::validation("title is required").into();
        assert!(matches!(err, InternalError::Workflow(WorkflowError::Validation(_))));

        let err: InternalError = AccessError::unauthenticated("missing token").into();
        assert!(matches!(err, InternalError::Access(AccessError::Unauthenticated { .. })));
    }
}
