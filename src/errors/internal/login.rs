use thiserror::Error;

use super::InternalError;

pub const REASON_NOT_REGISTERED: &str = "User tidak terdaftar dalam sistem";
pub const REASON_INACTIVE: &str = "User tidak aktif";
pub const REASON_WRONG_PASSWORD: &str = "Password salah";
pub const REASON_WRONG_DIRECTORY_PASSWORD: &str = "Password LDAP salah";
pub const REASON_DIRECTORY_ENTRY_MISSING: &str = "User tidak ditemukan di LDAP";
pub const REASON_DIRECTORY_UNAVAILABLE: &str = "Server LDAP tidak dapat dihubungi";
pub const REASON_EMPTY_CREDENTIALS: &str = "Username atau password kosong";
pub const REASON_SYSTEM_ERROR: &str = "Kesalahan sistem";

/// Why a login attempt was refused.
///
/// Every variant carries the reason string written to the login audit log.
/// At the API boundary `AccountNotFound` and `InvalidCredentials` collapse to
/// the same response so callers cannot probe for registered usernames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Account not found: {username}")]
    AccountNotFound { username: String },

    #[error("Account is inactive: {username}")]
    AccountInactive { username: String },

    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: &'static str },

    #[error("Directory unavailable: {detail}")]
    DirectoryUnavailable { detail: String },
}

impl LoginError {
    pub fn account_not_found(username: impl Into<String>) -> InternalError {
        InternalError::Login(Self::AccountNotFound { username: username.into() })
    }

    pub fn account_inactive(username: impl Into<String>) -> InternalError {
        InternalError::Login(Self::AccountInactive { username: username.into() })
    }

    pub fn invalid_credentials(reason: &'static str) -> InternalError {
        InternalError::Login(Self::InvalidCredentials { reason })
    }

    pub fn directory_unavailable(detail: impl Into<String>) -> InternalError {
        InternalError::Login(Self::DirectoryUnavailable { detail: detail.into() })
    }

    /// Reason recorded in the login audit log
    pub fn audit_reason(&self) -> &'static str {
        match self {
            LoginError::AccountNotFound { .. } => REASON_NOT_REGISTERED,
            LoginError::AccountInactive { .. } => REASON_INACTIVE,
            LoginError::InvalidCredentials { reason } => *reason,
            LoginError::DirectoryUnavailable { .. } => REASON_DIRECTORY_UNAVAILABLE,
        }
    }
}
