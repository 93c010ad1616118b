use serde::{Deserialize, Serialize};

use crate::types::db::user;
use crate::types::internal::role::UserRole;

/// Claims carried by a signed session token.
///
/// `exp`, `iat` and `nbf` are Unix timestamps in seconds. The role is the
/// closed [`UserRole`] set, so a token carrying an unknown role fails to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,

    /// Subject (user_id)
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Outcome of a successful credential check, built from the stored record
/// after any directory reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    pub department: String,
    pub is_directory_user: bool,
    pub last_login_at: Option<i64>,
}

impl From<&user::Model> for AuthenticatedIdentity {
    fn from(record: &user::Model) -> Self {
        Self {
            user_id: record.id.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
            full_name: record.full_name.clone(),
            role: record.role,
            department: record.department.clone(),
            is_directory_user: record.is_directory_user,
            last_login_at: record.last_login_at,
        }
    }
}

/// Profile attributes reported by the directory for a verified account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryIdentity {
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub department: String,
}

/// The authenticated principal attached to a request context.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
}

impl From<SessionClaims> for Caller {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            full_name: claims.full_name,
            role: claims.role,
        }
    }
}

/// Issued session token. The raw value is hidden from `Debug` output.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
