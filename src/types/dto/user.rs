use poem_openapi::Object;

use crate::types::db::user;
use crate::types::internal::{AuthenticatedIdentity, UserRole};

/// Public view of a user account. Never carries the password hash.
#[derive(Object, Debug, Clone)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    pub department: String,
    pub is_active: bool,
    pub is_directory_user: bool,
    /// Unix timestamp of the last successful login
    pub last_login_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            department: model.department,
            is_active: model.is_active,
            is_directory_user: model.is_directory_user,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Compact user reference embedded in proposal responses
#[derive(Object, Debug, Clone)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            role: model.role,
        }
    }
}

/// Identity returned to the client after login
#[derive(Object, Debug, Clone)]
pub struct IdentityResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    pub department: String,
    pub is_directory_user: bool,
}

impl From<AuthenticatedIdentity> for IdentityResponse {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            id: identity.user_id,
            username: identity.username,
            email: identity.email,
            full_name: identity.full_name,
            role: identity.role,
            department: identity.department,
            is_directory_user: identity.is_directory_user,
        }
    }
}

/// Request model for creating a user (admin)
#[derive(Object)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    #[oai(default)]
    pub department: String,
    /// Directory accounts authenticate against the directory and never store a password
    #[oai(default = "default_true")]
    pub is_directory_user: bool,
    /// Required for local accounts
    pub password: Option<String>,
}

fn default_true() -> bool {
    true
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("is_directory_user", &self.is_directory_user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Returned on creation; carries the generated password exactly once
#[derive(Object, Debug)]
pub struct CreatedUserResponse {
    pub user: UserResponse,
    pub generated_password: Option<String>,
}

/// Request model for updating a user (admin)
#[derive(Object, Debug)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
}
