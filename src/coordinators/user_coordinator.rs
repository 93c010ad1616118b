use std::sync::Arc;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::WorkflowError;
use crate::providers::authorization_provider::ADMIN_ONLY;
use crate::providers::{AuthorizationProvider, Clock, PasswordProvider};
use crate::stores::{NewUser, UserStore, UserUpdate};
use crate::types::db::user;
use crate::types::internal::{RequestContext, UserRole};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Account fields supplied by an administrator or the CLI
#[derive(Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    pub department: String,
    pub is_directory_user: bool,
    /// Local accounts only; generated when absent
    pub password: Option<String>,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("is_directory_user", &self.is_directory_user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A created account, plus the password when one was generated for it
#[derive(Debug)]
pub struct CreatedAccount {
    pub user: user::Model,
    pub generated_password: Option<String>,
}

/// User administration workflows
///
/// API operations require the admin role. The `*_unchecked` variants are for
/// the CLI, which runs with direct database access.
pub struct UserCoordinator {
    user_store: Arc<UserStore>,
    password_provider: Arc<PasswordProvider>,
    authorization_provider: Arc<AuthorizationProvider>,
    clock: Arc<dyn Clock>,
}

impl UserCoordinator {
    /// Create UserCoordinator from AppData
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            user_store: Arc::clone(&app_data.user_store),
            password_provider: Arc::clone(&app_data.password_provider),
            authorization_provider: Arc::clone(&app_data.authorization_provider),
            clock: Arc::clone(&app_data.clock),
        }
    }

    async fn require_admin<'a>(&self, ctx: &'a RequestContext, action: &str) -> Result<&'a str, InternalError> {
        let caller = self.authorization_provider.require_active_role(ctx, ADMIN_ONLY, action).await?;
        Ok(caller.user_id.as_str())
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<user::Model>, InternalError> {
        self.require_admin(ctx, "list users").await?;
        self.user_store.list().await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<user::Model, InternalError> {
        self.require_admin(ctx, "read user").await?;
        self.user_store.get(id).await
    }

    pub async fn create(&self, ctx: &RequestContext, account: NewAccount) -> Result<CreatedAccount, InternalError> {
        let admin_id = self.require_admin(ctx, "create user").await?.to_string();
        let created = self.create_unchecked(account).await?;
        tracing::info!(request_id = %ctx.request_id, actor = %admin_id, user_id = %created.user.id, "account created by admin");
        Ok(created)
    }

    /// Validate and insert an account. Local accounts get an Argon2 hash.
    pub async fn create_unchecked(&self, account: NewAccount) -> Result<CreatedAccount, InternalError> {
        let username = account.username.trim().to_string();
        let full_name = account.full_name.trim().to_string();
        if username.is_empty() || full_name.is_empty() {
            return Err(WorkflowError::validation("username and full_name are required").into());
        }

        let (password_hash, generated_password) = if account.is_directory_user {
            (None, None)
        } else {
            let (password, generated) = match account.password.filter(|p| !p.is_empty()) {
                Some(password) => (password, None),
                None => {
                    let password = self.password_provider.generate_password();
                    (password.clone(), Some(password))
                }
            };
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(WorkflowError::validation(format!(
                    "password must be at least {MIN_PASSWORD_LENGTH} characters"
                ))
                .into());
            }
            (Some(self.password_provider.hash_password(&password).await?), generated)
        };

        let user = self
            .user_store
            .create(
                NewUser {
                    username,
                    email: account.email,
                    full_name,
                    role: account.role,
                    department: account.department.trim().to_string(),
                    is_directory_user: account.is_directory_user,
                    password_hash,
                },
                self.clock.unix_now(),
            )
            .await?;

        Ok(CreatedAccount { user, generated_password })
    }

    pub async fn update(&self, ctx: &RequestContext, id: &str, changes: UserUpdate) -> Result<user::Model, InternalError> {
        let admin_id = self.require_admin(ctx, "update user").await?;
        if admin_id == id && (changes.is_active == Some(false) || changes.role.is_some_and(|r| r != UserRole::Admin)) {
            return Err(WorkflowError::validation("administrators cannot deactivate or demote themselves").into());
        }
        if changes.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(WorkflowError::validation("full_name must not be empty").into());
        }

        let updated = self.user_store.update(id, changes, self.clock.unix_now()).await?;
        tracing::info!(request_id = %ctx.request_id, actor = %admin_id, user_id = %id, "account updated");
        Ok(updated)
    }

    pub async fn toggle_active(&self, ctx: &RequestContext, id: &str) -> Result<user::Model, InternalError> {
        let admin_id = self.require_admin(ctx, "toggle user status").await?;
        if admin_id == id {
            return Err(WorkflowError::validation("administrators cannot deactivate themselves").into());
        }

        let updated = self.user_store.toggle_active(id, self.clock.unix_now()).await?;
        tracing::info!(request_id = %ctx.request_id, actor = %admin_id, user_id = %id, is_active = updated.is_active, "account status changed");
        Ok(updated)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), InternalError> {
        let admin_id = self.require_admin(ctx, "delete user").await?;
        if admin_id == id {
            return Err(WorkflowError::validation("administrators cannot delete themselves").into());
        }

        self.user_store.soft_delete(id, self.clock.unix_now()).await?;
        tracing::info!(request_id = %ctx.request_id, actor = %admin_id, user_id = %id, "account deleted");
        Ok(())
    }

    /// Change a role by username, for offline administration
    pub async fn set_role_unchecked(&self, username: &str, role: UserRole) -> Result<user::Model, InternalError> {
        self.user_store
            .set_role_by_username(username, role, self.clock.unix_now())
            .await
    }
}
