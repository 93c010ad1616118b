use std::sync::Arc;

use poem::Request;
use poem_openapi::param::Path;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::app_data::AppData;
use crate::coordinators::{
    DirectoryConfigCoordinator, DirectorySettingsChange, LoginLogCoordinator, NewAccount, UserCoordinator,
};
use crate::errors::{AdminError, InternalError};
use crate::providers::AuthorizationProvider;
use crate::stores::UserUpdate;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::config::{DirectoryConfigResponse, DirectoryTestResponse, UpdateDirectoryConfigRequest};
use crate::types::dto::login_log::{LoginAttemptResponse, LoginStatsResponse};
use crate::types::dto::user::{CreateUserRequest, CreatedUserResponse, UpdateUserRequest, UserResponse};
use crate::types::internal::RequestContext;

/// Administration endpoints: accounts, login log and directory settings
pub struct AdminApi {
    user_coordinator: UserCoordinator,
    login_log_coordinator: LoginLogCoordinator,
    directory_config_coordinator: DirectoryConfigCoordinator,
    authorization_provider: Arc<AuthorizationProvider>,
}

impl AdminApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            user_coordinator: UserCoordinator::new(Arc::clone(&app_data)),
            login_log_coordinator: LoginLogCoordinator::new(Arc::clone(&app_data)),
            directory_config_coordinator: DirectoryConfigCoordinator::new(Arc::clone(&app_data)),
            authorization_provider: Arc::clone(&app_data.authorization_provider),
        }
    }

    fn context(&self, req: &Request) -> Result<RequestContext, AdminError> {
        Ok(helpers::authenticated_context(req, &self.authorization_provider)?)
    }
}

fn with_names(rows: Vec<(crate::types::db::login_attempt::Model, Option<String>)>) -> Vec<LoginAttemptResponse> {
    rows.into_iter()
        .map(|(attempt, full_name)| LoginAttemptResponse::new(attempt, full_name))
        .collect()
}

/// API tags for admin endpoints
#[derive(Tags)]
enum AdminTags {
    /// Account administration
    Users,
    /// Login audit log
    LoginLogs,
    /// Directory connection settings
    Directory,
}

#[OpenApi(prefix_path = "/admin")]
impl AdminApi {
    #[oai(path = "/users", method = "get", tag = "AdminTags::Users")]
    async fn list_users(&self, req: &Request, _auth: BearerAuth) -> Result<Json<Vec<UserResponse>>, AdminError> {
        let ctx = self.context(req)?;
        let users = self.user_coordinator.list(&ctx).await?;
        Ok(Json(users.into_iter().map(UserResponse::from).collect()))
    }

    #[oai(path = "/users/:id", method = "get", tag = "AdminTags::Users")]
    async fn get_user(&self, req: &Request, _auth: BearerAuth, id: Path<String>) -> Result<Json<UserResponse>, AdminError> {
        let ctx = self.context(req)?;
        let user = self.user_coordinator.get(&ctx, &id.0).await?;
        Ok(Json(user.into()))
    }

    /// Create a local or directory-backed account
    ///
    /// A local account created without a password gets a generated one, which
    /// is returned in this response only.
    #[oai(path = "/users", method = "post", tag = "AdminTags::Users")]
    async fn create_user(
        &self,
        req: &Request,
        _auth: BearerAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<CreatedUserResponse>, AdminError> {
        let ctx = self.context(req)?;
        let body = body.0;
        let created = self
            .user_coordinator
            .create(
                &ctx,
                NewAccount {
                    username: body.username,
                    email: body.email,
                    full_name: body.full_name,
                    role: body.role,
                    department: body.department,
                    is_directory_user: body.is_directory_user,
                    password: body.password,
                },
            )
            .await?;

        Ok(Json(CreatedUserResponse {
            user: created.user.into(),
            generated_password: created.generated_password,
        }))
    }

    #[oai(path = "/users/:id", method = "put", tag = "AdminTags::Users")]
    async fn update_user(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserResponse>, AdminError> {
        let ctx = self.context(req)?;
        let body = body.0;
        let changes = UserUpdate {
            email: body.email,
            full_name: body.full_name,
            role: body.role,
            department: body.department,
            is_active: body.is_active,
        };
        let updated = self.user_coordinator.update(&ctx, &id.0, changes).await?;
        Ok(Json(updated.into()))
    }

    #[oai(path = "/users/:id", method = "delete", tag = "AdminTags::Users")]
    async fn delete_user(&self, req: &Request, _auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = self.context(req)?;
        self.user_coordinator.delete(&ctx, &id.0).await?;
        Ok(Json(MessageResponse::new("User deleted")))
    }

    /// Flip an account between active and inactive
    #[oai(path = "/users/:id/toggle-status", method = "post", tag = "AdminTags::Users")]
    async fn toggle_user_status(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<UserResponse>, AdminError> {
        let ctx = self.context(req)?;
        let updated = self.user_coordinator.toggle_active(&ctx, &id.0).await?;
        Ok(Json(updated.into()))
    }

    /// Most recent login attempts
    #[oai(path = "/logs/login", method = "get", tag = "AdminTags::LoginLogs")]
    async fn recent_logins(&self, req: &Request, _auth: BearerAuth) -> Result<Json<Vec<LoginAttemptResponse>>, AdminError> {
        let ctx = self.context(req)?;
        let rows = self.login_log_coordinator.recent(&ctx).await?;
        Ok(Json(with_names(rows)))
    }

    #[oai(path = "/logs/login/stats", method = "get", tag = "AdminTags::LoginLogs")]
    async fn login_stats(&self, req: &Request, _auth: BearerAuth) -> Result<Json<LoginStatsResponse>, AdminError> {
        let ctx = self.context(req)?;
        let stats = self.login_log_coordinator.stats(&ctx).await?;
        Ok(Json(LoginStatsResponse {
            total: stats.total,
            successful: stats.successful,
            failed: stats.failed,
        }))
    }

    #[oai(path = "/logs/login/user/:username", method = "get", tag = "AdminTags::LoginLogs")]
    async fn logins_for_user(
        &self,
        req: &Request,
        _auth: BearerAuth,
        username: Path<String>,
    ) -> Result<Json<Vec<LoginAttemptResponse>>, AdminError> {
        let ctx = self.context(req)?;
        let rows = self.login_log_coordinator.for_username(&ctx, &username.0).await?;
        Ok(Json(with_names(rows)))
    }

    /// Current directory settings; the bind password is never returned
    #[oai(path = "/config/ldap", method = "get", tag = "AdminTags::Directory")]
    async fn get_directory_config(&self, req: &Request, _auth: BearerAuth) -> Result<Json<DirectoryConfigResponse>, AdminError> {
        let ctx = self.context(req)?;
        let settings = self.directory_config_coordinator.get(&ctx).await?;
        Ok(Json(DirectoryConfigResponse::from(&settings)))
    }

    #[oai(path = "/config/ldap", method = "put", tag = "AdminTags::Directory")]
    async fn update_directory_config(
        &self,
        req: &Request,
        _auth: BearerAuth,
        body: Json<UpdateDirectoryConfigRequest>,
    ) -> Result<Json<DirectoryConfigResponse>, AdminError> {
        let ctx = self.context(req)?;
        let body = body.0;
        let change = DirectorySettingsChange {
            server: body.server,
            port: body.port,
            base_dn: body.base_dn,
            bind_username: body.bind_username,
            bind_password: body.bind_password,
            timeout_secs: body.timeout_secs,
            auto_provision: body.auto_provision,
        };
        let settings = self.directory_config_coordinator.update(&ctx, change).await?;
        Ok(Json(DirectoryConfigResponse::from(&settings)))
    }

    /// Bind with the service account using the current settings
    #[oai(path = "/config/ldap/test", method = "post", tag = "AdminTags::Directory")]
    async fn test_directory_connection(
        &self,
        req: &Request,
        _auth: BearerAuth,
    ) -> Result<Json<DirectoryTestResponse>, AdminError> {
        let ctx = self.context(req)?;
        match self.directory_config_coordinator.test_connection(&ctx).await {
            Ok(()) => Ok(Json(DirectoryTestResponse {
                success: true,
                message: "Directory connection succeeded".to_string(),
            })),
            // Detail stays in the server log
            Err(InternalError::Directory(_)) => Ok(Json(DirectoryTestResponse {
                success: false,
                message: "Directory connection failed".to_string(),
            })),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{FakeDirectory, TestContext};
    use crate::types::db::user;
    use crate::types::internal::UserRole;
    use poem_openapi::auth::Bearer;

    fn authed(ctx: &TestContext, user: &user::Model) -> (Request, BearerAuth) {
        let token = ctx.token_for(user);
        let req = Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .finish();
        (req, BearerAuth(Bearer { token }))
    }

    #[tokio::test]
    async fn test_non_admin_gets_403() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let cfo = ctx.local_user("cleo", "password1", UserRole::Cfo).await;
        let api = AdminApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &cfo);
        let err = api.list_users(&req, auth).await.unwrap_err();
        assert!(matches!(err, AdminError::AdminRequired(_)));
    }

    #[tokio::test]
    async fn test_create_user_returns_generated_password_once() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let admin = ctx.local_user("root", "password1", UserRole::Admin).await;
        let api = AdminApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &admin);
        let created = api
            .create_user(
                &req,
                auth,
                Json(CreateUserRequest {
                    username: "nadia".to_string(),
                    email: Some("nadia@corp.test".to_string()),
                    full_name: "Nadia".to_string(),
                    role: UserRole::Procurement,
                    department: "Procurement".to_string(),
                    is_directory_user: false,
                    password: None,
                }),
            )
            .await
            .unwrap();
        assert!(created.generated_password.is_some());

        let (req, auth) = authed(&ctx, &admin);
        let fetched = api.get_user(&req, auth, Path(created.user.id.clone())).await.unwrap();
        assert_eq!(fetched.username, "nadia");
        assert!(!fetched.is_directory_user);
    }

    #[tokio::test]
    async fn test_directory_config_hides_password() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let admin = ctx.local_user("root", "password1", UserRole::Admin).await;
        let api = AdminApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &admin);
        let updated = api
            .update_directory_config(
                &req,
                auth,
                Json(UpdateDirectoryConfigRequest {
                    server: Some("dc02.corp.test".to_string()),
                    port: Some(636),
                    base_dn: None,
                    bind_username: None,
                    bind_password: Some("rotated".to_string()),
                    timeout_secs: None,
                    auto_provision: None,
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.server, "dc02.corp.test");
        assert_eq!(updated.port, 636);
        assert!(updated.bind_password_set);
        assert_eq!(ctx.app_data.config.snapshot().directory.bind_password, "rotated");
    }

    #[tokio::test]
    async fn test_directory_connection_reports_failure_in_body() {
        let ctx = TestContext::new(FakeDirectory::unreachable()).await;
        let admin = ctx.local_user("root", "password1", UserRole::Admin).await;
        let api = AdminApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &admin);
        let result = api.test_directory_connection(&req, auth).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_directory_connection_succeeds() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let admin = ctx.local_user("root", "password1", UserRole::Admin).await;
        let api = AdminApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &admin);
        let result = api.test_directory_connection(&req, auth).await.unwrap();
        assert!(result.success);
    }
}
