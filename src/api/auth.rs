use std::sync::Arc;

use poem::Request;
use poem_openapi::auth::Bearer;
use poem_openapi::{OpenApi, SecurityScheme, Tags, payload::Json};

use crate::api::helpers;
use crate::app_data::AppData;
use crate::coordinators::LoginCoordinator;
use crate::errors::AuthError;
use crate::providers::{AuthorizationProvider, Clock};
use crate::types::dto::auth::{LoginRequest, LoginResponse};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::user::IdentityResponse;

/// Authentication API endpoints
pub struct AuthApi {
    login_coordinator: LoginCoordinator,
    authorization_provider: Arc<AuthorizationProvider>,
    clock: Arc<dyn Clock>,
}

impl AuthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            authorization_provider: Arc::clone(&app_data.authorization_provider),
            clock: Arc::clone(&app_data.clock),
            login_coordinator: LoginCoordinator::new(app_data),
        }
    }
}

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(ty = "bearer", key_name = "Authorization", key_in = "header", bearer_format = "JWT")]
pub struct BearerAuth(pub(crate) Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with username and password
    ///
    /// Directory accounts are verified by binding against the directory; local
    /// accounts against their stored password hash. Every attempt is recorded
    /// in the login log.
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, req: &Request, body: Json<LoginRequest>) -> Result<Json<LoginResponse>, AuthError> {
        let ctx = helpers::create_request_context(req);
        let (token, identity) = self
            .login_coordinator
            .login(&ctx, &body.username, &body.password)
            .await?;

        Ok(Json(LoginResponse {
            access_token: token.token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: (token.expires_at - self.clock.unix_now()).max(0),
            expires_at: token.expires_at,
            user: IdentityResponse::from(identity),
        }))
    }

    /// Current profile of the authenticated user
    #[oai(path = "/profile", method = "get", tag = "AuthTags::Authentication")]
    async fn profile(&self, req: &Request, _auth: BearerAuth) -> Result<Json<IdentityResponse>, AuthError> {
        let ctx = helpers::authenticated_context(req, &self.authorization_provider)?;
        let identity = self.login_coordinator.profile(&ctx).await?;
        Ok(Json(IdentityResponse::from(identity)))
    }

    /// Session tokens are stateless; the client discards its copy
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self, req: &Request, _auth: BearerAuth) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = helpers::authenticated_context(req, &self.authorization_provider)?;
        tracing::info!(request_id = %ctx.request_id, user_id = %ctx.actor_id(), "logout");
        Ok(Json(MessageResponse::new("Logged out successfully")))
    }
}
