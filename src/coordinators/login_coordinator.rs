use std::sync::Arc;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::providers::{AuthenticationProvider, AuthorizationProvider, Clock, TokenProvider};
use crate::stores::{LoginAttemptStore, NewLoginAttempt, UserStore};
use crate::types::internal::{AuthenticatedIdentity, IssuedToken, RequestContext};

/// Login and profile workflows
///
/// Every login attempt is written to the login audit before the result is
/// returned, whatever stage failed.
pub struct LoginCoordinator {
    authentication_provider: Arc<AuthenticationProvider>,
    token_provider: Arc<TokenProvider>,
    login_attempt_store: Arc<LoginAttemptStore>,
    user_store: Arc<UserStore>,
    clock: Arc<dyn Clock>,
}

impl LoginCoordinator {
    /// Create LoginCoordinator from AppData
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            authentication_provider: Arc::clone(&app_data.authentication_provider),
            token_provider: Arc::clone(&app_data.token_provider),
            login_attempt_store: Arc::clone(&app_data.login_attempt_store),
            user_store: Arc::clone(&app_data.user_store),
            clock: Arc::clone(&app_data.clock),
        }
    }

    /// Orchestrate a login
    ///
    /// 1. Resolve the identity (directory or local password)
    /// 2. Issue a session token
    /// 3. Stamp the account's last login
    /// 4. Record exactly one login attempt for the outcome
    pub async fn login(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
    ) -> Result<(IssuedToken, AuthenticatedIdentity), InternalError> {
        let result = match self.authentication_provider.resolve(username, password).await {
            Ok(identity) => self.complete_login(identity).await,
            Err(e) => Err(e),
        };

        let attempt = NewLoginAttempt {
            user_id: result.as_ref().ok().map(|(_, identity)| identity.user_id.clone()),
            username: username.to_string(),
            ip_address: ctx.client.ip_string(),
            user_agent: ctx.client.user_agent_string(),
            success: result.is_ok(),
            fail_reason: result.as_ref().err().map(|e| e.login_audit_reason().to_string()),
            login_at: self.clock.unix_now(),
        };
        self.record_attempt(ctx, attempt).await;

        match &result {
            Ok((_, identity)) => {
                tracing::info!(request_id = %ctx.request_id, user_id = %identity.user_id, "login succeeded");
            }
            Err(InternalError::Login(e)) => {
                tracing::warn!(request_id = %ctx.request_id, username, reason = e.audit_reason(), error = %e, "login rejected");
            }
            Err(e) => {
                tracing::error!(request_id = %ctx.request_id, username, error = %e, "login failed");
            }
        }

        result
    }

    async fn complete_login(
        &self,
        identity: AuthenticatedIdentity,
    ) -> Result<(IssuedToken, AuthenticatedIdentity), InternalError> {
        let token = self.token_provider.issue(&identity)?;
        let stamped = self
            .user_store
            .touch_last_login(&identity.user_id, self.clock.unix_now())
            .await?;
        Ok((token, AuthenticatedIdentity::from(&stamped)))
    }

    /// Write the audit row on its own task so a dropped request cannot cancel it
    async fn record_attempt(&self, ctx: &RequestContext, attempt: NewLoginAttempt) {
        let store = Arc::clone(&self.login_attempt_store);
        let handle = tokio::spawn(async move { store.record(attempt).await.map(|_| ()) });

        let outcome: Result<(), InternalError> = handle
            .await
            .map_err(|e| InternalError::from(AuditError::LogWriteFailed(format!("audit task did not complete: {e}"))))
            .and_then(|written| written);

        if let Err(e) = outcome {
            tracing::error!(request_id = %ctx.request_id, error = %e, "failed to write login audit record");
        }
    }

    /// Current stored profile of the authenticated caller
    pub async fn profile(&self, ctx: &RequestContext) -> Result<AuthenticatedIdentity, InternalError> {
        let caller = AuthorizationProvider::require_caller(ctx, "read profile")?;
        let record = self.user_store.get(&caller.user_id).await?;
        Ok(AuthenticatedIdentity::from(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{FakeDirectory, TEST_START, TestContext};
    use crate::types::internal::{ClientMeta, UserRole};

    fn api_ctx() -> RequestContext {
        RequestContext::for_api(ClientMeta {
            ip_address: Some("10.0.0.7".parse().unwrap()),
            user_agent: Some("unit-test".to_string()),
        })
    }

    #[tokio::test]
    async fn test_successful_login_is_audited_with_user() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let alice = ctx.local_user("alice", "secret1", UserRole::CorpFa).await;
        let coordinator = LoginCoordinator::new(Arc::clone(&ctx.app_data));

        let (token, identity) = coordinator.login(&api_ctx(), "alice", "secret1").await.unwrap();
        assert_eq!(identity.user_id, alice.id);
        assert!(!token.token.is_empty());

        let rows = ctx.app_data.login_attempt_store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].success);
        assert_eq!(rows[0].user_id.as_deref(), Some(alice.id.as_str()));
        assert_eq!(rows[0].ip_address, "10.0.0.7");
        assert_eq!(rows[0].user_agent, "unit-test");
    }

    #[tokio::test]
    async fn test_unknown_user_is_audited_without_user() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let coordinator = LoginCoordinator::new(Arc::clone(&ctx.app_data));

        assert!(coordinator.login(&api_ctx(), "mallory", "x").await.is_err());

        let rows = ctx.app_data.login_attempt_store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].success);
        assert_eq!(rows[0].user_id, None);
        assert_eq!(rows[0].fail_reason.as_deref(), Some("User tidak terdaftar dalam sistem"));
    }

    #[tokio::test]
    async fn test_last_login_is_stamped_after_token_issue() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let alice = ctx.local_user("alice", "secret1", UserRole::CorpFa).await;
        let coordinator = LoginCoordinator::new(Arc::clone(&ctx.app_data));

        let (_, identity) = coordinator.login(&api_ctx(), "alice", "secret1").await.unwrap();
        assert_eq!(identity.last_login_at, Some(TEST_START));

        // A lifetime the token provider cannot represent makes issuing fail
        ctx.app_data.config.update(|config| config.token.expiry_hours = i64::MAX / 1000);
        ctx.clock.advance(chrono::Duration::hours(1));
        let err = coordinator.login(&api_ctx(), "alice", "secret1").await.unwrap_err();
        assert!(matches!(err, InternalError::Crypto { .. }));

        let stored = ctx.app_data.user_store.get(&alice.id).await.unwrap();
        assert_eq!(stored.last_login_at, Some(TEST_START));
        let rows = ctx.app_data.login_attempt_store.recent(10).await.unwrap();
        let failed = rows.iter().find(|r| !r.success).unwrap();
        assert_eq!(failed.fail_reason.as_deref(), Some("Kesalahan sistem"));
    }

    #[tokio::test]
    async fn test_profile_requires_caller() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let coordinator = LoginCoordinator::new(Arc::clone(&ctx.app_data));
        assert!(coordinator.profile(&api_ctx()).await.is_err());
    }
}
