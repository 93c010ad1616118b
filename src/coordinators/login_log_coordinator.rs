use std::collections::HashMap;
use std::sync::Arc;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::providers::AuthorizationProvider;
use crate::providers::authorization_provider::ADMIN_ONLY;
use crate::stores::{LoginAttemptStore, LoginStats, UserStore};
use crate::types::db::login_attempt;
use crate::types::internal::RequestContext;

pub const RECENT_LIMIT: u64 = 100;
pub const USER_HISTORY_LIMIT: u64 = 50;

/// Read side of the login audit. Admin only, no side effects.
pub struct LoginLogCoordinator {
    login_attempt_store: Arc<LoginAttemptStore>,
    user_store: Arc<UserStore>,
    authorization_provider: Arc<AuthorizationProvider>,
}

impl LoginLogCoordinator {
    /// Create LoginLogCoordinator from AppData
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            login_attempt_store: Arc::clone(&app_data.login_attempt_store),
            user_store: Arc::clone(&app_data.user_store),
            authorization_provider: Arc::clone(&app_data.authorization_provider),
        }
    }

    /// Most recent attempts, each paired with the account's display name when known
    pub async fn recent(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<(login_attempt::Model, Option<String>)>, InternalError> {
        self.authorization_provider
            .require_active_role(ctx, ADMIN_ONLY, "read login logs")
            .await?;
        let attempts = self.login_attempt_store.recent(RECENT_LIMIT).await?;
        self.with_names(attempts).await
    }

    pub async fn for_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<Vec<(login_attempt::Model, Option<String>)>, InternalError> {
        self.authorization_provider
            .require_active_role(ctx, ADMIN_ONLY, "read login logs")
            .await?;
        let attempts = self.login_attempt_store.for_username(username, USER_HISTORY_LIMIT).await?;
        self.with_names(attempts).await
    }

    pub async fn stats(&self, ctx: &RequestContext) -> Result<LoginStats, InternalError> {
        self.authorization_provider
            .require_active_role(ctx, ADMIN_ONLY, "read login stats")
            .await?;
        self.login_attempt_store.stats().await
    }

    async fn with_names(
        &self,
        attempts: Vec<login_attempt::Model>,
    ) -> Result<Vec<(login_attempt::Model, Option<String>)>, InternalError> {
        let mut usernames: Vec<String> = attempts.iter().map(|a| a.username.clone()).collect();
        usernames.sort();
        usernames.dedup();

        let names: HashMap<String, String> = self
            .user_store
            .find_by_usernames(&usernames)
            .await?
            .into_iter()
            .map(|u| (u.username, u.full_name))
            .collect();

        Ok(attempts
            .into_iter()
            .map(|a| {
                let name = names.get(&a.username).cloned();
                (a, name)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinators::LoginCoordinator;
    use crate::errors::internal::AccessError;
    use crate::test::utils::{FakeDirectory, TEST_START, TestContext};
    use crate::types::internal::{Caller, ClientMeta, UserRole};

    #[tokio::test]
    async fn test_logs_are_named_and_counted() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let admin = ctx.local_user("root", "password1", UserRole::Admin).await;
        ctx.local_user("alice", "secret1", UserRole::CorpFa).await;

        let login = LoginCoordinator::new(Arc::clone(&ctx.app_data));
        let anon = RequestContext::for_api(ClientMeta::default());
        login.login(&anon, "alice", "secret1").await.unwrap();
        login.login(&anon, "alice", "nope").await.unwrap_err();
        login.login(&anon, "ghost", "nope").await.unwrap_err();

        let admin_ctx = RequestContext::for_api(ClientMeta::default()).with_caller(Caller {
            user_id: admin.id.clone(),
            username: admin.username.clone(),
            full_name: admin.full_name.clone(),
            role: UserRole::Admin,
        });
        let logs = LoginLogCoordinator::new(Arc::clone(&ctx.app_data));

        let recent = logs.recent(&admin_ctx).await.unwrap();
        assert_eq!(recent.len(), 3);
        let ghost = recent.iter().find(|(a, _)| a.username == "ghost").unwrap();
        assert_eq!(ghost.1, None);
        let alice = recent.iter().find(|(a, _)| a.username == "alice").unwrap();
        assert_eq!(alice.1.as_deref(), Some("alice"));

        assert_eq!(logs.for_username(&admin_ctx, "alice").await.unwrap().len(), 2);
        let stats = logs.stats(&admin_ctx).await.unwrap();
        assert_eq!(stats, LoginStats { total: 3, successful: 1, failed: 2 });

        assert!(logs.stats(&anon).await.is_err());
    }

    #[tokio::test]
    async fn test_deactivated_admin_cannot_read_logs() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let admin = ctx.local_user("root", "password1", UserRole::Admin).await;
        let admin_ctx = RequestContext::for_api(ClientMeta::default()).with_caller(Caller {
            user_id: admin.id.clone(),
            username: admin.username.clone(),
            full_name: admin.full_name.clone(),
            role: UserRole::Admin,
        });
        let logs = LoginLogCoordinator::new(Arc::clone(&ctx.app_data));
        assert!(logs.recent(&admin_ctx).await.is_ok());

        ctx.app_data.user_store.toggle_active(&admin.id, TEST_START + 1).await.unwrap();

        for err in [
            logs.recent(&admin_ctx).await.map(|_| ()).unwrap_err(),
            logs.for_username(&admin_ctx, "root").await.map(|_| ()).unwrap_err(),
            logs.stats(&admin_ctx).await.map(|_| ()).unwrap_err(),
        ] {
            assert!(matches!(err, InternalError::Access(AccessError::InactiveCaller { .. })));
        }
    }
}
