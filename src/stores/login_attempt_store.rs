use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::errors::InternalError;
use crate::types::db::login_attempt;

/// A login attempt to be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoginAttempt {
    pub user_id: Option<String>,
    pub username: String,
    pub ip_address: String,
    pub user_agent: String,
    pub success: bool,
    pub fail_reason: Option<String>,
    pub login_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

/// Append-only store for login attempts
///
/// There is deliberately no update or delete operation.
pub struct LoginAttemptStore {
    db: DatabaseConnection,
}

impl LoginAttemptStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn record(&self, attempt: NewLoginAttempt) -> Result<login_attempt::Model, InternalError> {
        let model = login_attempt::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_id: Set(attempt.user_id),
            username: Set(attempt.username),
            ip_address: Set(attempt.ip_address),
            user_agent: Set(attempt.user_agent),
            success: Set(attempt.success),
            fail_reason: Set(attempt.fail_reason),
            login_at: Set(attempt.login_at),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("record_login_attempt", e))
    }

    /// Most recent attempts across all users
    pub async fn recent(&self, limit: u64) -> Result<Vec<login_attempt::Model>, InternalError> {
        login_attempt::Entity::find()
            .order_by_desc(login_attempt::Column::LoginAt)
            .order_by_desc(login_attempt::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("recent_login_attempts", e))
    }

    /// Most recent attempts for one username
    pub async fn for_username(&self, username: &str, limit: u64) -> Result<Vec<login_attempt::Model>, InternalError> {
        login_attempt::Entity::find()
            .filter(login_attempt::Column::Username.eq(username))
            .order_by_desc(login_attempt::Column::LoginAt)
            .order_by_desc(login_attempt::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("login_attempts_for_username", e))
    }

    pub async fn count_for_username(&self, username: &str) -> Result<u64, InternalError> {
        login_attempt::Entity::find()
            .filter(login_attempt::Column::Username.eq(username))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_login_attempts", e))
    }

    pub async fn stats(&self) -> Result<LoginStats, InternalError> {
        let total = login_attempt::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_login_attempts", e))?;
        let successful = login_attempt::Entity::find()
            .filter(login_attempt::Column::Success.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_successful_logins", e))?;

        Ok(LoginStats {
            total,
            successful,
            failed: total.saturating_sub(successful),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;

    fn attempt(username: &str, success: bool, at: i64) -> NewLoginAttempt {
        NewLoginAttempt {
            user_id: success.then(|| format!("id-{username}")),
            username: username.to_string(),
            ip_address: "10.1.2.3".to_string(),
            user_agent: "tests".to_string(),
            success,
            fail_reason: (!success).then(|| "Password salah".to_string()),
            login_at: at,
        }
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let store = LoginAttemptStore::new(setup_test_db().await);
        store.record(attempt("alice", false, 10)).await.unwrap();
        store.record(attempt("alice", true, 20)).await.unwrap();
        store.record(attempt("bob", false, 20)).await.unwrap();

        let recent = store.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].username, "bob");
        assert_eq!(recent[1].login_at, 20);
    }

    #[tokio::test]
    async fn test_for_username_and_stats() {
        let store = LoginAttemptStore::new(setup_test_db().await);
        store.record(attempt("alice", false, 10)).await.unwrap();
        store.record(attempt("alice", true, 20)).await.unwrap();
        store.record(attempt("bob", false, 30)).await.unwrap();

        let alice = store.for_username("alice", 50).await.unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice[0].success);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats, LoginStats { total: 3, successful: 1, failed: 2 });
    }

    #[tokio::test]
    async fn test_failed_attempt_for_unknown_user_is_kept() {
        let store = LoginAttemptStore::new(setup_test_db().await);
        let saved = store.record(attempt("ghost", false, 5)).await.unwrap();
        assert!(saved.user_id.is_none());
        assert_eq!(store.count_for_username("ghost").await.unwrap(), 1);
    }
}
