use poem_openapi::Object;

use crate::types::db::login_attempt;

#[derive(Object, Debug)]
pub struct LoginAttemptResponse {
    pub id: i64,
    pub user_id: Option<String>,
    pub username: String,
    /// Display name of the matching account, when there is one
    pub full_name: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
    pub success: bool,
    pub fail_reason: Option<String>,
    pub login_at: i64,
}

impl LoginAttemptResponse {
    pub fn new(model: login_attempt::Model, full_name: Option<String>) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            username: model.username,
            full_name,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            success: model.success,
            fail_reason: model.fail_reason,
            login_at: model.login_at,
        }
    }
}

#[derive(Object, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginStatsResponse {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}
