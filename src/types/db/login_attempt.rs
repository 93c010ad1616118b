use sea_orm::entity::prelude::*;

/// One row per login attempt. Rows are only ever inserted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "login_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<String>,
    pub username: String,
    pub ip_address: String,
    pub user_agent: String,
    pub success: bool,
    pub fail_reason: Option<String>,
    pub login_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
