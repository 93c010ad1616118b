use sea_orm::entity::prelude::*;

use crate::types::internal::proposal_status::ProposalStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "investment_proposals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub proposal_number: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub investment_type: String,
    pub estimated_cost: f64,
    pub currency: String,
    pub proposal_date: i64,
    pub expected_start_date: Option<Date>,
    pub expected_completion_date: Option<Date>,
    #[sea_orm(column_type = "Text")]
    pub justification: String,
    #[sea_orm(column_type = "Text")]
    pub expected_benefit: String,
    #[sea_orm(column_type = "Text")]
    pub risk_analysis: String,
    pub status: ProposalStatus,
    pub submitted_by_id: String,
    pub department: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::approval::Entity")]
    Approvals,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::approval::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
