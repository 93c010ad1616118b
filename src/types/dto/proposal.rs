use chrono::NaiveDate;
use poem_openapi::{Enum, Object};

use crate::types::db::{approval, attachment, comment, proposal};
use crate::types::dto::user::UserSummary;
use crate::types::internal::proposal::{
    NewAttachment, ProposalContent, ProposalDetails, ProposalSummary, ReviewDecision,
};
use crate::types::internal::{ApprovalStatus, ProposalStatus, UserRole};

/// Request model for creating or replacing proposal content
#[derive(Object, Debug, Clone)]
pub struct ProposalRequest {
    pub title: String,
    #[oai(default)]
    pub description: String,
    #[oai(default)]
    pub investment_type: String,
    pub estimated_cost: f64,
    /// ISO currency code; defaults to IDR
    pub currency: Option<String>,
    pub expected_start_date: Option<NaiveDate>,
    pub expected_completion_date: Option<NaiveDate>,
    #[oai(default)]
    pub justification: String,
    #[oai(default)]
    pub expected_benefit: String,
    #[oai(default)]
    pub risk_analysis: String,
}

impl From<ProposalRequest> for ProposalContent {
    fn from(req: ProposalRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            investment_type: req.investment_type,
            estimated_cost: req.estimated_cost,
            currency: req.currency.unwrap_or_default(),
            expected_start_date: req.expected_start_date,
            expected_completion_date: req.expected_completion_date,
            justification: req.justification,
            expected_benefit: req.expected_benefit,
            risk_analysis: req.risk_analysis,
        }
    }
}

#[derive(Object, Debug)]
pub struct ProposalResponse {
    pub id: i64,
    pub proposal_number: String,
    pub title: String,
    pub description: String,
    pub investment_type: String,
    pub estimated_cost: f64,
    pub currency: String,
    pub proposal_date: i64,
    pub expected_start_date: Option<NaiveDate>,
    pub expected_completion_date: Option<NaiveDate>,
    pub justification: String,
    pub expected_benefit: String,
    pub risk_analysis: String,
    pub status: ProposalStatus,
    pub department: String,
    pub submitted_by: Option<UserSummary>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProposalResponse {
    fn build(model: proposal::Model, submitter: Option<crate::types::db::user::Model>) -> Self {
        Self {
            id: model.id,
            proposal_number: model.proposal_number,
            title: model.title,
            description: model.description,
            investment_type: model.investment_type,
            estimated_cost: model.estimated_cost,
            currency: model.currency,
            proposal_date: model.proposal_date,
            expected_start_date: model.expected_start_date,
            expected_completion_date: model.expected_completion_date,
            justification: model.justification,
            expected_benefit: model.expected_benefit,
            risk_analysis: model.risk_analysis,
            status: model.status,
            department: model.department,
            submitted_by: submitter.map(UserSummary::from),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ProposalSummary> for ProposalResponse {
    fn from(summary: ProposalSummary) -> Self {
        Self::build(summary.proposal, summary.submitter)
    }
}

#[derive(Object, Debug)]
pub struct AttachmentResponse {
    pub id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by_id: String,
    pub created_at: i64,
}

impl From<attachment::Model> for AttachmentResponse {
    fn from(model: attachment::Model) -> Self {
        Self {
            id: model.id,
            file_name: model.file_name,
            file_path: model.file_path,
            file_size: model.file_size,
            file_type: model.file_type,
            uploaded_by_id: model.uploaded_by_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct ApprovalResponse {
    pub id: i64,
    pub approver: Option<UserSummary>,
    pub approver_id: String,
    pub approver_role: UserRole,
    pub status: ApprovalStatus,
    pub comments: Option<String>,
    pub decided_at: Option<i64>,
}

impl From<(approval::Model, Option<crate::types::db::user::Model>)> for ApprovalResponse {
    fn from((model, approver): (approval::Model, Option<crate::types::db::user::Model>)) -> Self {
        Self {
            id: model.id,
            approver: approver.map(UserSummary::from),
            approver_id: model.approver_id,
            approver_role: model.approver_role,
            status: model.status,
            comments: model.comments,
            decided_at: model.decided_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub author: Option<UserSummary>,
    pub user_id: String,
    pub created_at: i64,
}

impl From<(comment::Model, Option<crate::types::db::user::Model>)> for CommentResponse {
    fn from((model, author): (comment::Model, Option<crate::types::db::user::Model>)) -> Self {
        Self {
            id: model.id,
            content: model.content,
            author: author.map(UserSummary::from),
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct ProposalDetailResponse {
    pub proposal: ProposalResponse,
    pub attachments: Vec<AttachmentResponse>,
    pub approvals: Vec<ApprovalResponse>,
    pub comments: Vec<CommentResponse>,
}

impl From<ProposalDetails> for ProposalDetailResponse {
    fn from(details: ProposalDetails) -> Self {
        Self {
            proposal: ProposalResponse::build(details.proposal, details.submitter),
            attachments: details.attachments.into_iter().map(Into::into).collect(),
            approvals: details.approvals.into_iter().map(Into::into).collect(),
            comments: details.comments.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Object, Debug)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Object, Debug)]
pub struct AttachmentRequest {
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    #[oai(default)]
    pub file_type: String,
}

impl From<AttachmentRequest> for NewAttachment {
    fn from(req: AttachmentRequest) -> Self {
        Self {
            file_name: req.file_name,
            file_path: req.file_path,
            file_size: req.file_size,
            file_type: req.file_type,
        }
    }
}

/// Request model for opening a review round (admin)
#[derive(Object, Debug)]
pub struct OpenReviewRequest {
    /// User ids of the approvers; empty selects every active director, CEO and CFO
    #[oai(default)]
    pub approver_ids: Vec<String>,
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
#[oai(rename_all = "snake_case")]
pub enum DecisionKind {
    Approve,
    Reject,
    RequestRevision,
}

impl From<DecisionKind> for ReviewDecision {
    fn from(kind: DecisionKind) -> Self {
        match kind {
            DecisionKind::Approve => ReviewDecision::Approve,
            DecisionKind::Reject => ReviewDecision::Reject,
            DecisionKind::RequestRevision => ReviewDecision::RequestRevision,
        }
    }
}

#[derive(Object, Debug)]
pub struct DecisionRequest {
    pub decision: DecisionKind,
    pub comments: Option<String>,
}
