use chrono::NaiveDate;

use crate::types::db::{approval, attachment, comment, proposal, user};
use crate::types::internal::proposal_status::ApprovalStatus;

/// Caller-supplied proposal content, used for both creation and edits.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalContent {
    pub title: String,
    pub description: String,
    pub investment_type: String,
    pub estimated_cost: f64,
    pub currency: String,
    pub expected_start_date: Option<NaiveDate>,
    pub expected_completion_date: Option<NaiveDate>,
    pub justification: String,
    pub expected_benefit: String,
    pub risk_analysis: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
}

/// Approver decision on a reviewing proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
    RequestRevision,
}

impl ReviewDecision {
    pub fn approval_status(&self) -> ApprovalStatus {
        match self {
            ReviewDecision::Approve => ApprovalStatus::Approved,
            ReviewDecision::Reject => ApprovalStatus::Rejected,
            ReviewDecision::RequestRevision => ApprovalStatus::Revision,
        }
    }
}

/// Filter for proposal listings. `owner_id` is forced by the coordinator
/// for callers without cross-owner read access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalFilter {
    pub owner_id: Option<String>,
    pub status: Option<crate::types::internal::ProposalStatus>,
}

/// A proposal with its owner resolved.
#[derive(Debug, Clone)]
pub struct ProposalSummary {
    pub proposal: proposal::Model,
    pub submitter: Option<user::Model>,
}

/// A proposal with all of its child records and the users they reference.
#[derive(Debug, Clone)]
pub struct ProposalDetails {
    pub proposal: proposal::Model,
    pub submitter: Option<user::Model>,
    pub attachments: Vec<attachment::Model>,
    pub approvals: Vec<(approval::Model, Option<user::Model>)>,
    pub comments: Vec<(comment::Model, Option<user::Model>)>,
}
