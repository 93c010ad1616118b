use crate::errors::InternalError;
use crate::errors::internal::WorkflowError;
use crate::types::internal::ProposalStatus;
use crate::types::internal::proposal::ProposalContent;

/// Events that move a proposal between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Submit,
    OpenReview,
    ApproveAll,
    Reject,
    RequestRevision,
}

impl LifecycleEvent {
    /// Verb used in error messages
    pub fn action(&self) -> &'static str {
        match self {
            LifecycleEvent::Submit => "submit",
            LifecycleEvent::OpenReview => "open review on",
            LifecycleEvent::ApproveAll => "approve",
            LifecycleEvent::Reject => "reject",
            LifecycleEvent::RequestRevision => "request revision on",
        }
    }
}

/// The fixed six-state proposal lifecycle
///
/// ```text
/// draft ──submit──▶ submitted ──open review──▶ reviewing ──approve all──▶ approved
///   ▲                  ▲                          │ ├──reject──▶ rejected
///   │                  └──────submit───── revision ◀┘ request revision
/// ```
///
/// No event skips a state and nothing leaves `approved` or `rejected`.
pub struct ProposalLifecycle;

impl ProposalLifecycle {
    pub const DEFAULT_CURRENCY: &'static str = "IDR";

    pub fn next(current: ProposalStatus, event: LifecycleEvent) -> Result<ProposalStatus, WorkflowError> {
        use LifecycleEvent::*;
        use ProposalStatus::*;

        match (current, event) {
            (Draft | Revision, Submit) => Ok(Submitted),
            (Submitted, OpenReview) => Ok(Reviewing),
            (Reviewing, ApproveAll) => Ok(Approved),
            (Reviewing, Reject) => Ok(Rejected),
            (Reviewing, RequestRevision) => Ok(Revision),
            (status, event) => Err(WorkflowError::not_allowed(event.action(), status)),
        }
    }

    pub fn ensure_editable(current: ProposalStatus) -> Result<(), WorkflowError> {
        if current.is_editable() {
            Ok(())
        } else {
            Err(WorkflowError::not_allowed("edit", current))
        }
    }

    pub fn ensure_deletable(current: ProposalStatus) -> Result<(), WorkflowError> {
        if current.is_deletable() {
            Ok(())
        } else {
            Err(WorkflowError::not_allowed("delete", current))
        }
    }

    /// Normalize and check caller-supplied content
    pub fn validate_content(mut content: ProposalContent) -> Result<ProposalContent, InternalError> {
        content.title = content.title.trim().to_string();
        if content.title.is_empty() {
            return Err(WorkflowError::validation("title is required").into());
        }
        if !content.estimated_cost.is_finite() || content.estimated_cost < 0.0 {
            return Err(WorkflowError::validation("estimated cost must be a non-negative number").into());
        }

        content.currency = content.currency.trim().to_uppercase();
        if content.currency.is_empty() {
            content.currency = Self::DEFAULT_CURRENCY.to_string();
        }

        if let (Some(start), Some(end)) = (content.expected_start_date, content.expected_completion_date) {
            if end < start {
                return Err(WorkflowError::validation(
                    "expected completion date is before the expected start date",
                )
                .into());
            }
        }

        Ok(content)
    }
}
