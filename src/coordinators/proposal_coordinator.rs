use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::{AccessError, WorkflowError};
use crate::providers::authorization_provider::{ADMIN_ONLY, PROPOSAL_DELETE_OVERRIDE, PROPOSAL_VIEW_ALL};
use crate::providers::{AuthorizationProvider, Clock, LifecycleEvent, ProposalLifecycle};
use crate::stores::{ProposalStore, UserStore};
use crate::types::db::{attachment, comment, proposal, user};
use crate::types::internal::proposal::{
    NewAttachment, ProposalContent, ProposalDetails, ProposalFilter, ProposalSummary, ReviewDecision,
};
use crate::types::internal::{ApprovalStatus, Caller, ProposalStatus, RequestContext, UserRole};

/// Investment proposal workflows
///
/// Order of checks for every mutation: caller present and active, proposal
/// exists, ownership or role, then lifecycle state. Status changes are
/// compare-and-swap against the status read at the start.
pub struct ProposalCoordinator {
    proposal_store: Arc<ProposalStore>,
    user_store: Arc<UserStore>,
    authorization_provider: Arc<AuthorizationProvider>,
    clock: Arc<dyn Clock>,
}

fn resource(id: i64) -> String {
    format!("proposal {id}")
}

impl ProposalCoordinator {
    /// Create ProposalCoordinator from AppData
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            proposal_store: Arc::clone(&app_data.proposal_store),
            user_store: Arc::clone(&app_data.user_store),
            authorization_provider: Arc::clone(&app_data.authorization_provider),
            clock: Arc::clone(&app_data.clock),
        }
    }

    /// `INV-<YYYYMM>-<unix seconds><4 random digits>`
    fn proposal_number(&self) -> String {
        let now = self.clock.now();
        let suffix: u32 = rand::rng().random_range(0..10_000);
        format!("INV-{}-{}{:04}", now.format("%Y%m"), now.timestamp(), suffix)
    }

    async fn active_caller<'a>(&self, ctx: &'a RequestContext, action: &str) -> Result<&'a Caller, InternalError> {
        self.authorization_provider.require_active_caller(ctx, action).await
    }

    /// Owner, cross-owner reader, or an approver holding an approval on it
    async fn ensure_readable(&self, caller: &Caller, proposal: &proposal::Model) -> Result<(), InternalError> {
        if caller.user_id == proposal.submitted_by_id || PROPOSAL_VIEW_ALL.contains(&caller.role) {
            return Ok(());
        }

        let approvals = self.proposal_store.list_approvals_for(proposal.id).await?;
        if approvals.iter().any(|a| a.approver_id == caller.user_id) {
            return Ok(());
        }

        Err(AccessError::forbidden_ownership(&caller.user_id, resource(proposal.id)).into())
    }

    /// Why a decision did not apply: missing proposal, wrong state, no
    /// approval for the caller, or one already recorded
    async fn decision_refused(&self, caller: &Caller, id: i64) -> InternalError {
        let current = match self.proposal_store.get(id).await {
            Ok(current) => current,
            Err(e) => return e,
        };
        if current.status != ProposalStatus::Reviewing {
            return WorkflowError::not_allowed("decide on", current.status).into();
        }

        let approvals = match self.proposal_store.list_approvals_for(id).await {
            Ok(approvals) => approvals,
            Err(e) => return e,
        };
        if approvals.iter().any(|a| a.approver_id == caller.user_id) {
            WorkflowError::conflict(format!("decision on {} already recorded", resource(id))).into()
        } else {
            AccessError::forbidden_ownership(&caller.user_id, format!("approval on {}", resource(id))).into()
        }
    }

    async fn summarize(&self, proposal: proposal::Model) -> Result<ProposalSummary, InternalError> {
        let submitter = self.user_store.find_by_id(&proposal.submitted_by_id).await?;
        Ok(ProposalSummary { proposal, submitter })
    }

    async fn users_by_id(&self, ids: Vec<String>) -> Result<HashMap<String, user::Model>, InternalError> {
        let mut ids = ids;
        ids.sort();
        ids.dedup();
        Ok(self
            .user_store
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }

    async fn load_details(&self, proposal: proposal::Model) -> Result<ProposalDetails, InternalError> {
        let attachments = self.proposal_store.list_attachments(proposal.id).await?;
        let approvals = self.proposal_store.list_approvals_for(proposal.id).await?;
        let comments = self.proposal_store.list_comments(proposal.id).await?;

        let mut ids: Vec<String> = approvals.iter().map(|a| a.approver_id.clone()).collect();
        ids.extend(comments.iter().map(|c| c.user_id.clone()));
        ids.push(proposal.submitted_by_id.clone());
        let users = self.users_by_id(ids).await?;

        Ok(ProposalDetails {
            submitter: users.get(&proposal.submitted_by_id).cloned(),
            attachments,
            approvals: approvals
                .into_iter()
                .map(|a| {
                    let approver = users.get(&a.approver_id).cloned();
                    (a, approver)
                })
                .collect(),
            comments: comments
                .into_iter()
                .map(|c| {
                    let author = users.get(&c.user_id).cloned();
                    (c, author)
                })
                .collect(),
            proposal,
        })
    }

    /// Create a draft owned by the caller
    pub async fn create(&self, ctx: &RequestContext, content: ProposalContent) -> Result<ProposalSummary, InternalError> {
        let caller = self.active_caller(ctx, "create proposal").await?;
        let content = ProposalLifecycle::validate_content(content)?;
        let owner = self.user_store.get(&caller.user_id).await?;

        let created = self
            .proposal_store
            .insert(self.proposal_number(), content, &owner.id, &owner.department, self.clock.unix_now())
            .await?;

        tracing::info!(
            request_id = %ctx.request_id,
            proposal_id = created.id,
            number = %created.proposal_number,
            "proposal created"
        );
        Ok(ProposalSummary { proposal: created, submitter: Some(owner) })
    }

    /// Every proposal for cross-owner readers, the caller's own otherwise
    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<ProposalStatus>,
    ) -> Result<Vec<ProposalSummary>, InternalError> {
        let caller = self.active_caller(ctx, "list proposals").await?;
        let filter = ProposalFilter {
            owner_id: (!PROPOSAL_VIEW_ALL.contains(&caller.role)).then(|| caller.user_id.clone()),
            status,
        };

        let proposals = self.proposal_store.list(&filter).await?;
        let users = self
            .users_by_id(proposals.iter().map(|p| p.submitted_by_id.clone()).collect())
            .await?;

        Ok(proposals
            .into_iter()
            .map(|proposal| ProposalSummary {
                submitter: users.get(&proposal.submitted_by_id).cloned(),
                proposal,
            })
            .collect())
    }

    pub async fn get(&self, ctx: &RequestContext, id: i64) -> Result<ProposalDetails, InternalError> {
        let caller = self.active_caller(ctx, "read proposal").await?;
        let proposal = self.proposal_store.get(id).await?;
        self.ensure_readable(caller, &proposal).await?;
        self.load_details(proposal).await
    }

    /// Replace the content of an editable proposal. Owner only.
    pub async fn mutate(
        &self,
        ctx: &RequestContext,
        id: i64,
        content: ProposalContent,
    ) -> Result<ProposalSummary, InternalError> {
        let caller = self.active_caller(ctx, "edit proposal").await?;
        let current = self.proposal_store.get(id).await?;
        AuthorizationProvider::require_owner(caller, &current.submitted_by_id, &[], &resource(id))?;
        ProposalLifecycle::ensure_editable(current.status)?;
        let content = ProposalLifecycle::validate_content(content)?;

        if !self
            .proposal_store
            .update_content_if(id, current.status, content, self.clock.unix_now())
            .await?
        {
            return Err(WorkflowError::stale("edit").into());
        }

        tracing::info!(request_id = %ctx.request_id, proposal_id = id, "proposal updated");
        let updated = self.proposal_store.get(id).await?;
        self.summarize(updated).await
    }

    /// draft | revision → submitted. Owner only.
    pub async fn submit(&self, ctx: &RequestContext, id: i64) -> Result<ProposalSummary, InternalError> {
        let caller = self.active_caller(ctx, "submit proposal").await?;
        let current = self.proposal_store.get(id).await?;
        AuthorizationProvider::require_owner(caller, &current.submitted_by_id, &[], &resource(id))?;

        let next = ProposalLifecycle::next(current.status, LifecycleEvent::Submit)?;
        if !self
            .proposal_store
            .transition(id, current.status, next, self.clock.unix_now())
            .await?
        {
            return Err(WorkflowError::stale("submit").into());
        }

        tracing::info!(request_id = %ctx.request_id, proposal_id = id, from = %current.status, to = %next, "proposal submitted");
        let updated = self.proposal_store.get(id).await?;
        self.summarize(updated).await
    }

    /// Soft-delete a draft. Owner or administrator.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), InternalError> {
        let caller = self.active_caller(ctx, "delete proposal").await?;
        let current = self.proposal_store.get(id).await?;
        AuthorizationProvider::require_owner(caller, &current.submitted_by_id, PROPOSAL_DELETE_OVERRIDE, &resource(id))?;
        ProposalLifecycle::ensure_deletable(current.status)?;

        if !self.proposal_store.soft_delete_if_draft(id, self.clock.unix_now()).await? {
            return Err(WorkflowError::stale("delete").into());
        }

        tracing::info!(request_id = %ctx.request_id, proposal_id = id, actor = %caller.user_id, "proposal deleted");
        Ok(())
    }

    /// Anyone who may read the proposal may comment on it
    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        id: i64,
        content: &str,
    ) -> Result<(comment::Model, Option<user::Model>), InternalError> {
        let caller = self.active_caller(ctx, "comment on proposal").await?;
        let content = content.trim();
        if content.is_empty() {
            return Err(WorkflowError::validation("comment must not be empty").into());
        }

        let proposal = self.proposal_store.get(id).await?;
        self.ensure_readable(caller, &proposal).await?;

        let created = self
            .proposal_store
            .add_comment_to(id, &caller.user_id, content, self.clock.unix_now())
            .await?;
        let author = self.user_store.find_by_id(&caller.user_id).await?;
        Ok((created, author))
    }

    /// Record a file reference. Owner only, while editable.
    pub async fn add_attachment(
        &self,
        ctx: &RequestContext,
        id: i64,
        file: NewAttachment,
    ) -> Result<attachment::Model, InternalError> {
        let caller = self.active_caller(ctx, "attach to proposal").await?;
        let proposal = self.proposal_store.get(id).await?;
        AuthorizationProvider::require_owner(caller, &proposal.submitted_by_id, &[], &resource(id))?;
        ProposalLifecycle::ensure_editable(proposal.status)?;

        if file.file_name.trim().is_empty() || file.file_path.trim().is_empty() {
            return Err(WorkflowError::validation("file name and path are required").into());
        }
        if file.file_size < 0 {
            return Err(WorkflowError::validation("file size must not be negative").into());
        }

        self.proposal_store
            .add_attachment(id, &caller.user_id, file, self.clock.unix_now())
            .await
    }

    /// submitted → reviewing, with one pending approval per active approver.
    ///
    /// `approver_ids` narrows the round to specific approvers; empty means
    /// every active user holding an approver role.
    pub async fn open_review(
        &self,
        ctx: &RequestContext,
        id: i64,
        approver_ids: &[String],
    ) -> Result<ProposalDetails, InternalError> {
        self.authorization_provider
            .require_active_role(ctx, ADMIN_ONLY, "open review")
            .await?;

        let candidates = self
            .user_store
            .list_active_by_roles(&[UserRole::Director, UserRole::Ceo, UserRole::Cfo])
            .await?;
        let approvers: Vec<(String, UserRole)> = if approver_ids.is_empty() {
            candidates.iter().map(|u| (u.id.clone(), u.role)).collect()
        } else {
            let mut picked = Vec::new();
            for wanted in approver_ids {
                let Some(found) = candidates.iter().find(|u| &u.id == wanted) else {
                    return Err(WorkflowError::validation(format!("{wanted} is not an active approver")).into());
                };
                if !picked.iter().any(|(id, _): &(String, UserRole)| id == &found.id) {
                    picked.push((found.id.clone(), found.role));
                }
            }
            picked
        };
        if approvers.is_empty() {
            return Err(WorkflowError::validation("no active approvers to review the proposal").into());
        }

        let now = self.clock.unix_now();
        let txn = self.proposal_store.begin().await?;
        let current = self.proposal_store.get_in(&txn, id).await?;
        let next = ProposalLifecycle::next(current.status, LifecycleEvent::OpenReview)?;

        if !self.proposal_store.transition_if(&txn, id, current.status, next, now).await? {
            return Err(WorkflowError::stale("open review on").into());
        }
        self.proposal_store.clear_approvals(&txn, id).await?;
        self.proposal_store.create_approvals(&txn, id, &approvers, now).await?;
        ProposalStore::commit(txn).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            proposal_id = id,
            approvers = approvers.len(),
            "proposal review opened"
        );
        let updated = self.proposal_store.get(id).await?;
        self.load_details(updated).await
    }

    /// Record the caller's decision on a reviewing proposal
    ///
    /// Approve moves the proposal to approved once every approval is approved.
    /// Reject ends it. A revision request needs a comment, closes the round and
    /// hands the proposal back to its owner.
    pub async fn record_decision(
        &self,
        ctx: &RequestContext,
        id: i64,
        decision: ReviewDecision,
        comments: Option<String>,
    ) -> Result<ProposalDetails, InternalError> {
        let caller = self.active_caller(ctx, "decide on proposal").await?;
        let comments = comments.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        if decision == ReviewDecision::RequestRevision && comments.is_none() {
            return Err(WorkflowError::validation("a revision request needs a comment").into());
        }

        let now = self.clock.unix_now();
        let txn = self.proposal_store.begin().await?;
        let decided = self
            .proposal_store
            .decide_if_pending(&txn, id, &caller.user_id, decision.approval_status(), comments.clone(), now)
            .await?;
        if !decided {
            ProposalStore::rollback(txn).await?;
            return Err(self.decision_refused(caller, id).await);
        }

        let event = match decision {
            ReviewDecision::Approve => {
                // Re-read under the write lock so concurrent approvals are visible
                let approvals = self.proposal_store.list_approvals(&txn, id).await?;
                let all_approved = approvals.iter().all(|a| a.status == ApprovalStatus::Approved);
                all_approved.then_some(LifecycleEvent::ApproveAll)
            }
            ReviewDecision::Reject => Some(LifecycleEvent::Reject),
            ReviewDecision::RequestRevision => {
                let note = comments.as_deref().unwrap_or_default();
                self.proposal_store.add_comment(&txn, id, &caller.user_id, note, now).await?;
                self.proposal_store.clear_approvals(&txn, id).await?;
                Some(LifecycleEvent::RequestRevision)
            }
        };

        if let Some(event) = event {
            let from = ProposalStatus::Reviewing;
            let next = ProposalLifecycle::next(from, event)?;
            if !self.proposal_store.transition_if(&txn, id, from, next, now).await? {
                return Err(WorkflowError::stale(event.action()).into());
            }
            tracing::info!(request_id = %ctx.request_id, proposal_id = id, from = %from, to = %next, "proposal review concluded");
        }
        ProposalStore::commit(txn).await?;

        tracing::info!(request_id = %ctx.request_id, proposal_id = id, approver = %caller.user_id, ?decision, "review decision recorded");
        let updated = self.proposal_store.get(id).await?;
        self.load_details(updated).await
    }
}
