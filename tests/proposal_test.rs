mod common;

use std::sync::Arc;

use common::{StaticDirectory, TestApp};
use proposal_backend::coordinators::ProposalCoordinator;
use proposal_backend::errors::InternalError;
use proposal_backend::errors::internal::{AccessError, WorkflowError};
use proposal_backend::types::internal::proposal::{ProposalContent, ReviewDecision};
use proposal_backend::types::internal::{ProposalStatus, UserRole};

fn content(title: &str) -> ProposalContent {
    ProposalContent {
        title: title.to_string(),
        description: "New packaging line".to_string(),
        investment_type: "capex".to_string(),
        estimated_cost: 1_500_000_000.0,
        currency: String::new(),
        expected_start_date: None,
        expected_completion_date: None,
        justification: "Capacity".to_string(),
        expected_benefit: "Throughput".to_string(),
        risk_analysis: "Low".to_string(),
    }
}

struct Cast {
    app: TestApp,
    proposals: ProposalCoordinator,
}

async fn cast() -> Cast {
    let app = TestApp::new(StaticDirectory::default()).await;
    app.local_user("owner", "owner-pass", UserRole::CorpFa).await;
    app.local_user("other", "other-pass", UserRole::Procurement).await;
    app.local_user("admin", "admin-pass", UserRole::Admin).await;
    app.local_user("ceo", "ceo-pass1", UserRole::Ceo).await;
    app.local_user("cfo", "cfo-pass1", UserRole::Cfo).await;
    let proposals = ProposalCoordinator::new(Arc::clone(&app.app_data));
    Cast { app, proposals }
}

#[tokio::test]
async fn test_submit_rules() {
    let Cast { app, proposals } = cast().await;
    let owner = app.session("owner", "owner-pass").await;
    let other = app.session("other", "other-pass").await;

    let draft = proposals.create(&owner, content("Line 3")).await.unwrap();
    let id = draft.proposal.id;

    let err = proposals.submit(&other, id).await.unwrap_err();
    assert!(matches!(err, InternalError::Access(AccessError::ForbiddenOwnership { .. })));

    let submitted = proposals.submit(&owner, id).await.unwrap();
    assert_eq!(submitted.proposal.status, ProposalStatus::Submitted);

    let err = proposals.submit(&owner, id).await.unwrap_err();
    assert!(matches!(err, InternalError::Workflow(WorkflowError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_approved_proposal_cannot_be_mutated() {
    let Cast { app, proposals } = cast().await;
    let owner = app.session("owner", "owner-pass").await;
    let admin = app.session("admin", "admin-pass").await;
    let ceo = app.session("ceo", "ceo-pass1").await;
    let cfo = app.session("cfo", "cfo-pass1").await;

    let id = proposals.create(&owner, content("Line 4")).await.unwrap().proposal.id;
    proposals.submit(&owner, id).await.unwrap();
    let reviewing = proposals.open_review(&admin, id, &[]).await.unwrap();
    assert_eq!(reviewing.approvals.len(), 2);

    let partial = proposals.record_decision(&ceo, id, ReviewDecision::Approve, None).await.unwrap();
    assert_eq!(partial.proposal.status, ProposalStatus::Reviewing);
    let approved = proposals
        .record_decision(&cfo, id, ReviewDecision::Approve, Some("Funded in Q3".to_string()))
        .await
        .unwrap();
    assert_eq!(approved.proposal.status, ProposalStatus::Approved);

    let err = proposals.mutate(&owner, id, content("Rewritten")).await.unwrap_err();
    assert!(matches!(err, InternalError::Workflow(WorkflowError::InvalidTransition { .. })));

    let unchanged = proposals.get(&owner, id).await.unwrap();
    assert_eq!(unchanged.proposal.title, "Line 4");
    assert_eq!(unchanged.proposal.status, ProposalStatus::Approved);
}

#[tokio::test]
async fn test_admin_deletes_another_users_draft() {
    let Cast { app, proposals } = cast().await;
    let owner = app.session("owner", "owner-pass").await;
    let admin = app.session("admin", "admin-pass").await;
    let other = app.session("other", "other-pass").await;

    let id = proposals.create(&owner, content("Line 5")).await.unwrap().proposal.id;

    let err = proposals.delete(&other, id).await.unwrap_err();
    assert!(matches!(err, InternalError::Access(AccessError::ForbiddenOwnership { .. })));

    proposals.delete(&admin, id).await.unwrap();
    let err = proposals.get(&owner, id).await.unwrap_err();
    assert!(matches!(err, InternalError::Workflow(WorkflowError::NotFound { .. })));
}

#[tokio::test]
async fn test_submitted_proposal_cannot_be_deleted() {
    let Cast { app, proposals } = cast().await;
    let owner = app.session("owner", "owner-pass").await;

    let id = proposals.create(&owner, content("Line 6")).await.unwrap().proposal.id;
    proposals.submit(&owner, id).await.unwrap();

    let err = proposals.delete(&owner, id).await.unwrap_err();
    assert!(matches!(err, InternalError::Workflow(WorkflowError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_revision_round_and_resubmit() {
    let Cast { app, proposals } = cast().await;
    let owner = app.session("owner", "owner-pass").await;
    let admin = app.session("admin", "admin-pass").await;
    let cfo = app.session("cfo", "cfo-pass1").await;
    let cfo_id = cfo.caller().unwrap().user_id.clone();

    let id = proposals.create(&owner, content("Line 7")).await.unwrap().proposal.id;
    proposals.submit(&owner, id).await.unwrap();
    proposals.open_review(&admin, id, &[cfo_id]).await.unwrap();

    let revised = proposals
        .record_decision(&cfo, id, ReviewDecision::RequestRevision, Some("Add vendor quotes".to_string()))
        .await
        .unwrap();
    assert_eq!(revised.proposal.status, ProposalStatus::Revision);
    assert!(revised.approvals.is_empty());
    assert_eq!(revised.comments.len(), 1);

    proposals.mutate(&owner, id, content("Line 7 with quotes")).await.unwrap();
    let resubmitted = proposals.submit(&owner, id).await.unwrap();
    assert_eq!(resubmitted.proposal.status, ProposalStatus::Submitted);
    assert_eq!(resubmitted.proposal.title, "Line 7 with quotes");
}

#[tokio::test]
async fn test_rejection_is_terminal() {
    let Cast { app, proposals } = cast().await;
    let owner = app.session("owner", "owner-pass").await;
    let admin = app.session("admin", "admin-pass").await;
    let ceo = app.session("ceo", "ceo-pass1").await;

    let id = proposals.create(&owner, content("Line 8")).await.unwrap().proposal.id;
    proposals.submit(&owner, id).await.unwrap();
    proposals.open_review(&admin, id, &[]).await.unwrap();

    let rejected = proposals.record_decision(&ceo, id, ReviewDecision::Reject, None).await.unwrap();
    assert_eq!(rejected.proposal.status, ProposalStatus::Rejected);

    assert!(proposals.submit(&owner, id).await.is_err());
    assert!(proposals.mutate(&owner, id, content("Again")).await.is_err());
    assert!(proposals.delete(&owner, id).await.is_err());
}
