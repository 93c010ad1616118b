use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::app_data::AppData;
use crate::coordinators::ProposalCoordinator;
use crate::errors::ProposalError;
use crate::providers::AuthorizationProvider;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::proposal::{
    AttachmentRequest, AttachmentResponse, CommentRequest, CommentResponse, DecisionRequest,
    OpenReviewRequest, ProposalDetailResponse, ProposalRequest, ProposalResponse,
};
use crate::types::internal::{ProposalStatus, RequestContext};

/// Investment proposal endpoints
pub struct ProposalApi {
    proposal_coordinator: ProposalCoordinator,
    authorization_provider: Arc<AuthorizationProvider>,
}

impl ProposalApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            authorization_provider: Arc::clone(&app_data.authorization_provider),
            proposal_coordinator: ProposalCoordinator::new(app_data),
        }
    }

    fn context(&self, req: &Request) -> Result<RequestContext, ProposalError> {
        Ok(helpers::authenticated_context(req, &self.authorization_provider)?)
    }
}

#[derive(Tags)]
enum ProposalTags {
    /// Investment proposals and their approval workflow
    Proposals,
}

#[OpenApi]
impl ProposalApi {
    /// List proposals, newest first
    ///
    /// Admin, CEO and CFO see every proposal; everyone else sees their own.
    #[oai(path = "/proposals", method = "get", tag = "ProposalTags::Proposals")]
    async fn list(
        &self,
        req: &Request,
        _auth: BearerAuth,
        status: Query<Option<ProposalStatus>>,
    ) -> Result<Json<Vec<ProposalResponse>>, ProposalError> {
        let ctx = self.context(req)?;
        let proposals = self.proposal_coordinator.list(&ctx, status.0).await?;
        Ok(Json(proposals.into_iter().map(ProposalResponse::from).collect()))
    }

    /// Create a draft proposal owned by the caller
    #[oai(path = "/proposals", method = "post", tag = "ProposalTags::Proposals")]
    async fn create(
        &self,
        req: &Request,
        _auth: BearerAuth,
        body: Json<ProposalRequest>,
    ) -> Result<Json<ProposalResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let created = self.proposal_coordinator.create(&ctx, body.0.into()).await?;
        Ok(Json(created.into()))
    }

    /// Proposal with attachments, approvals and comments
    #[oai(path = "/proposals/:id", method = "get", tag = "ProposalTags::Proposals")]
    async fn get(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<i64>,
    ) -> Result<Json<ProposalDetailResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let details = self.proposal_coordinator.get(&ctx, id.0).await?;
        Ok(Json(details.into()))
    }

    /// Replace the content of a draft or revision proposal
    #[oai(path = "/proposals/:id", method = "put", tag = "ProposalTags::Proposals")]
    async fn update(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<i64>,
        body: Json<ProposalRequest>,
    ) -> Result<Json<ProposalResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let updated = self.proposal_coordinator.mutate(&ctx, id.0, body.0.into()).await?;
        Ok(Json(updated.into()))
    }

    /// Delete a draft proposal
    #[oai(path = "/proposals/:id", method = "delete", tag = "ProposalTags::Proposals")]
    async fn delete(&self, req: &Request, _auth: BearerAuth, id: Path<i64>) -> Result<Json<MessageResponse>, ProposalError> {
        let ctx = self.context(req)?;
        self.proposal_coordinator.delete(&ctx, id.0).await?;
        Ok(Json(MessageResponse::new("Proposal deleted")))
    }

    /// Submit a draft or revised proposal for review
    #[oai(path = "/proposals/:id/submit", method = "post", tag = "ProposalTags::Proposals")]
    async fn submit(&self, req: &Request, _auth: BearerAuth, id: Path<i64>) -> Result<Json<ProposalResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let submitted = self.proposal_coordinator.submit(&ctx, id.0).await?;
        Ok(Json(submitted.into()))
    }

    #[oai(path = "/proposals/:id/comments", method = "post", tag = "ProposalTags::Proposals")]
    async fn add_comment(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<i64>,
        body: Json<CommentRequest>,
    ) -> Result<Json<CommentResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let comment = self.proposal_coordinator.add_comment(&ctx, id.0, &body.content).await?;
        Ok(Json(comment.into()))
    }

    /// Register a file reference on an editable proposal
    #[oai(path = "/proposals/:id/attachments", method = "post", tag = "ProposalTags::Proposals")]
    async fn add_attachment(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<i64>,
        body: Json<AttachmentRequest>,
    ) -> Result<Json<AttachmentResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let attachment = self.proposal_coordinator.add_attachment(&ctx, id.0, body.0.into()).await?;
        Ok(Json(attachment.into()))
    }

    /// Move a submitted proposal into review and assign approvers (admin)
    #[oai(path = "/proposals/:id/review", method = "post", tag = "ProposalTags::Proposals")]
    async fn open_review(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<i64>,
        body: Json<OpenReviewRequest>,
    ) -> Result<Json<ProposalDetailResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let details = self
            .proposal_coordinator
            .open_review(&ctx, id.0, &body.approver_ids)
            .await?;
        Ok(Json(details.into()))
    }

    /// Record the caller's decision on a proposal under review
    #[oai(path = "/proposals/:id/decision", method = "post", tag = "ProposalTags::Proposals")]
    async fn decide(
        &self,
        req: &Request,
        _auth: BearerAuth,
        id: Path<i64>,
        body: Json<DecisionRequest>,
    ) -> Result<Json<ProposalDetailResponse>, ProposalError> {
        let ctx = self.context(req)?;
        let body = body.0;
        let details = self
            .proposal_coordinator
            .record_decision(&ctx, id.0, body.decision.into(), body.comments)
            .await?;
        Ok(Json(details.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{FakeDirectory, TestContext};
    use crate::types::db::user;
    use crate::types::dto::proposal::DecisionKind;
    use crate::types::internal::UserRole;
    use poem_openapi::auth::Bearer;

    fn authed(ctx: &TestContext, user: &user::Model) -> (Request, BearerAuth) {
        let token = ctx.token_for(user);
        let req = Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .finish();
        (req, BearerAuth(Bearer { token }))
    }

    fn proposal(title: &str) -> Json<ProposalRequest> {
        Json(ProposalRequest {
            title: title.to_string(),
            description: "Replace the cooling system".to_string(),
            investment_type: "capex".to_string(),
            estimated_cost: 250_000_000.0,
            currency: None,
            expected_start_date: None,
            expected_completion_date: None,
            justification: String::new(),
            expected_benefit: String::new(),
            risk_analysis: String::new(),
        })
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let owner = ctx.local_user("omar", "password1", UserRole::CorpFa).await;
        let api = ProposalApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &owner);
        let created = api.create(&req, auth, proposal("Chiller upgrade")).await.unwrap();
        assert_eq!(created.status, ProposalStatus::Draft);
        assert_eq!(created.currency, "IDR");

        let (req, auth) = authed(&ctx, &owner);
        let details = api.get(&req, auth, Path(created.id)).await.unwrap();
        assert_eq!(details.proposal.title, "Chiller upgrade");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let api = ProposalApi::new(Arc::clone(&ctx.app_data));

        let req = Request::builder().finish();
        let auth = BearerAuth(Bearer { token: String::new() });
        let err = api.list(&req, auth, Query(None)).await.unwrap_err();

        assert!(matches!(err, ProposalError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_other_users_proposal_is_forbidden() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let owner = ctx.local_user("omar", "password1", UserRole::CorpFa).await;
        let other = ctx.local_user("olga", "password1", UserRole::Procurement).await;
        let api = ProposalApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &owner);
        let created = api.create(&req, auth, proposal("Fleet")).await.unwrap();

        let (req, auth) = authed(&ctx, &other);
        let err = api.get(&req, auth, Path(created.id)).await.unwrap_err();
        assert!(matches!(err, ProposalError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_double_submit_is_bad_request() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let owner = ctx.local_user("omar", "password1", UserRole::CorpFa).await;
        let api = ProposalApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &owner);
        let created = api.create(&req, auth, proposal("Fleet")).await.unwrap();

        let (req, auth) = authed(&ctx, &owner);
        let submitted = api.submit(&req, auth, Path(created.id)).await.unwrap();
        assert_eq!(submitted.status, ProposalStatus::Submitted);

        let (req, auth) = authed(&ctx, &owner);
        let err = api.submit(&req, auth, Path(created.id)).await.unwrap_err();
        match err {
            ProposalError::InvalidTransition(json) => assert_eq!(json.0.status_code, 400),
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_review_round_through_the_api() {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let owner = ctx.local_user("omar", "password1", UserRole::CorpFa).await;
        let admin = ctx.local_user("root", "password1", UserRole::Admin).await;
        let ceo = ctx.local_user("chen", "password1", UserRole::Ceo).await;
        let api = ProposalApi::new(Arc::clone(&ctx.app_data));

        let (req, auth) = authed(&ctx, &owner);
        let created = api.create(&req, auth, proposal("Warehouse")).await.unwrap();
        let (req, auth) = authed(&ctx, &owner);
        api.submit(&req, auth, Path(created.id)).await.unwrap();

        let (req, auth) = authed(&ctx, &owner);
        let err = api
            .open_review(&req, auth, Path(created.id), Json(OpenReviewRequest { approver_ids: vec![ceo.id.clone()] }))
            .await
            .unwrap_err();
        assert!(matches!(err, ProposalError::Forbidden(_)));

        let (req, auth) = authed(&ctx, &admin);
        let reviewing = api
            .open_review(&req, auth, Path(created.id), Json(OpenReviewRequest { approver_ids: vec![ceo.id.clone()] }))
            .await
            .unwrap();
        assert_eq!(reviewing.proposal.status, ProposalStatus::Reviewing);
        assert_eq!(reviewing.approvals.len(), 1);

        let (req, auth) = authed(&ctx, &ceo);
        let decided = api
            .decide(
                &req,
                auth,
                Path(created.id),
                Json(DecisionRequest { decision: DecisionKind::Approve, comments: None }),
            )
            .await
            .unwrap();
        assert_eq!(decided.proposal.status, ProposalStatus::Approved);

        let (req, auth) = authed(&ctx, &ceo);
        let err = api
            .decide(
                &req,
                auth,
                Path(created.id),
                Json(DecisionRequest { decision: DecisionKind::Reject, comments: None }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProposalError::InvalidTransition(_)));
    }
}
