use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::errors::InternalError;
use crate::errors::internal::WorkflowError;
use crate::types::db::{approval, attachment, comment, proposal};
use crate::types::internal::proposal::{NewAttachment, ProposalContent, ProposalFilter};
use crate::types::internal::{ApprovalStatus, ProposalStatus, UserRole};

/// Repository for proposals and their attachments, approvals and comments
///
/// Status changes are compare-and-swap updates: they only apply when the row
/// is still in the expected status, and report whether they did.
pub struct ProposalStore {
    db: DatabaseConnection,
}

impl ProposalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn begin(&self) -> Result<DatabaseTransaction, InternalError> {
        self.db.begin().await.map_err(InternalError::transaction_begin)
    }

    pub async fn commit(txn: DatabaseTransaction) -> Result<(), InternalError> {
        txn.commit().await.map_err(InternalError::transaction_commit)
    }

    pub async fn rollback(txn: DatabaseTransaction) -> Result<(), InternalError> {
        txn.rollback()
            .await
            .map_err(|e| InternalError::database("rollback_transaction", e))
    }

    pub async fn insert(
        &self,
        proposal_number: String,
        content: ProposalContent,
        owner_id: &str,
        department: &str,
        now: i64,
    ) -> Result<proposal::Model, InternalError> {
        let model = proposal::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            proposal_number: Set(proposal_number),
            title: Set(content.title),
            description: Set(content.description),
            investment_type: Set(content.investment_type),
            estimated_cost: Set(content.estimated_cost),
            currency: Set(content.currency),
            proposal_date: Set(now),
            expected_start_date: Set(content.expected_start_date),
            expected_completion_date: Set(content.expected_completion_date),
            justification: Set(content.justification),
            expected_benefit: Set(content.expected_benefit),
            risk_analysis: Set(content.risk_analysis),
            status: Set(ProposalStatus::Draft),
            submitted_by_id: Set(owner_id.to_string()),
            department: Set(department.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert_proposal", e))
    }

    pub async fn find_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i64,
    ) -> Result<Option<proposal::Model>, InternalError> {
        proposal::Entity::find_by_id(id)
            .filter(proposal::Column::DeletedAt.is_null())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_proposal", e))
    }

    /// Fetch a live proposal or fail with NotFound
    pub async fn get(&self, id: i64) -> Result<proposal::Model, InternalError> {
        self.get_in(&self.db, id).await
    }

    pub async fn get_in<C: ConnectionTrait>(&self, conn: &C, id: i64) -> Result<proposal::Model, InternalError> {
        self.find_in(conn, id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("proposal", id).into())
    }

    /// Live proposals matching the filter, newest first
    pub async fn list(&self, filter: &ProposalFilter) -> Result<Vec<proposal::Model>, InternalError> {
        let mut query = proposal::Entity::find().filter(proposal::Column::DeletedAt.is_null());
        if let Some(owner_id) = &filter.owner_id {
            query = query.filter(proposal::Column::SubmittedById.eq(owner_id.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(proposal::Column::Status.eq(status));
        }

        query
            .order_by_desc(proposal::Column::CreatedAt)
            .order_by_desc(proposal::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_proposals", e))
    }

    /// Replace the content of a proposal still in `expected` status
    pub async fn update_content_if(
        &self,
        id: i64,
        expected: ProposalStatus,
        content: ProposalContent,
        now: i64,
    ) -> Result<bool, InternalError> {
        let changes = proposal::ActiveModel {
            title: Set(content.title),
            description: Set(content.description),
            investment_type: Set(content.investment_type),
            estimated_cost: Set(content.estimated_cost),
            currency: Set(content.currency),
            expected_start_date: Set(content.expected_start_date),
            expected_completion_date: Set(content.expected_completion_date),
            justification: Set(content.justification),
            expected_benefit: Set(content.expected_benefit),
            risk_analysis: Set(content.risk_analysis),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = proposal::Entity::update_many()
            .set(changes)
            .filter(proposal::Column::Id.eq(id))
            .filter(proposal::Column::Status.eq(expected))
            .filter(proposal::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("update_proposal_content", e))?;

        Ok(result.rows_affected == 1)
    }

    pub async fn transition(
        &self,
        id: i64,
        from: ProposalStatus,
        to: ProposalStatus,
        now: i64,
    ) -> Result<bool, InternalError> {
        self.transition_if(&self.db, id, from, to, now).await
    }

    /// Move a proposal from `from` to `to`; false when it was no longer in `from`
    pub async fn transition_if<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i64,
        from: ProposalStatus,
        to: ProposalStatus,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = proposal::Entity::update_many()
            .col_expr(proposal::Column::Status, Expr::value(to))
            .col_expr(proposal::Column::UpdatedAt, Expr::value(now))
            .filter(proposal::Column::Id.eq(id))
            .filter(proposal::Column::Status.eq(from))
            .filter(proposal::Column::DeletedAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("transition_proposal", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Soft-delete a proposal that is still a draft
    pub async fn soft_delete_if_draft(&self, id: i64, now: i64) -> Result<bool, InternalError> {
        let result = proposal::Entity::update_many()
            .col_expr(proposal::Column::DeletedAt, Expr::value(now))
            .col_expr(proposal::Column::UpdatedAt, Expr::value(now))
            .filter(proposal::Column::Id.eq(id))
            .filter(proposal::Column::Status.eq(ProposalStatus::Draft))
            .filter(proposal::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("soft_delete_proposal", e))?;

        Ok(result.rows_affected == 1)
    }

    pub async fn add_attachment(
        &self,
        proposal_id: i64,
        uploaded_by_id: &str,
        file: NewAttachment,
        now: i64,
    ) -> Result<attachment::Model, InternalError> {
        let model = attachment::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            proposal_id: Set(proposal_id),
            file_name: Set(file.file_name),
            file_path: Set(file.file_path),
            file_size: Set(file.file_size),
            file_type: Set(file.file_type),
            uploaded_by_id: Set(uploaded_by_id.to_string()),
            created_at: Set(now),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert_attachment", e))
    }

    pub async fn list_attachments(&self, proposal_id: i64) -> Result<Vec<attachment::Model>, InternalError> {
        attachment::Entity::find()
            .filter(attachment::Column::ProposalId.eq(proposal_id))
            .order_by_asc(attachment::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_attachments", e))
    }

    /// Open a review round with one pending approval per approver
    pub async fn create_approvals<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: i64,
        approvers: &[(String, UserRole)],
        now: i64,
    ) -> Result<(), InternalError> {
        for (approver_id, role) in approvers {
            let model = approval::ActiveModel {
                id: sea_orm::ActiveValue::NotSet,
                proposal_id: Set(proposal_id),
                approver_id: Set(approver_id.clone()),
                approver_role: Set(*role),
                status: Set(ApprovalStatus::Pending),
                comments: Set(None),
                decided_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            model
                .insert(conn)
                .await
                .map_err(|e| InternalError::database("insert_approval", e))?;
        }
        Ok(())
    }

    pub async fn list_approvals<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: i64,
    ) -> Result<Vec<approval::Model>, InternalError> {
        approval::Entity::find()
            .filter(approval::Column::ProposalId.eq(proposal_id))
            .order_by_asc(approval::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_approvals", e))
    }

    pub async fn list_approvals_for(&self, proposal_id: i64) -> Result<Vec<approval::Model>, InternalError> {
        self.list_approvals(&self.db, proposal_id).await
    }

    /// Record the approver's decision while their approval is pending and the
    /// proposal is still under review
    ///
    /// Must be the first statement of a decision transaction, so the write
    /// lock is held before anything is read.
    pub async fn decide_if_pending<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: i64,
        approver_id: &str,
        status: ApprovalStatus,
        comments: Option<String>,
        now: i64,
    ) -> Result<bool, InternalError> {
        let reviewing = Query::select()
            .column(proposal::Column::Id)
            .from(proposal::Entity)
            .and_where(proposal::Column::Id.eq(proposal_id))
            .and_where(proposal::Column::Status.eq(ProposalStatus::Reviewing))
            .and_where(proposal::Column::DeletedAt.is_null())
            .to_owned();

        let result = approval::Entity::update_many()
            .col_expr(approval::Column::Status, Expr::value(status))
            .col_expr(approval::Column::Comments, Expr::value(comments))
            .col_expr(approval::Column::DecidedAt, Expr::value(now))
            .col_expr(approval::Column::UpdatedAt, Expr::value(now))
            .filter(approval::Column::ProposalId.in_subquery(reviewing))
            .filter(approval::Column::ApproverId.eq(approver_id))
            .filter(approval::Column::Status.eq(ApprovalStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("decide_approval", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Drop every approval of the current round
    pub async fn clear_approvals<C: ConnectionTrait>(&self, conn: &C, proposal_id: i64) -> Result<(), InternalError> {
        approval::Entity::delete_many()
            .filter(approval::Column::ProposalId.eq(proposal_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_approvals", e))?;
        Ok(())
    }

    pub async fn add_comment<C: ConnectionTrait>(
        &self,
        conn: &C,
        proposal_id: i64,
        user_id: &str,
        content: &str,
        now: i64,
    ) -> Result<comment::Model, InternalError> {
        let model = comment::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            proposal_id: Set(proposal_id),
            user_id: Set(user_id.to_string()),
            content: Set(content.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_comment", e))
    }

    pub async fn add_comment_to(
        &self,
        proposal_id: i64,
        user_id: &str,
        content: &str,
        now: i64,
    ) -> Result<comment::Model, InternalError> {
        self.add_comment(&self.db, proposal_id, user_id, content, now).await
    }

    pub async fn list_comments(&self, proposal_id: i64) -> Result<Vec<comment::Model>, InternalError> {
        comment::Entity::find()
            .filter(comment::Column::ProposalId.eq(proposal_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_comments", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::user_store::{NewUser, UserStore};
    use crate::test::utils::setup_test_db;

    fn content(title: &str) -> ProposalContent {
        ProposalContent {
            title: title.to_string(),
            description: "New packaging line".to_string(),
            investment_type: "capex".to_string(),
            estimated_cost: 1_500_000_000.0,
            currency: "IDR".to_string(),
            expected_start_date: None,
            expected_completion_date: None,
            justification: String::new(),
            expected_benefit: String::new(),
            risk_analysis: String::new(),
        }
    }

    async fn setup() -> (ProposalStore, String) {
        let db = setup_test_db().await;
        let users = UserStore::new(db.clone());
        let owner = users
            .create(
                NewUser {
                    username: "owner".to_string(),
                    email: None,
                    full_name: "Owner".to_string(),
                    role: UserRole::CorpFa,
                    department: "Finance".to_string(),
                    is_directory_user: true,
                    password_hash: None,
                },
                1,
            )
            .await
            .unwrap();
        (ProposalStore::new(db), owner.id)
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_swap() {
        let (store, owner) = setup().await;
        let created = store.insert("INV-1".into(), content("Line"), &owner, "Finance", 10).await.unwrap();

        let applied = store
            .transition_if(&store.db, created.id, ProposalStatus::Draft, ProposalStatus::Submitted, 11)
            .await
            .unwrap();
        assert!(applied);

        // Second attempt from the old state does nothing
        let applied = store
            .transition_if(&store.db, created.id, ProposalStatus::Draft, ProposalStatus::Submitted, 12)
            .await
            .unwrap();
        assert!(!applied);

        assert_eq!(store.get(created.id).await.unwrap().status, ProposalStatus::Submitted);
    }

    #[tokio::test]
    async fn test_soft_delete_only_applies_to_drafts() {
        let (store, owner) = setup().await;
        let draft = store.insert("INV-1".into(), content("A"), &owner, "", 10).await.unwrap();
        let submitted = store.insert("INV-2".into(), content("B"), &owner, "", 10).await.unwrap();
        store
            .transition_if(&store.db, submitted.id, ProposalStatus::Draft, ProposalStatus::Submitted, 11)
            .await
            .unwrap();

        assert!(store.soft_delete_if_draft(draft.id, 20).await.unwrap());
        assert!(!store.soft_delete_if_draft(submitted.id, 20).await.unwrap());

        assert!(matches!(
            store.get(draft.id).await,
            Err(InternalError::Workflow(WorkflowError::NotFound { .. }))
        ));
        let listed = store.list(&ProposalFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, submitted.id);
    }

    #[tokio::test]
    async fn test_update_content_requires_expected_status() {
        let (store, owner) = setup().await;
        let created = store.insert("INV-1".into(), content("Old"), &owner, "", 10).await.unwrap();

        assert!(store.update_content_if(created.id, ProposalStatus::Draft, content("New"), 11).await.unwrap());
        assert!(!store.update_content_if(created.id, ProposalStatus::Revision, content("Other"), 12).await.unwrap());

        assert_eq!(store.get(created.id).await.unwrap().title, "New");
    }

    #[tokio::test]
    async fn test_decision_needs_pending_approval_on_reviewing_proposal() {
        let (store, owner) = setup().await;
        let created = store.insert("INV-1".into(), content("A"), &owner, "", 10).await.unwrap();
        store
            .create_approvals(&store.db, created.id, &[(owner.clone(), UserRole::Ceo)], 11)
            .await
            .unwrap();

        // Still a draft
        let applied = store
            .decide_if_pending(&store.db, created.id, &owner, ApprovalStatus::Approved, None, 12)
            .await
            .unwrap();
        assert!(!applied);

        store
            .transition_if(&store.db, created.id, ProposalStatus::Draft, ProposalStatus::Reviewing, 13)
            .await
            .unwrap();
        assert!(
            !store
                .decide_if_pending(&store.db, created.id, "someone-else", ApprovalStatus::Approved, None, 14)
                .await
                .unwrap()
        );
        assert!(
            store
                .decide_if_pending(&store.db, created.id, &owner, ApprovalStatus::Approved, None, 15)
                .await
                .unwrap()
        );
        assert!(
            !store
                .decide_if_pending(&store.db, created.id, &owner, ApprovalStatus::Rejected, None, 16)
                .await
                .unwrap()
        );

        let approvals = store.list_approvals_for(created.id).await.unwrap();
        assert_eq!(approvals[0].status, ApprovalStatus::Approved);
        assert_eq!(approvals[0].decided_at, Some(15));
    }

    #[tokio::test]
    async fn test_filter_by_owner_and_status() {
        let (store, owner) = setup().await;
        store.insert("INV-1".into(), content("A"), &owner, "", 10).await.unwrap();

        let mine = store
            .list(&ProposalFilter { owner_id: Some(owner.clone()), status: Some(ProposalStatus::Draft) })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        let others = store
            .list(&ProposalFilter { owner_id: Some("someone-else".into()), status: None })
            .await
            .unwrap();
        assert!(others.is_empty());
    }
}
