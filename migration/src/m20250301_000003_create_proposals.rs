use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InvestmentProposals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvestmentProposals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InvestmentProposals::ProposalNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(InvestmentProposals::Title).string_len(255).not_null())
                    .col(ColumnDef::new(InvestmentProposals::Description).text().not_null().default(""))
                    .col(ColumnDef::new(InvestmentProposals::InvestmentType).string_len(100).not_null().default(""))
                    .col(ColumnDef::new(InvestmentProposals::EstimatedCost).double().not_null().default(0.0))
                    .col(ColumnDef::new(InvestmentProposals::Currency).string_len(10).not_null().default("IDR"))
                    .col(ColumnDef::new(InvestmentProposals::ProposalDate).big_integer().not_null())
                    .col(ColumnDef::new(InvestmentProposals::ExpectedStartDate).date().null())
                    .col(ColumnDef::new(InvestmentProposals::ExpectedCompletionDate).date().null())
                    .col(ColumnDef::new(InvestmentProposals::Justification).text().not_null().default(""))
                    .col(ColumnDef::new(InvestmentProposals::ExpectedBenefit).text().not_null().default(""))
                    .col(ColumnDef::new(InvestmentProposals::RiskAnalysis).text().not_null().default(""))
                    .col(ColumnDef::new(InvestmentProposals::Status).string_len(20).not_null().default("draft"))
                    .col(ColumnDef::new(InvestmentProposals::SubmittedById).string().not_null())
                    .col(ColumnDef::new(InvestmentProposals::Department).string_len(100).not_null().default(""))
                    .col(ColumnDef::new(InvestmentProposals::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(InvestmentProposals::UpdatedAt).big_integer().not_null())
                    .col(ColumnDef::new(InvestmentProposals::DeletedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proposals_submitted_by")
                            .from(InvestmentProposals::Table, InvestmentProposals::SubmittedById)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_proposals_submitted_by")
                    .table(InvestmentProposals::Table)
                    .col(InvestmentProposals::SubmittedById)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_proposals_status")
                    .table(InvestmentProposals::Table)
                    .col(InvestmentProposals::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProposalAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalAttachments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProposalAttachments::ProposalId).big_integer().not_null())
                    .col(ColumnDef::new(ProposalAttachments::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(ProposalAttachments::FilePath).string_len(500).not_null())
                    .col(ColumnDef::new(ProposalAttachments::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(ProposalAttachments::FileType).string_len(100).not_null().default(""))
                    .col(ColumnDef::new(ProposalAttachments::UploadedById).string().not_null())
                    .col(ColumnDef::new(ProposalAttachments::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_proposal_id")
                            .from(ProposalAttachments::Table, ProposalAttachments::ProposalId)
                            .to(InvestmentProposals::Table, InvestmentProposals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProposalApprovals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalApprovals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProposalApprovals::ProposalId).big_integer().not_null())
                    .col(ColumnDef::new(ProposalApprovals::ApproverId).string().not_null())
                    .col(ColumnDef::new(ProposalApprovals::ApproverRole).string_len(50).not_null())
                    .col(ColumnDef::new(ProposalApprovals::Status).string_len(20).not_null().default("pending"))
                    .col(ColumnDef::new(ProposalApprovals::Comments).text().null())
                    .col(ColumnDef::new(ProposalApprovals::DecidedAt).big_integer().null())
                    .col(ColumnDef::new(ProposalApprovals::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(ProposalApprovals::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approvals_proposal_id")
                            .from(ProposalApprovals::Table, ProposalApprovals::ProposalId)
                            .to(InvestmentProposals::Table, InvestmentProposals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One approval row per approver per review round
        manager
            .create_index(
                Index::create()
                    .name("idx_approvals_proposal_approver")
                    .table(ProposalApprovals::Table)
                    .col(ProposalApprovals::ProposalId)
                    .col(ProposalApprovals::ApproverId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProposalComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProposalComments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProposalComments::ProposalId).big_integer().not_null())
                    .col(ColumnDef::new(ProposalComments::UserId).string().not_null())
                    .col(ColumnDef::new(ProposalComments::Content).text().not_null())
                    .col(ColumnDef::new(ProposalComments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(ProposalComments::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_proposal_id")
                            .from(ProposalComments::Table, ProposalComments::ProposalId)
                            .to(InvestmentProposals::Table, InvestmentProposals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_proposal_id")
                    .table(ProposalComments::Table)
                    .col(ProposalComments::ProposalId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProposalComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProposalApprovals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProposalAttachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvestmentProposals::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum InvestmentProposals {
    Table,
    Id,
    ProposalNumber,
    Title,
    Description,
    InvestmentType,
    EstimatedCost,
    Currency,
    ProposalDate,
    ExpectedStartDate,
    ExpectedCompletionDate,
    Justification,
    ExpectedBenefit,
    RiskAnalysis,
    Status,
    SubmittedById,
    Department,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ProposalAttachments {
    Table,
    Id,
    ProposalId,
    FileName,
    FilePath,
    FileSize,
    FileType,
    UploadedById,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProposalApprovals {
    Table,
    Id,
    ProposalId,
    ApproverId,
    ApproverRole,
    Status,
    Comments,
    DecidedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProposalComments {
    Table,
    Id,
    ProposalId,
    UserId,
    Content,
    CreatedAt,
    UpdatedAt,
}
