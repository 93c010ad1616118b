use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only. No foreign key to users: failed attempts for unknown
        // usernames are recorded too, and rows must outlive their user.
        manager
            .create_table(
                Table::create()
                    .table(LoginAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginAttempts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoginAttempts::UserId).string().null())
                    .col(ColumnDef::new(LoginAttempts::Username).string_len(100).not_null())
                    .col(ColumnDef::new(LoginAttempts::IpAddress).string_len(45).not_null().default(""))
                    .col(ColumnDef::new(LoginAttempts::UserAgent).text().not_null().default(""))
                    .col(ColumnDef::new(LoginAttempts::Success).boolean().not_null())
                    .col(ColumnDef::new(LoginAttempts::FailReason).string_len(255).null())
                    .col(ColumnDef::new(LoginAttempts::LoginAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_login_attempts_username")
                    .table(LoginAttempts::Table)
                    .col(LoginAttempts::Username)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_login_attempts_login_at")
                    .table(LoginAttempts::Table)
                    .col(LoginAttempts::LoginAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginAttempts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoginAttempts {
    Table,
    Id,
    UserId,
    Username,
    IpAddress,
    UserAgent,
    Success,
    FailReason,
    LoginAt,
}
