//! Create `users` table.
//!
//! Accounts start unverified; the one-time code lives next to the account
//! until it is redeemed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(120)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Mobile)
                            .string_len(20)
                            .null()
                            .unique_key(),
                    )
                    .col(string_len(Users::PasswordHash, 200).not_null())
                    .col(string_len(Users::Name, 100).not_null())
                    .col(ColumnDef::new(Users::VerificationCode).string_len(6).null())
                    .col(boolean(Users::IsVerified).not_null().default(false))
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, Email, Mobile, PasswordHash, Name, VerificationCode, IsVerified, CreatedAt }
