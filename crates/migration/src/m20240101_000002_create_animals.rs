//! Create `animals` table with FK to `users`.
//!
//! Deleting a user removes its animals.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Animals::Table)
                    .if_not_exists()
                    .col(uuid(Animals::Id).primary_key())
                    .col(uuid(Animals::OwnerId).not_null())
                    .col(string_len(Animals::Name, 100).not_null())
                    .col(string_len(Animals::AnimalType, 50).not_null())
                    .col(ColumnDef::new(Animals::PhotoPath).string_len(200).null())
                    .col(ColumnDef::new(Animals::InseminatedDate).date().null())
                    .col(ColumnDef::new(Animals::DeliveryDate).date().null())
                    .col(ColumnDef::new(Animals::CalfDetails).text().null())
                    .col(ColumnDef::new(Animals::Notes).text().null())
                    .col(timestamp_with_time_zone(Animals::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Animals::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_animal_owner")
                            .from(Animals::Table, Animals::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Animals::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Animals { Table, Id, OwnerId, Name, AnimalType, PhotoPath, InseminatedDate, DeliveryDate, CalfDetails, Notes, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
