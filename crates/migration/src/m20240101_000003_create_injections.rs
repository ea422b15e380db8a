//! Create `injections` table with FK to `animals`.
//!
//! An injection log line always belongs to exactly one animal and goes away
//! with it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Injections::Table)
                    .if_not_exists()
                    .col(uuid(Injections::Id).primary_key())
                    .col(uuid(Injections::AnimalId).not_null())
                    .col(date(Injections::Date).not_null())
                    .col(text(Injections::Details).not_null())
                    .col(timestamp_with_time_zone(Injections::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_injection_animal")
                            .from(Injections::Table, Injections::AnimalId)
                            .to(Animals::Table, Animals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Injections::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Injections { Table, Id, AnimalId, Date, Details, CreatedAt }

#[derive(DeriveIden)]
enum Animals { Table, Id }
