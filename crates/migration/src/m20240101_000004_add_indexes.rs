use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Animals: index on owner_id for the owner-scoped list
        manager
            .create_index(
                Index::create()
                    .name("idx_animal_owner")
                    .table(Animals::Table)
                    .col(Animals::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Injections: index on animal_id for embedded fetches and set replace
        manager
            .create_index(
                Index::create()
                    .name("idx_injection_animal")
                    .table(Injections::Table)
                    .col(Injections::AnimalId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_animal_owner").table(Animals::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_injection_animal").table(Injections::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Animals { Table, OwnerId }

#[derive(DeriveIden)]
enum Injections { Table, AnimalId }
