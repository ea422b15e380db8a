use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::animal::domain::{AnimalChanges, AnimalRecord, InjectionRecord, NewAnimal, NewInjection};
use crate::animal::errors::AnimalError;
use crate::animal::repository::AnimalRepository;

pub struct SeaOrmAnimalRepository {
    pub db: DatabaseConnection,
}

fn db_err(e: impl std::fmt::Display) -> AnimalError {
    AnimalError::Repository(e.to_string())
}

fn to_record(m: models::animal::Model, injections: Vec<models::injection::Model>) -> AnimalRecord {
    AnimalRecord {
        id: m.id,
        name: m.name,
        animal_type: m.animal_type,
        photo_path: m.photo_path,
        inseminated_date: m.inseminated_date,
        delivery_date: m.delivery_date,
        calf_details: m.calf_details,
        notes: m.notes,
        injections: injections
            .into_iter()
            .map(|i| InjectionRecord { id: i.id, date: i.date, details: i.details })
            .collect(),
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

fn injection_row(animal_id: Uuid, inj: NewInjection) -> models::injection::ActiveModel {
    models::injection::ActiveModel {
        id: Set(Uuid::new_v4()),
        animal_id: Set(animal_id),
        date: Set(inj.date),
        details: Set(inj.details),
        created_at: Set(Utc::now().into()),
    }
}

#[async_trait]
impl AnimalRepository for SeaOrmAnimalRepository {
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<AnimalRecord>, AnimalError> {
        let rows = models::animal::Entity::find()
            .filter(models::animal::Column::OwnerId.eq(owner_id))
            .order_by_desc(models::animal::Column::CreatedAt)
            .find_with_related(models::injection::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|(a, i)| to_record(a, i)).collect())
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<AnimalRecord>, AnimalError> {
        let mut rows = models::animal::Entity::find()
            .filter(models::animal::Column::Id.eq(id))
            .filter(models::animal::Column::OwnerId.eq(owner_id))
            .find_with_related(models::injection::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.pop().map(|(a, i)| to_record(a, i)))
    }

    async fn insert(&self, owner_id: Uuid, animal: NewAnimal) -> Result<AnimalRecord, AnimalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let now = Utc::now();
        let am = models::animal::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(animal.name),
            animal_type: Set(animal.animal_type),
            photo_path: Set(animal.photo_path),
            inseminated_date: Set(animal.inseminated_date),
            delivery_date: Set(animal.delivery_date),
            calf_details: Set(animal.calf_details),
            notes: Set(animal.notes),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let created = am.insert(&txn).await.map_err(db_err)?;

        let mut stored = Vec::with_capacity(animal.injections.len());
        for inj in animal.injections {
            stored.push(injection_row(created.id, inj).insert(&txn).await.map_err(db_err)?);
        }
        txn.commit().await.map_err(db_err)?;
        Ok(to_record(created, stored))
    }

    async fn update(&self, id: Uuid, owner_id: Uuid, changes: AnimalChanges) -> Result<Option<AnimalRecord>, AnimalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let found = models::animal::Entity::find()
            .filter(models::animal::Column::Id.eq(id))
            .filter(models::animal::Column::OwnerId.eq(owner_id))
            .one(&txn)
            .await
            .map_err(db_err)?;
        let Some(found) = found else { return Ok(None) };

        let mut am: models::animal::ActiveModel = found.into();
        if let Some(name) = changes.name { am.name = Set(name); }
        if let Some(t) = changes.animal_type { am.animal_type = Set(t); }
        if let Some(p) = changes.photo_path { am.photo_path = Set(Some(p)); }
        if let Some(d) = changes.inseminated_date { am.inseminated_date = Set(d); }
        if let Some(d) = changes.delivery_date { am.delivery_date = Set(d); }
        if let Some(c) = changes.calf_details { am.calf_details = Set(c); }
        if let Some(n) = changes.notes { am.notes = Set(n); }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&txn).await.map_err(db_err)?;

        if let Some(set) = changes.injections {
            // set replace, not merge
            models::injection::Entity::delete_many()
                .filter(models::injection::Column::AnimalId.eq(id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            for inj in set {
                injection_row(id, inj).insert(&txn).await.map_err(db_err)?;
            }
        }

        let injections = models::injection::Entity::find()
            .filter(models::injection::Column::AnimalId.eq(id))
            .all(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(Some(to_record(updated, injections)))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AnimalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let found = models::animal::Entity::find()
            .filter(models::animal::Column::Id.eq(id))
            .filter(models::animal::Column::OwnerId.eq(owner_id))
            .one(&txn)
            .await
            .map_err(db_err)?;
        let Some(found) = found else { return Ok(false) };

        // delete children first so the behavior does not depend on FK pragmas
        models::injection::Entity::delete_many()
            .filter(models::injection::Column::AnimalId.eq(found.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        models::animal::Entity::delete_by_id(found.id).exec(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }
}
