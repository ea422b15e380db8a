use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AnimalChanges, AnimalRecord, NewAnimal};
use super::errors::AnimalError;

/// Repository abstraction for animal persistence. Every lookup is scoped to
/// an owner in a single filter, never fetch-then-compare.
#[async_trait]
pub trait AnimalRepository: Send + Sync {
    /// All animals of one owner, newest created first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<AnimalRecord>, AnimalError>;
    /// Owner-scoped single lookup; absent and not-owned are the same `None`.
    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<AnimalRecord>, AnimalError>;
    /// Insert the animal and its injections in one transaction.
    async fn insert(&self, owner_id: Uuid, animal: NewAnimal) -> Result<AnimalRecord, AnimalError>;
    /// Apply changes in one transaction, replacing the injection set when one
    /// is supplied. `None` when the animal is not owned by `owner_id`.
    async fn update(&self, id: Uuid, owner_id: Uuid, changes: AnimalChanges) -> Result<Option<AnimalRecord>, AnimalError>;
    /// Remove the animal and its injections. `false` when not owned.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AnimalError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::animal::domain::InjectionRecord;

    #[derive(Default)]
    pub struct MockAnimalRepository {
        /// (owner_id, record) in insertion order; listing walks it newest-first.
        animals: Mutex<Vec<(Uuid, AnimalRecord)>>,
    }

    fn apply(record: &mut AnimalRecord, changes: AnimalChanges) {
        if let Some(name) = changes.name { record.name = name; }
        if let Some(t) = changes.animal_type { record.animal_type = t; }
        if let Some(p) = changes.photo_path { record.photo_path = Some(p); }
        if let Some(d) = changes.inseminated_date { record.inseminated_date = d; }
        if let Some(d) = changes.delivery_date { record.delivery_date = d; }
        if let Some(c) = changes.calf_details { record.calf_details = c; }
        if let Some(n) = changes.notes { record.notes = n; }
        if let Some(set) = changes.injections {
            record.injections = set
                .into_iter()
                .map(|i| InjectionRecord { id: Uuid::new_v4(), date: i.date, details: i.details })
                .collect();
        }
        record.updated_at = Utc::now();
    }

    #[async_trait]
    impl AnimalRepository for MockAnimalRepository {
        async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<AnimalRecord>, AnimalError> {
            let animals = self.animals.lock().unwrap();
            Ok(animals
                .iter()
                .rev()
                .filter(|(owner, _)| *owner == owner_id)
                .map(|(_, rec)| rec.clone())
                .collect())
        }

        async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<AnimalRecord>, AnimalError> {
            let animals = self.animals.lock().unwrap();
            Ok(animals
                .iter()
                .find(|(owner, rec)| rec.id == id && *owner == owner_id)
                .map(|(_, rec)| rec.clone()))
        }

        async fn insert(&self, owner_id: Uuid, animal: NewAnimal) -> Result<AnimalRecord, AnimalError> {
            let now = Utc::now();
            let record = AnimalRecord {
                id: Uuid::new_v4(),
                name: animal.name,
                animal_type: animal.animal_type,
                photo_path: animal.photo_path,
                inseminated_date: animal.inseminated_date,
                delivery_date: animal.delivery_date,
                calf_details: animal.calf_details,
                notes: animal.notes,
                injections: animal
                    .injections
                    .into_iter()
                    .map(|i| InjectionRecord { id: Uuid::new_v4(), date: i.date, details: i.details })
                    .collect(),
                created_at: now,
                updated_at: now,
            };
            self.animals.lock().unwrap().push((owner_id, record.clone()));
            Ok(record)
        }

        async fn update(&self, id: Uuid, owner_id: Uuid, changes: AnimalChanges) -> Result<Option<AnimalRecord>, AnimalError> {
            let mut animals = self.animals.lock().unwrap();
            match animals.iter_mut().find(|(owner, rec)| rec.id == id && *owner == owner_id) {
                Some((_, rec)) => {
                    apply(rec, changes);
                    Ok(Some(rec.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AnimalError> {
            let mut animals = self.animals.lock().unwrap();
            let before = animals.len();
            animals.retain(|(owner, rec)| !(rec.id == id && *owner == owner_id));
            Ok(animals.len() != before)
        }
    }
}
