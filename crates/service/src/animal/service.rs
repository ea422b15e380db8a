use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::media::ImageStore;

use super::domain::{AnimalChanges, AnimalInput, AnimalRecord, InjectionInput, NewAnimal, NewInjection};
use super::errors::AnimalError;
use super::repository::AnimalRepository;

/// Husbandry business service. Owner scoping is enforced by the repository;
/// this layer owns input validation, the photo lifecycle and rollback of
/// stored files when a surrounding write fails.
pub struct AnimalService<R: AnimalRepository> {
    repo: Arc<R>,
    images: Arc<ImageStore>,
}

impl<R: AnimalRepository> AnimalService<R> {
    pub fn new(repo: Arc<R>, images: Arc<ImageStore>) -> Self {
        Self { repo, images }
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<AnimalRecord>, AnimalError> {
        self.repo.list_for_owner(owner_id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, owner_id: Uuid, input: AnimalInput) -> Result<AnimalRecord, AnimalError> {
        let name = required(input.name, "name")?;
        let animal_type = required(input.animal_type, "type")?;
        let inseminated_date = parse_optional_date(input.inseminated_date.as_deref(), "inseminatedDate")?;
        let delivery_date = parse_optional_date(input.delivery_date.as_deref(), "deliveryDate")?;
        let injections = parse_injections(input.injections.unwrap_or_default())?;

        // Photo storage is best-effort: a bad payload leaves photo_path empty
        // instead of failing the create.
        let photo_path = match input.photo_data.as_deref().filter(|p| !p.is_empty()) {
            Some(payload) => self.images.store(payload, &format!("animal_{name}")),
            None => None,
        };

        let new = NewAnimal {
            name,
            animal_type,
            photo_path: photo_path.clone(),
            inseminated_date,
            delivery_date,
            calf_details: none_if_empty(input.calf_details),
            notes: none_if_empty(input.notes),
            injections,
        };

        match self.repo.insert(owner_id, new).await {
            Ok(record) => {
                info!(animal_id = %record.id, %owner_id, "animal created");
                Ok(record)
            }
            Err(e) => {
                // the row never landed; do not leave the file behind
                if let Some(file) = photo_path {
                    self.images.delete(&file);
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, owner_id: Uuid, animal_id: Uuid, input: AnimalInput) -> Result<AnimalRecord, AnimalError> {
        let existing = self.repo.find_owned(animal_id, owner_id).await?.ok_or(AnimalError::NotFound)?;

        let mut changes = AnimalChanges::default();
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(AnimalError::Validation("name must not be empty".into()));
            }
            changes.name = Some(name);
        }
        if let Some(t) = input.animal_type {
            if t.trim().is_empty() {
                return Err(AnimalError::Validation("type must not be empty".into()));
            }
            changes.animal_type = Some(t);
        }
        if let Some(c) = input.calf_details {
            changes.calf_details = Some(if c.is_empty() { None } else { Some(c) });
        }
        if let Some(n) = input.notes {
            changes.notes = Some(if n.is_empty() { None } else { Some(n) });
        }
        if let Some(d) = input.inseminated_date {
            changes.inseminated_date = Some(parse_clearable_date(&d, "inseminatedDate")?);
        }
        if let Some(d) = input.delivery_date {
            changes.delivery_date = Some(parse_clearable_date(&d, "deliveryDate")?);
        }
        if let Some(list) = input.injections {
            changes.injections = Some(parse_injections(list)?);
        }

        // New photo first, then drop the old file; a failed store keeps the
        // previous photo in place.
        let mut stored_new: Option<String> = None;
        if let Some(payload) = input.photo_data.as_deref().filter(|p| !p.is_empty()) {
            let prefix = format!("animal_{}", changes.name.as_deref().unwrap_or(&existing.name));
            if let Some(file) = self.images.store(payload, &prefix) {
                if let Some(old) = existing.photo_path.as_deref() {
                    if old != file {
                        self.images.delete(old);
                    }
                }
                changes.photo_path = Some(file.clone());
                stored_new = Some(file);
            }
        }

        match self.repo.update(animal_id, owner_id, changes).await {
            Ok(Some(record)) => {
                info!(animal_id = %record.id, %owner_id, "animal updated");
                Ok(record)
            }
            Ok(None) => {
                if let Some(file) = stored_new {
                    self.images.delete(&file);
                }
                Err(AnimalError::NotFound)
            }
            Err(e) => {
                if let Some(file) = stored_new {
                    self.images.delete(&file);
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: Uuid, animal_id: Uuid) -> Result<(), AnimalError> {
        let existing = self.repo.find_owned(animal_id, owner_id).await?.ok_or(AnimalError::NotFound)?;
        if !self.repo.delete(animal_id, owner_id).await? {
            return Err(AnimalError::NotFound);
        }
        // file cleanup is best-effort; the record is already gone
        if let Some(photo) = existing.photo_path {
            self.images.delete(&photo);
        }
        info!(%animal_id, %owner_id, "animal deleted");
        Ok(())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AnimalError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AnimalError::Validation(format!("{field} is required"))),
    }
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AnimalError> {
    raw.parse::<NaiveDate>()
        .map_err(|_| AnimalError::Validation(format!("{field} must be an ISO date (yyyy-mm-dd)")))
}

fn parse_optional_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AnimalError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s, field).map(Some),
    }
}

fn parse_clearable_date(raw: &str, field: &str) -> Result<Option<NaiveDate>, AnimalError> {
    if raw.is_empty() { Ok(None) } else { parse_date(raw, field).map(Some) }
}

fn parse_injections(list: Vec<InjectionInput>) -> Result<Vec<NewInjection>, AnimalError> {
    list.into_iter()
        .map(|inj| {
            let date = inj
                .date
                .filter(|d| !d.is_empty())
                .ok_or_else(|| AnimalError::Validation("injection date is required".into()))?;
            let details = inj
                .details
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| AnimalError::Validation("injection details are required".into()))?;
            Ok(NewInjection { date: parse_date(&date, "injection date")?, details })
        })
        .collect()
}
