use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Animal as exposed through the API, injections embedded.
#[derive(Debug, Clone, Serialize)]
pub struct AnimalRecord {
    pub id: Uuid,
    pub name: String,
    pub animal_type: String,
    pub photo_path: Option<String>,
    pub inseminated_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub calf_details: Option<String>,
    pub notes: Option<String>,
    pub injections: Vec<InjectionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InjectionRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub details: String,
}

/// Raw request payload shared by create and update; every field optional so
/// the service can tell "absent" from "supplied". Names follow the client
/// contract.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimalInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub animal_type: Option<String>,
    #[serde(rename = "calfDetails")]
    pub calf_details: Option<String>,
    pub notes: Option<String>,
    #[serde(rename = "inseminatedDate")]
    pub inseminated_date: Option<String>,
    #[serde(rename = "deliveryDate")]
    pub delivery_date: Option<String>,
    #[serde(rename = "photoData")]
    pub photo_data: Option<String>,
    pub injections: Option<Vec<InjectionInput>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InjectionInput {
    pub date: Option<String>,
    pub details: Option<String>,
}

/// Validated creation payload handed to the repository.
#[derive(Debug, Clone, Default)]
pub struct NewAnimal {
    pub name: String,
    pub animal_type: String,
    pub photo_path: Option<String>,
    pub inseminated_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub calf_details: Option<String>,
    pub notes: Option<String>,
    pub injections: Vec<NewInjection>,
}

#[derive(Debug, Clone)]
pub struct NewInjection {
    pub date: NaiveDate,
    pub details: String,
}

/// Partial update. Outer `None` leaves a field untouched; `Some(None)` on a
/// clearable field stores NULL. A supplied injection list replaces the whole
/// set.
#[derive(Debug, Clone, Default)]
pub struct AnimalChanges {
    pub name: Option<String>,
    pub animal_type: Option<String>,
    pub photo_path: Option<String>,
    pub inseminated_date: Option<Option<NaiveDate>>,
    pub delivery_date: Option<Option<NaiveDate>>,
    pub calf_details: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub injections: Option<Vec<NewInjection>>,
}
