use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "animals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub animal_type: String,
    pub photo_path: Option<String>,
    pub inseminated_date: Option<Date>,
    pub delivery_date: Option<Date>,
    #[sea_orm(column_type = "Text", nullable)]
    pub calf_details: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
    Injections,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(super::user::Entity)
                .from(Column::OwnerId)
                .to(super::user::Column::Id)
                .into(),
            Relation::Injections => Entity::has_many(super::injection::Entity).into(),
        }
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Owner.def() }
}

impl Related<super::injection::Entity> for Entity {
    fn to() -> RelationDef { Relation::Injections.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    Ok(())
}

pub fn validate_animal_type(animal_type: &str) -> Result<(), errors::ModelError> {
    if animal_type.trim().is_empty() {
        return Err(errors::ModelError::Validation("animal type required".into()));
    }
    Ok(())
}
