use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use uuid::Uuid;

use service::animal::domain::AnimalInput;

use crate::auth::ServerState;
use crate::errors::ApiError;

pub async fn list_animals(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let owner_id = state.session_user(&jar).await?;
    let animals = state.animal_service().list(owner_id).await?;
    Ok(Json(json!({"animals": animals})))
}

pub async fn create_animal(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<AnimalInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let owner_id = state.session_user(&jar).await?;
    let animal = state.animal_service().create(owner_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "animal created successfully", "animal": animal})),
    ))
}

pub async fn update_animal(
    State(state): State<ServerState>,
    Path(animal_id): Path<Uuid>,
    jar: CookieJar,
    Json(input): Json<AnimalInput>,
) -> Result<Json<Value>, ApiError> {
    let owner_id = state.session_user(&jar).await?;
    let animal = state.animal_service().update(owner_id, animal_id, input).await?;
    Ok(Json(json!({"message": "animal updated successfully", "animal": animal})))
}

pub async fn delete_animal(
    State(state): State<ServerState>,
    Path(animal_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let owner_id = state.session_user(&jar).await?;
    state.animal_service().delete(owner_id, animal_id).await?;
    Ok(Json(json!({"message": "animal deleted successfully"})))
}
