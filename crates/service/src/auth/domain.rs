use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User as exposed through the API; secrets never leave the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub name: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// User plus the fields the service needs and the API never returns.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
    pub verification_code: Option<String>,
}

/// Registration input. Fields are optional at the wire level so a missing
/// field surfaces as a validation error rather than a deserialize rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Registration outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user_id: Uuid,
    pub requires_verification: bool,
}
