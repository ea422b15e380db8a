use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use service::animal::errors::AnimalError;
use service::auth::errors::AuthError;

/// Request-level error taxonomy. Every response body carries a stable `code`
/// next to the human-readable message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("account not verified")]
    Forbidden { user_id: Uuid },
    #[error("{0}")]
    NotFound(String),
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Auth(_) => "auth_error",
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Forbidden { user_id } => serde_json::json!({
                "error": self.to_string(),
                "code": self.code(),
                "user_id": user_id,
                "requires_verification": true,
            }),
            ApiError::Internal(detail) => {
                // detail goes to the log, not the client
                error!(error = %detail, "request failed");
                serde_json::json!({"error": "internal error", "code": self.code()})
            }
            _ => serde_json::json!({"error": self.to_string(), "code": self.code()}),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => ApiError::Validation(msg),
            AuthError::Conflict => ApiError::Validation("email already registered".into()),
            AuthError::NotFound => ApiError::NotFound("user not found".into()),
            AuthError::InvalidCredentials => ApiError::Auth("invalid credentials".into()),
            AuthError::Unverified { user_id } => ApiError::Forbidden { user_id },
            AuthError::Hash(msg) | AuthError::Repository(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AnimalError> for ApiError {
    fn from(e: AnimalError) -> Self {
        match e {
            AnimalError::Validation(msg) => ApiError::Validation(msg),
            AnimalError::NotFound => ApiError::NotFound("animal not found".into()),
            AnimalError::Repository(msg) => ApiError::Internal(msg),
        }
    }
}
