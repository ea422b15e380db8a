use thiserror::Error;

/// Business errors for the husbandry workflows. Absent and not-owned records
/// are the same `NotFound` on purpose.
#[derive(Debug, Error)]
pub enum AnimalError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("animal not found")]
    NotFound,
    #[error("repository error: {0}")]
    Repository(String),
}
