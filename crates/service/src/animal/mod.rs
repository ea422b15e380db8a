//! Husbandry module: owner-scoped animal records with embedded injection
//! logs and a photo lifecycle tied to the record.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::AnimalService;
