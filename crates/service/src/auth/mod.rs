//! Account module: three-layer architecture (domain, repository, service).
//!
//! Registration, verification and login business logic lives here, behind a
//! repository trait so the HTTP layer and tests stay storage-agnostic.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::AuthService;
