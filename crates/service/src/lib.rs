//! Business services on top of the entity layer.
//! - Separates husbandry and account logic from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Side-effect collaborators (notifier, sessions, image store) are injected
//!   so every service runs against fakes in tests.

pub mod animal;
pub mod attempt;
pub mod auth;
pub mod media;
pub mod notify;
pub mod session;
