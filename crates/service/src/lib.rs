//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod auth;
pub mod client_service;
pub mod enrollment_service;
pub mod errors;
pub mod pagination;
pub mod program_service;
pub mod sort;
#[cfg(test)]
pub mod test_support;
pub mod user_service;
