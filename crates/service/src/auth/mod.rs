//! Auth module: three-layer architecture (domain, repository, service).
//!
//! This module centralizes registration, login and refresh-token business
//! logic under the service crate.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::AuthService;
