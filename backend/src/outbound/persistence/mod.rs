//! PostgreSQL persistence adapters using Diesel with `diesel-async` and bb8.
//!
//! Row structs and table definitions stay private to this module; the
//! repositories translate to and from domain types.

pub(crate) mod diesel_helpers;
mod diesel_poi_repository;
mod diesel_project_link_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_poi_repository::DieselPoiRepository;
pub use diesel_project_link_repository::DieselProjectLinkRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
