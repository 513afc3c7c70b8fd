//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **google_places**, **entur**, **bysykkel**: HTTP discovery sources
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process store used without a database
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod bysykkel;
pub mod entur;
pub mod google_places;
pub(crate) mod http_support;
pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
