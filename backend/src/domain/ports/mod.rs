//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod import_metrics;
mod poi_discovery_source;
mod poi_import_command;
mod poi_repository;
mod project_link_repository;

#[cfg(test)]
pub use import_metrics::MockImportMetrics;
pub use import_metrics::{
    ImportMetrics, ImportMetricsError, ImportRunRecord, ImportRunStatus, NoOpImportMetrics,
};
#[cfg(test)]
pub use poi_discovery_source::MockPoiDiscoverySource;
pub use poi_discovery_source::{
    DiscoveryQuery, FixturePoiDiscoverySource, PoiDiscoverySource, PoiDiscoverySourceError,
};
#[cfg(test)]
pub use poi_import_command::MockPoiImportCommand;
pub use poi_import_command::{
    FixturePoiImportCommand, ImportMode, MistypedField, PoiImportCommand, PoiImportOutcome,
    PoiImportRequest,
};
#[cfg(test)]
pub use poi_repository::MockPoiRepository;
pub use poi_repository::{
    POI_ID_ALREADY_STORED, PoiRepository, PoiRepositoryError, PoiUpsertReport,
};
#[cfg(test)]
pub use project_link_repository::MockProjectLinkRepository;
pub use project_link_repository::{
    FixtureProjectLinkRepository, ProjectLinkRepository, ProjectLinkRepositoryError,
};
