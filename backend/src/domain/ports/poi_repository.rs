//! Driven port for reading and writing stored POIs.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::geo::BoundingBox;
use crate::domain::place_type::PoiCategory;
use crate::domain::poi::{ExistingPoi, PoiUpsertRecord};

define_port_error! {
    /// Errors raised by POI persistence.
    pub enum PoiRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "poi store connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } =>
            "poi store query failed: {message}",
    }
}

/// Per-row error for an insert whose id already belongs to a stored POI.
pub const POI_ID_ALREADY_STORED: &str =
    "id already belongs to a stored POI outside this import; row left unchanged";

/// Result of writing a batch of POIs row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoiUpsertReport {
    /// Ids of rows written successfully, in input order.
    pub written_ids: Vec<String>,
    /// One `"<poi id>: <message>"` entry per failed row.
    pub errors: Vec<String>,
}

impl PoiUpsertReport {
    /// Record a failed row.
    pub fn push_error(&mut self, poi_id: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("{poi_id}: {message}"));
    }
}

/// Port for the POI store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiRepository: Send + Sync {
    /// Load dedup projections for rows whose position lies inside `bounds`.
    async fn find_in_bounding_box(
        &self,
        bounds: BoundingBox,
    ) -> Result<Vec<ExistingPoi>, PoiRepositoryError>;

    /// Insert categories, refreshing name, icon, and color when they exist.
    async fn upsert_categories(&self, categories: &[PoiCategory]) -> Result<(), PoiRepositoryError>;

    /// Write each record by id, leaving editorial columns alone.
    ///
    /// [`Update`](crate::domain::poi::WriteIntent::Update) records insert or refresh their row.
    /// [`Insert`](crate::domain::poi::WriteIntent::Insert) records never touch an existing row; a taken
    /// id is reported with [`POI_ID_ALREADY_STORED`].
    ///
    /// Per-row failures land in the report. `Err` means nothing could be
    /// attempted.
    async fn upsert_pois(
        &self,
        records: &[PoiUpsertRecord],
    ) -> Result<PoiUpsertReport, PoiRepositoryError>;
}
