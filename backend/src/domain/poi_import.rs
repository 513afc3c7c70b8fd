//! POI import orchestration.
//!
//! One run validates the request, fans out to the providers and the
//! prefetch concurrently, plans inserts and updates, and in commit mode
//! writes categories, then POIs, then project links.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::Error;
use super::geo::BoundingBox;
use super::place_type::PoiCategory;
use super::poi::{DiscoveredPoi, ExternalIdKind, PoiUpsertRecord};
use super::poi_dedup::{ImportPlan, plan_import};
use super::poi_import_validation::{ValidatedImportRequest, validate_import_request};
use super::ports::{
    DiscoveryQuery, ImportMetrics, ImportMode, ImportRunRecord, ImportRunStatus,
    NoOpImportMetrics, PoiDiscoverySource, PoiDiscoverySourceError, PoiImportCommand,
    PoiImportOutcome, PoiImportRequest, PoiRepository, PoiRepositoryError, ProjectLinkRepository,
    ProjectLinkRepositoryError,
};

/// Provider adapters used by an import.
///
/// Google Places is required; `None` means no API key is configured and
/// every import fails with `service_unavailable`.
#[derive(Clone)]
pub struct DiscoverySources {
    /// Google Places adapter.
    pub google: Option<Arc<dyn PoiDiscoverySource>>,
    /// Entur stop-place adapter.
    pub entur: Arc<dyn PoiDiscoverySource>,
    /// Bysykkel station adapter.
    pub bysykkel: Arc<dyn PoiDiscoverySource>,
}

/// Domain service implementing [`PoiImportCommand`].
#[derive(Clone)]
pub struct PoiImportService {
    sources: DiscoverySources,
    pois: Arc<dyn PoiRepository>,
    links: Arc<dyn ProjectLinkRepository>,
    metrics: Arc<dyn ImportMetrics>,
    clock: Arc<dyn Clock>,
}

impl PoiImportService {
    /// Create a service that records no metrics.
    pub fn new(
        sources: DiscoverySources,
        pois: Arc<dyn PoiRepository>,
        links: Arc<dyn ProjectLinkRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            pois,
            links,
            metrics: Arc::new(NoOpImportMetrics),
            clock,
        }
    }

    /// Replace the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn ImportMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    async fn run(&self, request: &ValidatedImportRequest) -> Result<RunResult, Error> {
        let google = self.sources.google.as_ref().ok_or_else(|| {
            Error::service_unavailable("Google Places API key is not configured")
        })?;

        let query = DiscoveryQuery {
            center: request.center,
            radius_m: request.radius_m,
            place_types: request.place_types.clone(),
        };
        let bounds = BoundingBox::around(request.center, f64::from(request.radius_m));

        let (google_found, entur_found, bysykkel_found, existing) = tokio::join!(
            google.discover(&query),
            discover_if(request.include_entur, self.sources.entur.as_ref(), &query),
            discover_if(request.include_bysykkel, self.sources.bysykkel.as_ref(), &query),
            self.pois.find_in_bounding_box(bounds),
        );
        let existing = existing.map_err(map_prefetch_error)?;

        let mut errors = Vec::new();
        let mut discovered = Vec::new();
        for (provider, found) in [
            (ExternalIdKind::Google, google_found),
            (ExternalIdKind::Entur, entur_found),
            (ExternalIdKind::Bysykkel, bysykkel_found),
        ] {
            match found {
                Ok(pois) => discovered.extend(pois),
                Err(err) => {
                    warn!(provider = provider.label(), error = %err, "POI discovery failed");
                    errors.push(format!("{} discovery failed: {err}", provider.label()));
                }
            }
        }

        let plan = plan_import(discovered, &existing);
        let mut outcome = PoiImportOutcome {
            mode: request.mode,
            stats: plan.stats.clone(),
            linked_to_project: None,
            errors,
        };
        if request.mode == ImportMode::Preview {
            return Ok(RunResult {
                outcome,
                written: 0,
            });
        }

        let written = self.commit(plan, request, &mut outcome).await?;
        Ok(RunResult { outcome, written })
    }

    async fn commit(
        &self,
        plan: ImportPlan,
        request: &ValidatedImportRequest,
        outcome: &mut PoiImportOutcome,
    ) -> Result<usize, Error> {
        let categories = distinct_categories(&plan);
        self.pois
            .upsert_categories(&categories)
            .await
            .map_err(map_write_error)?;

        let records = to_upsert_records(plan, self.clock.utc());
        let report = self
            .pois
            .upsert_pois(&records)
            .await
            .map_err(map_write_error)?;
        outcome.errors.extend(report.errors);

        if let Some(project_id) = request.project_id.as_deref() {
            outcome.linked_to_project = Some(
                self.link_to_project(project_id, &report.written_ids, &mut outcome.errors)
                    .await,
            );
        }
        Ok(report.written_ids.len())
    }

    async fn link_to_project(
        &self,
        project_id: &str,
        poi_ids: &[String],
        errors: &mut Vec<String>,
    ) -> usize {
        if poi_ids.is_empty() {
            return 0;
        }
        match self.links.link_pois(project_id, poi_ids).await {
            Ok(()) => poi_ids.len(),
            Err(err) => {
                warn!(project_id, error = %err, "linking imported POIs to project failed");
                errors.push(link_error_message(&err));
                0
            }
        }
    }

    async fn record(&self, mode: ImportMode, result: &Result<RunResult, Error>) {
        let run = match result {
            Ok(RunResult { outcome, written }) => ImportRunRecord {
                mode,
                status: if outcome.errors.is_empty() {
                    ImportRunStatus::Succeeded
                } else {
                    ImportRunStatus::Partial
                },
                new: outcome.stats.new,
                updated: outcome.stats.updated,
                written: *written,
            },
            Err(_) => ImportRunRecord {
                mode,
                status: ImportRunStatus::Failed,
                new: 0,
                updated: 0,
                written: 0,
            },
        };
        if let Err(err) = self.metrics.record_run(&run).await {
            warn!(error = %err, "failed to record import metrics");
        }
    }
}

struct RunResult {
    outcome: PoiImportOutcome,
    written: usize,
}

#[async_trait]
impl PoiImportCommand for PoiImportService {
    async fn import(&self, request: PoiImportRequest) -> Result<PoiImportOutcome, Error> {
        let request = validate_import_request(request)?;
        let result = self.run(&request).await;
        self.record(request.mode, &result).await;

        let RunResult { outcome, written } = result?;
        info!(
            mode = request.mode.as_str(),
            total = outcome.stats.total,
            new = outcome.stats.new,
            updated = outcome.stats.updated,
            written,
            linked = outcome.linked_to_project,
            errors = outcome.errors.len(),
            "POI import finished"
        );
        Ok(outcome)
    }
}

async fn discover_if(
    enabled: bool,
    source: &dyn PoiDiscoverySource,
    query: &DiscoveryQuery,
) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
    if enabled {
        source.discover(query).await
    } else {
        Ok(Vec::new())
    }
}

fn distinct_categories(plan: &ImportPlan) -> Vec<PoiCategory> {
    let mut categories = BTreeMap::new();
    let pois = plan
        .to_insert
        .iter()
        .chain(plan.to_update.iter().map(|update| &update.poi));
    for poi in pois {
        categories
            .entry(poi.category.id.as_str())
            .or_insert_with(|| poi.category.clone());
    }
    categories.into_values().collect()
}

fn to_upsert_records(
    plan: ImportPlan,
    imported_at: chrono::DateTime<chrono::Utc>,
) -> Vec<PoiUpsertRecord> {
    let inserts = plan
        .to_insert
        .into_iter()
        .map(|poi| poi.into_insert_record(imported_at));
    let updates = plan
        .to_update
        .into_iter()
        .map(|update| update.poi.into_update_record(update.existing_id, imported_at));
    inserts.chain(updates).collect()
}

fn link_error_message(err: &ProjectLinkRepositoryError) -> String {
    match err {
        ProjectLinkRepositoryError::ProjectNotFound { project_id } => {
            format!("project {project_id} not found; POIs were imported but not linked")
        }
        other => format!("project link failed: {other}"),
    }
}

fn map_prefetch_error(error: PoiRepositoryError) -> Error {
    match error {
        PoiRepositoryError::Connection { message } => Error::service_unavailable(format!(
            "existing POIs could not be loaded: {message}"
        )),
        PoiRepositoryError::Query { message } => {
            Error::internal(format!("existing POIs could not be loaded: {message}"))
        }
    }
}

fn map_write_error(error: PoiRepositoryError) -> Error {
    match error {
        PoiRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("POI store unavailable: {message}"))
        }
        PoiRepositoryError::Query { message } => {
            Error::internal(format!("POI write failed: {message}"))
        }
    }
}

#[cfg(test)]
#[path = "poi_import_tests.rs"]
mod tests;
