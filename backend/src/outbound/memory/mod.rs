//! In-process POI store.
//!
//! Used when no database URL is configured and by behaviour tests. It
//! enforces the same rules as the PostgreSQL schema: category foreign keys,
//! one row per provider id, and editor-owned columns that imports never
//! touch.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::geo::BoundingBox;
use crate::domain::place_type::PoiCategory;
use crate::domain::poi::{
    EditorialFields, ExistingPoi, ExternalIdKind, PoiUpsertRecord, StoredPoi, WriteIntent,
};
use crate::domain::ports::{
    POI_ID_ALREADY_STORED, PoiRepository, PoiRepositoryError, PoiUpsertReport, ProjectLinkRepository,
    ProjectLinkRepositoryError,
};

#[derive(Debug, Default)]
struct StoreState {
    categories: BTreeMap<String, PoiCategory>,
    pois: BTreeMap<String, StoredPoi>,
    projects: BTreeSet<String>,
    links: BTreeSet<(String, String)>,
}

impl StoreState {
    fn conflicting_identity(&self, record: &PoiUpsertRecord) -> Option<ExternalIdKind> {
        ExternalIdKind::PRIORITY.into_iter().find(|kind| {
            record.external_ids.get(*kind).is_some_and(|external| {
                self.pois.values().any(|stored| {
                    stored.record.id != record.id
                        && stored.record.external_ids.get(*kind) == Some(external)
                })
            })
        })
    }

    fn upsert(&mut self, record: &PoiUpsertRecord) -> Result<(), String> {
        if !self.categories.contains_key(&record.category_id) {
            return Err(format!("category {} does not exist", record.category_id));
        }
        if record.intent == WriteIntent::Insert && self.pois.contains_key(&record.id) {
            return Err(POI_ID_ALREADY_STORED.to_owned());
        }
        if let Some(kind) = self.conflicting_identity(record) {
            return Err(format!(
                "{} id is already used by another POI",
                kind.id_prefix()
            ));
        }
        match self.pois.get_mut(&record.id) {
            Some(stored) => stored.apply_import(record.clone()),
            None => {
                self.pois
                    .insert(record.id.clone(), StoredPoi::from_import(record.clone()));
            }
        }
        Ok(())
    }
}

/// Shared in-memory store implementing the POI and project-link ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPoiStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryPoiStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory poi store lock poisoned".to_owned())
    }

    /// Register a project POIs can be linked to.
    pub fn add_project(&self, project_id: impl Into<String>) {
        if let Ok(mut state) = self.lock() {
            state.projects.insert(project_id.into());
        }
    }

    /// Overwrite editorial columns, as an editor would. Returns `false` when
    /// no POI has that id.
    pub fn set_editorial(&self, poi_id: &str, editorial: EditorialFields) -> bool {
        let Ok(mut state) = self.lock() else {
            return false;
        };
        match state.pois.get_mut(poi_id) {
            Some(stored) => {
                stored.editorial = editorial;
                true
            }
            None => false,
        }
    }

    /// Stored POI by id.
    pub fn poi(&self, poi_id: &str) -> Option<StoredPoi> {
        self.lock().ok()?.pois.get(poi_id).cloned()
    }

    /// Every stored POI, ordered by id.
    pub fn pois(&self) -> Vec<StoredPoi> {
        self.lock()
            .map(|state| state.pois.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Ids of POIs linked to `project_id`.
    pub fn project_poi_ids(&self, project_id: &str) -> Vec<String> {
        self.lock()
            .map(|state| {
                state
                    .links
                    .iter()
                    .filter(|(project, _)| project == project_id)
                    .map(|(_, poi)| poi.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl PoiRepository for InMemoryPoiStore {
    async fn find_in_bounding_box(
        &self,
        bounds: BoundingBox,
    ) -> Result<Vec<ExistingPoi>, PoiRepositoryError> {
        let state = self.lock().map_err(PoiRepositoryError::connection)?;
        Ok(state
            .pois
            .values()
            .filter(|stored| bounds.contains(stored.record.coordinates))
            .map(StoredPoi::as_existing)
            .collect())
    }

    async fn upsert_categories(
        &self,
        categories: &[PoiCategory],
    ) -> Result<(), PoiRepositoryError> {
        let mut state = self.lock().map_err(PoiRepositoryError::connection)?;
        for category in categories {
            state
                .categories
                .insert(category.id.clone(), category.clone());
        }
        Ok(())
    }

    async fn upsert_pois(
        &self,
        records: &[PoiUpsertRecord],
    ) -> Result<PoiUpsertReport, PoiRepositoryError> {
        let mut state = self.lock().map_err(PoiRepositoryError::connection)?;
        let mut report = PoiUpsertReport::default();
        for record in records {
            match state.upsert(record) {
                Ok(()) => report.written_ids.push(record.id.clone()),
                Err(message) => report.push_error(&record.id, message),
            }
        }
        Ok(report)
    }
}

#[async_trait]
impl ProjectLinkRepository for InMemoryPoiStore {
    async fn link_pois(
        &self,
        project_id: &str,
        poi_ids: &[String],
    ) -> Result<(), ProjectLinkRepositoryError> {
        let mut state = self.lock().map_err(ProjectLinkRepositoryError::connection)?;
        if !state.projects.contains(project_id) {
            return Err(ProjectLinkRepositoryError::project_not_found(project_id));
        }
        for poi_id in poi_ids {
            state
                .links
                .insert((project_id.to_owned(), poi_id.clone()));
        }
        Ok(())
    }
}
