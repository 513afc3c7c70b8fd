//! Driving port for the admin POI import.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::geo::Coordinates;
use crate::domain::poi_dedup::ImportStats;

/// Import request as submitted, before validation.
///
/// Required fields are optional here so that every missing or malformed
/// field is reported together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiImportRequest {
    /// Search center.
    #[serde(default)]
    pub center: Option<Coordinates>,
    /// Search radius in metres.
    #[serde(default)]
    pub radius_meters: Option<i64>,
    /// Google place types to import.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    /// Whether to include Entur stop places.
    #[serde(default = "default_true")]
    pub include_entur: bool,
    /// Whether to include Bysykkel stations.
    #[serde(default = "default_true")]
    pub include_bysykkel: bool,
    /// Project to link written POIs to.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Compute stats without writing.
    #[serde(default)]
    pub preview: bool,
    /// Fields left unset because the submitted value had the wrong type.
    #[serde(skip)]
    pub mistyped_fields: Vec<MistypedField>,
}

/// A submitted field whose value had the wrong JSON type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MistypedField {
    /// Field name as submitted, such as `radiusMeters`.
    pub field: String,
    /// Decoder message.
    pub message: String,
}

fn default_true() -> bool {
    true
}

impl Default for PoiImportRequest {
    fn default() -> Self {
        Self {
            center: None,
            radius_meters: None,
            categories: None,
            include_entur: true,
            include_bysykkel: true,
            project_id: None,
            preview: false,
            mistyped_fields: Vec::new(),
        }
    }
}

/// Whether an import writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Discover and categorise only.
    Preview,
    /// Discover, categorise, and write.
    Commit,
}

impl ImportMode {
    /// Metric and log label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Commit => "commit",
        }
    }
}

/// Result of one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiImportOutcome {
    /// Mode the run executed in.
    pub mode: ImportMode,
    /// Counts from deduplication.
    pub stats: ImportStats,
    /// POIs linked to the requested project; absent without a project.
    pub linked_to_project: Option<usize>,
    /// Non-fatal problems: provider failures, failed rows, link failures.
    pub errors: Vec<String>,
}

/// Driving port for running an import.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiImportCommand: Send + Sync {
    /// Validate, discover, deduplicate, and (in commit mode) write.
    async fn import(&self, request: PoiImportRequest) -> Result<PoiImportOutcome, Error>;
}

/// Fixture command that reports an empty run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePoiImportCommand;

#[async_trait]
impl PoiImportCommand for FixturePoiImportCommand {
    async fn import(&self, request: PoiImportRequest) -> Result<PoiImportOutcome, Error> {
        let mode = if request.preview {
            ImportMode::Preview
        } else {
            ImportMode::Commit
        };
        Ok(PoiImportOutcome {
            mode,
            stats: ImportStats::default(),
            linked_to_project: None,
            errors: Vec::new(),
        })
    }
}
