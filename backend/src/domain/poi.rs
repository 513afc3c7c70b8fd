//! POI records as they move through discovery, deduplication, and storage.
//!
//! Three shapes exist on purpose:
//! - [`DiscoveredPoi`]: normalised provider output, lives for one request.
//! - [`ExistingPoi`]: the slice of a stored row needed to deduplicate.
//! - [`PoiUpsertRecord`]: what the import path may write. It has no editorial
//!   columns, so an import cannot overwrite them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::Coordinates;
use super::place_type::PoiCategory;

/// Provider families that assign external identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalIdKind {
    /// Google Places `place_id`.
    Google,
    /// Entur `NSR:StopPlace` identifier.
    Entur,
    /// Bysykkel GBFS `station_id`, prefixed with the operator system key.
    Bysykkel,
}

impl ExternalIdKind {
    /// Order in which identifiers are probed when matching a discovered POI
    /// against stored ones. The first hit wins.
    pub const PRIORITY: [Self; 3] = [Self::Google, Self::Entur, Self::Bysykkel];

    /// Prefix of internal ids minted for POIs first seen through this provider.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Entur => "entur",
            Self::Bysykkel => "bysykkel",
        }
    }

    /// Human-readable provider name used in log fields and error strings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Google => "google places",
            Self::Entur => "entur",
            Self::Bysykkel => "bysykkel",
        }
    }
}

/// External identifiers a POI may carry, one slot per provider family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    /// Google Places identifier.
    pub google_place_id: Option<String>,
    /// Entur stop place identifier.
    pub entur_stopplace_id: Option<String>,
    /// Bysykkel station identifier.
    pub bysykkel_station_id: Option<String>,
}

impl ExternalIds {
    /// Identifier set with exactly one slot filled.
    #[must_use]
    pub fn single(kind: ExternalIdKind, id: impl Into<String>) -> Self {
        let mut ids = Self::default();
        *ids.slot_mut(kind) = Some(id.into());
        ids
    }

    /// Identifier stored for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: ExternalIdKind) -> Option<&str> {
        match kind {
            ExternalIdKind::Google => self.google_place_id.as_deref(),
            ExternalIdKind::Entur => self.entur_stopplace_id.as_deref(),
            ExternalIdKind::Bysykkel => self.bysykkel_station_id.as_deref(),
        }
    }

    fn slot_mut(&mut self, kind: ExternalIdKind) -> &mut Option<String> {
        match kind {
            ExternalIdKind::Google => &mut self.google_place_id,
            ExternalIdKind::Entur => &mut self.entur_stopplace_id,
            ExternalIdKind::Bysykkel => &mut self.bysykkel_station_id,
        }
    }
}

/// Provider record normalised into the shared shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredPoi {
    /// Internal id this POI gets if it is inserted.
    pub id: String,
    /// Provider identifiers.
    pub external_ids: ExternalIds,
    /// Display name.
    pub name: String,
    /// Position.
    pub coordinates: Coordinates,
    /// Street address, when the provider has one.
    pub address: Option<String>,
    /// Category the POI is filed under.
    pub category: PoiCategory,
    /// Google rating (1.0 to 5.0).
    pub google_rating: Option<f64>,
    /// Number of Google reviews behind the rating.
    pub google_review_count: Option<u32>,
    /// Provider photo reference.
    pub photo_reference: Option<String>,
}

impl DiscoveredPoi {
    /// Build a record discovered through `kind` with the given external id.
    ///
    /// # Examples
    /// ```
    /// use placy::domain::geo::Coordinates;
    /// use placy::domain::place_type::PlaceType;
    /// use placy::domain::poi::{DiscoveredPoi, ExternalIdKind};
    ///
    /// let poi = DiscoveredPoi::new(
    ///     ExternalIdKind::Google,
    ///     "ChIJ123",
    ///     "Dromedar Kaffebar",
    ///     Coordinates::new(63.4305, 10.3951),
    ///     PlaceType::Cafe.category(),
    /// );
    /// assert_eq!(poi.id, "google-ChIJ123");
    /// assert_eq!(poi.external_ids.google_place_id.as_deref(), Some("ChIJ123"));
    /// ```
    #[must_use]
    pub fn new(
        kind: ExternalIdKind,
        external_id: impl Into<String>,
        name: impl Into<String>,
        coordinates: Coordinates,
        category: PoiCategory,
    ) -> Self {
        let external_id = external_id.into();
        Self {
            id: format!("{}-{external_id}", kind.id_prefix()),
            external_ids: ExternalIds::single(kind, external_id),
            name: name.into(),
            coordinates,
            address: None,
            category,
            google_rating: None,
            google_review_count: None,
            photo_reference: None,
        }
    }

    /// Set the street address.
    #[must_use]
    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    /// Set Google rating data.
    #[must_use]
    pub fn with_rating(mut self, rating: Option<f64>, review_count: Option<u32>) -> Self {
        self.google_rating = rating;
        self.google_review_count = review_count;
        self
    }

    /// Set the photo reference.
    #[must_use]
    pub fn with_photo_reference(mut self, photo_reference: Option<String>) -> Self {
        self.photo_reference = photo_reference;
        self
    }

    /// Writable record for a POI no stored row matched. Keeps the minted id.
    #[must_use]
    pub fn into_insert_record(self, imported_at: DateTime<Utc>) -> PoiUpsertRecord {
        let id = self.id.clone();
        self.into_record(id, WriteIntent::Insert, imported_at)
    }

    /// Writable record refreshing the stored row `existing_id`.
    #[must_use]
    pub fn into_update_record(
        self,
        existing_id: String,
        imported_at: DateTime<Utc>,
    ) -> PoiUpsertRecord {
        self.into_record(existing_id, WriteIntent::Update, imported_at)
    }

    fn into_record(
        self,
        id: String,
        intent: WriteIntent,
        imported_at: DateTime<Utc>,
    ) -> PoiUpsertRecord {
        PoiUpsertRecord {
            id,
            intent,
            name: self.name,
            coordinates: self.coordinates,
            address: self.address,
            category_id: self.category.id,
            external_ids: self.external_ids,
            google_rating: self.google_rating,
            google_review_count: self.google_review_count,
            photo_reference: self.photo_reference,
            imported_at,
        }
    }
}

/// Stored POI projection used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingPoi {
    /// Internal id.
    pub id: String,
    /// Provider identifiers recorded on the row.
    pub external_ids: ExternalIds,
}

/// How a record may touch the row with its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteIntent {
    /// New row. A stored row with the same id is left alone and the record
    /// is reported as failed.
    Insert,
    /// Refresh of a row the deduplication matched.
    Update,
}

/// Columns an automated import is allowed to write.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiUpsertRecord {
    /// Internal id; existing for updates, minted for inserts.
    pub id: String,
    /// Whether the row may already exist.
    pub intent: WriteIntent,
    /// Display name.
    pub name: String,
    /// Position.
    pub coordinates: Coordinates,
    /// Street address.
    pub address: Option<String>,
    /// Category foreign key.
    pub category_id: String,
    /// Provider identifiers.
    pub external_ids: ExternalIds,
    /// Google rating.
    pub google_rating: Option<f64>,
    /// Google review count.
    pub google_review_count: Option<u32>,
    /// Provider photo reference.
    pub photo_reference: Option<String>,
    /// When this import ran.
    pub imported_at: DateTime<Utc>,
}

/// Human-curated POI content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorialFields {
    /// Short editorial hook shown on cards.
    pub editorial_hook: Option<String>,
    /// Local insight written by an editor.
    pub local_insight: Option<String>,
    /// Ordering weight in story layouts.
    pub story_priority: Option<i32>,
}

/// Full stored POI row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoi {
    /// Automated columns, as last written.
    pub record: PoiUpsertRecord,
    /// Editorial columns.
    pub editorial: EditorialFields,
}

impl StoredPoi {
    /// Row created by a first import: editorial columns start empty.
    #[must_use]
    pub fn from_import(record: PoiUpsertRecord) -> Self {
        Self {
            record,
            editorial: EditorialFields::default(),
        }
    }

    /// Apply a re-import. Only automated columns change, and external ids
    /// missing from `record` keep their stored values.
    pub fn apply_import(&mut self, mut record: PoiUpsertRecord) {
        for kind in ExternalIdKind::PRIORITY {
            if record.external_ids.get(kind).is_none() {
                let kept = self.record.external_ids.slot_mut(kind).take();
                *record.external_ids.slot_mut(kind) = kept;
            }
        }
        self.record = record;
    }

    /// Projection used for deduplication.
    #[must_use]
    pub fn as_existing(&self) -> ExistingPoi {
        ExistingPoi {
            id: self.record.id.clone(),
            external_ids: self.record.external_ids.clone(),
        }
    }
}
