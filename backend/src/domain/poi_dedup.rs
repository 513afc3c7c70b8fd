//! Splits discovered POIs into inserts and updates.
//!
//! Matching is by external provider id only. Identifiers are probed in
//! [`ExternalIdKind::PRIORITY`] order and the first hit wins, so a POI that
//! carries both a Google and an Entur id resolves to whichever stored row
//! owns the Google id.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::poi::{DiscoveredPoi, ExistingPoi, ExternalIdKind, ExternalIds};

/// Counts reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Unique POIs discovered.
    pub total: usize,
    /// POI count per category id.
    pub by_category: BTreeMap<String, usize>,
    /// POIs with no stored match.
    pub new: usize,
    /// POIs matched to a stored row.
    pub updated: usize,
}

/// Discovered POI matched to a stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    /// Internal id of the stored row.
    pub existing_id: String,
    /// Fresh provider data for that row.
    pub poi: DiscoveredPoi,
}

/// Outcome of [`plan_import`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    /// POIs to create under their minted ids.
    pub to_insert: Vec<DiscoveredPoi>,
    /// POIs to refresh under an existing id.
    pub to_update: Vec<PlannedUpdate>,
    /// Aggregated counts.
    pub stats: ImportStats,
}

struct ExistingIndex<'a> {
    by_kind: [HashMap<&'a str, &'a str>; 3],
}

impl<'a> ExistingIndex<'a> {
    fn build(existing: &'a [ExistingPoi]) -> Self {
        let mut by_kind: [HashMap<&'a str, &'a str>; 3] = Default::default();
        for poi in existing {
            for (slot, kind) in ExternalIdKind::PRIORITY.iter().enumerate() {
                if let Some(external) = poi.external_ids.get(*kind) {
                    by_kind[slot].entry(external).or_insert(poi.id.as_str());
                }
            }
        }
        Self { by_kind }
    }

    fn lookup(&self, ids: &ExternalIds) -> Option<&'a str> {
        ExternalIdKind::PRIORITY
            .iter()
            .zip(&self.by_kind)
            .find_map(|(kind, index)| ids.get(*kind).and_then(|id| index.get(id).copied()))
    }
}

/// Drop repeated internal ids, keeping the first occurrence.
///
/// Google returns the same place once per matching type, so a café that is
/// also a bakery would otherwise be counted and written twice.
#[must_use]
pub fn collapse_duplicates(discovered: Vec<DiscoveredPoi>) -> Vec<DiscoveredPoi> {
    let mut seen = HashSet::with_capacity(discovered.len());
    discovered
        .into_iter()
        .filter(|poi| seen.insert(poi.id.clone()))
        .collect()
}

/// Categorise `discovered` against `existing`.
///
/// # Examples
/// ```
/// use placy::domain::geo::Coordinates;
/// use placy::domain::place_type::PlaceType;
/// use placy::domain::poi::{DiscoveredPoi, ExistingPoi, ExternalIdKind, ExternalIds};
/// use placy::domain::poi_dedup::plan_import;
///
/// let poi = DiscoveredPoi::new(
///     ExternalIdKind::Google,
///     "abc",
///     "Kafe",
///     Coordinates::new(63.43, 10.39),
///     PlaceType::Cafe.category(),
/// );
/// let existing = [ExistingPoi {
///     id: "legacy-1".into(),
///     external_ids: ExternalIds::single(ExternalIdKind::Google, "abc"),
/// }];
///
/// let plan = plan_import(vec![poi], &existing);
/// assert_eq!(plan.to_update[0].existing_id, "legacy-1");
/// assert_eq!(plan.stats.updated, 1);
/// ```
#[must_use]
pub fn plan_import(discovered: Vec<DiscoveredPoi>, existing: &[ExistingPoi]) -> ImportPlan {
    let index = ExistingIndex::build(existing);
    let mut plan = ImportPlan::default();

    for poi in collapse_duplicates(discovered) {
        *plan
            .stats
            .by_category
            .entry(poi.category.id.clone())
            .or_default() += 1;
        match index.lookup(&poi.external_ids) {
            Some(existing_id) => plan.to_update.push(PlannedUpdate {
                existing_id: existing_id.to_owned(),
                poi,
            }),
            None => plan.to_insert.push(poi),
        }
    }

    plan.stats.new = plan.to_insert.len();
    plan.stats.updated = plan.to_update.len();
    plan.stats.total = plan.stats.new + plan.stats.updated;
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::Coordinates;
    use crate::domain::place_type::{PlaceType, TransitMode, bike_category};
    use rstest::{fixture, rstest};

    fn google(id: &str, kind: PlaceType) -> DiscoveredPoi {
        DiscoveredPoi::new(
            ExternalIdKind::Google,
            id,
            format!("google {id}"),
            Coordinates::new(63.43, 10.39),
            kind.category(),
        )
    }

    fn existing(id: &str, ids: ExternalIds) -> ExistingPoi {
        ExistingPoi {
            id: id.to_owned(),
            external_ids: ids,
        }
    }

    #[fixture]
    fn mixed_batch() -> Vec<DiscoveredPoi> {
        vec![
            google("g1", PlaceType::Cafe),
            google("g2", PlaceType::Cafe),
            google("g3", PlaceType::Bakery),
            DiscoveredPoi::new(
                ExternalIdKind::Entur,
                "NSR:StopPlace:41613",
                "Prinsens gate",
                Coordinates::new(63.431, 10.392),
                TransitMode::Bus.category(),
            ),
            DiscoveredPoi::new(
                ExternalIdKind::Bysykkel,
                "7",
                "Solsiden",
                Coordinates::new(63.434, 10.411),
                bike_category(),
            ),
        ]
    }

    #[rstest]
    fn empty_store_inserts_everything(mixed_batch: Vec<DiscoveredPoi>) {
        let plan = plan_import(mixed_batch, &[]);

        assert_eq!(plan.stats.total, 5);
        assert_eq!(plan.stats.new, 5);
        assert_eq!(plan.stats.updated, 0);
        assert!(plan.to_update.is_empty());
    }

    #[rstest]
    fn counts_per_category(mixed_batch: Vec<DiscoveredPoi>) {
        let plan = plan_import(mixed_batch, &[]);

        let expected: BTreeMap<String, usize> = [("bakery", 1), ("bike", 1), ("bus", 1), ("cafe", 2)]
            .into_iter()
            .map(|(id, n)| (id.to_owned(), n))
            .collect();
        assert_eq!(plan.stats.by_category, expected);
    }

    #[rstest]
    fn google_match_updates_existing_row() {
        let stored = [existing(
            "manual-42",
            ExternalIds::single(ExternalIdKind::Google, "g1"),
        )];

        let plan = plan_import(vec![google("g1", PlaceType::Cafe)], &stored);

        assert!(plan.to_insert.is_empty());
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].existing_id, "manual-42");
    }

    #[rstest]
    #[case::entur(ExternalIdKind::Entur, "NSR:StopPlace:1")]
    #[case::bysykkel(ExternalIdKind::Bysykkel, "12")]
    fn non_google_ids_also_match(#[case] kind: ExternalIdKind, #[case] external: &str) {
        let stored = [existing("row-1", ExternalIds::single(kind, external))];
        let discovered = DiscoveredPoi::new(
            kind,
            external,
            "stop",
            Coordinates::new(63.43, 10.39),
            bike_category(),
        );

        let plan = plan_import(vec![discovered], &stored);

        assert_eq!(plan.stats.updated, 1);
        assert_eq!(plan.to_update[0].existing_id, "row-1");
    }

    #[rstest]
    fn google_id_wins_over_entur_id() {
        let stored = [
            existing("by-entur", ExternalIds::single(ExternalIdKind::Entur, "NSR:StopPlace:9")),
            existing("by-google", ExternalIds::single(ExternalIdKind::Google, "g9")),
        ];
        let mut poi = google("g9", PlaceType::TouristAttraction);
        poi.external_ids.entur_stopplace_id = Some("NSR:StopPlace:9".to_owned());

        let plan = plan_import(vec![poi], &stored);

        assert_eq!(plan.to_update[0].existing_id, "by-google");
    }

    #[rstest]
    fn unmatched_ids_in_other_slots_do_not_match() {
        let stored = [existing(
            "row-1",
            ExternalIds::single(ExternalIdKind::Entur, "g1"),
        )];

        let plan = plan_import(vec![google("g1", PlaceType::Cafe)], &stored);

        assert_eq!(plan.stats.new, 1);
    }

    #[rstest]
    fn repeated_places_are_collapsed() {
        let plan = plan_import(
            vec![google("g1", PlaceType::Cafe), google("g1", PlaceType::Bakery)],
            &[],
        );

        assert_eq!(plan.stats.total, 1);
        assert_eq!(plan.stats.by_category.get("cafe"), Some(&1));
        assert_eq!(plan.stats.by_category.get("bakery"), None);
    }

    #[rstest]
    fn replanning_after_commit_finds_only_updates(mixed_batch: Vec<DiscoveredPoi>) {
        let first = plan_import(mixed_batch.clone(), &[]);
        let stored: Vec<ExistingPoi> = first
            .to_insert
            .iter()
            .map(|poi| existing(&poi.id, poi.external_ids.clone()))
            .collect();

        let second = plan_import(mixed_batch, &stored);

        assert_eq!(second.stats.new, 0);
        assert_eq!(second.stats.updated, first.stats.total);
        assert!(
            second
                .to_update
                .iter()
                .all(|update| update.existing_id == update.poi.id)
        );
    }
}
