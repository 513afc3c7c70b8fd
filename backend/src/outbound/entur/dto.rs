//! GeoJSON DTOs returned by the Entur geocoder `reverse` endpoint.

use serde::Deserialize;

use crate::domain::geo::Coordinates;
use crate::domain::place_type::TransitMode;
use crate::domain::poi::{DiscoveredPoi, ExternalIdKind};

const STOP_PLACE_PREFIX: &str = "NSR:StopPlace:";

#[derive(Debug, Deserialize)]
pub(super) struct FeatureCollectionDto {
    #[serde(default)]
    pub(super) features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FeatureDto {
    pub(super) geometry: PointDto,
    pub(super) properties: PropertiesDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct PointDto {
    /// `[longitude, latitude]`.
    pub(super) coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
pub(super) struct PropertiesDto {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) label: Option<String>,
    #[serde(default)]
    pub(super) category: Vec<String>,
}

/// Transit mode for an NeTEx stop-place category, if it is one we import.
fn mode_for(category: &str) -> Option<TransitMode> {
    match category {
        "metroStation" => Some(TransitMode::Metro),
        "railStation" => Some(TransitMode::Train),
        "tramStation" | "onstreetTram" => Some(TransitMode::Tram),
        "ferryStop" | "ferryPort" | "harbourPort" => Some(TransitMode::Ferry),
        "onstreetBus" | "busStation" | "coachStation" => Some(TransitMode::Bus),
        _ => None,
    }
}

/// Pick the most significant mode a multimodal stop serves.
fn dominant_mode(categories: &[String]) -> Option<TransitMode> {
    const RANK: [TransitMode; 5] = [
        TransitMode::Metro,
        TransitMode::Train,
        TransitMode::Tram,
        TransitMode::Ferry,
        TransitMode::Bus,
    ];
    let modes: Vec<TransitMode> = categories.iter().filter_map(|c| mode_for(c)).collect();
    RANK.into_iter().find(|mode| modes.contains(mode))
}

impl FeatureCollectionDto {
    /// Stop places within `radius_m` of `center`.
    pub(super) fn into_domain_pois(self, center: Coordinates, radius_m: u32) -> Vec<DiscoveredPoi> {
        self.features
            .into_iter()
            .filter_map(FeatureDto::into_domain_poi)
            .filter(|poi| poi.coordinates.distance_m(&center) <= f64::from(radius_m))
            .collect()
    }
}

impl FeatureDto {
    fn into_domain_poi(self) -> Option<DiscoveredPoi> {
        if !self.properties.id.starts_with(STOP_PLACE_PREFIX) {
            return None;
        }
        let mode = dominant_mode(&self.properties.category)?;
        let [lng, lat] = self.geometry.coordinates;
        let coordinates = Coordinates::new(lat, lng);
        if !coordinates.is_finite() {
            return None;
        }
        Some(
            DiscoveredPoi::new(
                ExternalIdKind::Entur,
                self.properties.id,
                self.properties.name,
                coordinates,
                mode.category(),
            )
            .with_address(self.properties.label),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["onstreetBus"], Some(TransitMode::Bus))]
    #[case(&["onstreetBus", "onstreetTram"], Some(TransitMode::Tram))]
    #[case(&["busStation", "railStation"], Some(TransitMode::Train))]
    #[case(&["harbourPort"], Some(TransitMode::Ferry))]
    #[case(&["airport"], None)]
    #[case(&[], None)]
    fn picks_the_dominant_mode(#[case] categories: &[&str], #[case] expected: Option<TransitMode>) {
        let categories: Vec<String> = categories.iter().map(|c| (*c).to_owned()).collect();
        assert_eq!(dominant_mode(&categories), expected);
    }
}
