//! Request and response DTOs for `places:searchNearby`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::geo::Coordinates;
use crate::domain::place_type::PlaceType;
use crate::domain::poi::{DiscoveredPoi, ExternalIdKind};

/// Response fields requested through `X-Goog-FieldMask`.
pub(super) const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.rating,places.userRatingCount,places.photos";

/// Upper bound Google accepts for `maxResultCount`.
pub(super) const MAX_RESULT_COUNT: u32 = 20;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchNearbyRequestDto {
    pub(super) included_types: Vec<&'static str>,
    pub(super) max_result_count: u32,
    pub(super) location_restriction: LocationRestrictionDto,
}

#[derive(Debug, Serialize)]
pub(super) struct LocationRestrictionDto {
    pub(super) circle: CircleDto,
}

#[derive(Debug, Serialize)]
pub(super) struct CircleDto {
    pub(super) center: LatLngDto,
    pub(super) radius: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) latitude: f64,
    pub(super) longitude: f64,
}

impl SearchNearbyRequestDto {
    pub(super) fn new(place_type: PlaceType, center: Coordinates, radius_m: u32) -> Self {
        Self {
            included_types: vec![place_type.as_str()],
            max_result_count: MAX_RESULT_COUNT,
            location_restriction: LocationRestrictionDto {
                circle: CircleDto {
                    center: LatLngDto {
                        latitude: center.lat,
                        longitude: center.lng,
                    },
                    radius: f64::from(radius_m),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchNearbyResponseDto {
    #[serde(default)]
    pub(super) places: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaceDto {
    pub(super) id: String,
    pub(super) display_name: Option<LocalizedTextDto>,
    pub(super) formatted_address: Option<String>,
    pub(super) location: Option<LatLngDto>,
    pub(super) rating: Option<f64>,
    pub(super) user_rating_count: Option<u32>,
    #[serde(default)]
    pub(super) photos: Vec<PhotoDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocalizedTextDto {
    pub(super) text: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotoDto {
    pub(super) name: String,
}

impl SearchNearbyResponseDto {
    /// Map places into domain records filed under `place_type`.
    ///
    /// Places without a name or a finite location are skipped.
    pub(super) fn into_domain_pois(self, place_type: PlaceType) -> Vec<DiscoveredPoi> {
        self.places
            .into_iter()
            .filter_map(|place| place.into_domain_poi(place_type))
            .collect()
    }
}

impl PlaceDto {
    fn into_domain_poi(self, place_type: PlaceType) -> Option<DiscoveredPoi> {
        let name = self
            .display_name
            .map(|name| name.text)
            .filter(|text| !text.trim().is_empty());
        let coordinates = self
            .location
            .map(|location| Coordinates::new(location.latitude, location.longitude))
            .filter(Coordinates::is_finite);
        let (Some(name), Some(coordinates)) = (name, coordinates) else {
            debug!(place_id = %self.id, "skipping Google place without name or location");
            return None;
        };

        let photo_reference = self.photos.into_iter().next().map(|photo| photo.name);
        Some(
            DiscoveredPoi::new(
                ExternalIdKind::Google,
                self.id,
                name,
                coordinates,
                place_type.category(),
            )
            .with_address(self.formatted_address)
            .with_rating(self.rating, self.user_rating_count)
            .with_photo_reference(photo_reference),
        )
    }
}
