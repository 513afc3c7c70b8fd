//! DTOs for the GBFS `station_information.json` feed.

use serde::Deserialize;

use crate::domain::geo::Coordinates;
use crate::domain::place_type::bike_category;
use crate::domain::poi::{DiscoveredPoi, ExternalIdKind};

#[derive(Debug, Deserialize)]
pub(super) struct StationInformationDto {
    pub(super) data: StationListDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct StationListDto {
    #[serde(default)]
    pub(super) stations: Vec<StationDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StationDto {
    pub(super) station_id: String,
    pub(super) name: String,
    pub(super) address: Option<String>,
    pub(super) lat: f64,
    pub(super) lon: f64,
}

impl StationInformationDto {
    /// Stations within `radius_m` of `center`, identified as
    /// `<system>:<station_id>`.
    pub(super) fn into_domain_pois(
        self,
        system: &str,
        center: Coordinates,
        radius_m: u32,
    ) -> Vec<DiscoveredPoi> {
        let radius = f64::from(radius_m);
        self.data
            .stations
            .into_iter()
            .filter_map(|station| {
                let coordinates = Coordinates::new(station.lat, station.lon);
                (coordinates.is_finite() && coordinates.distance_m(&center) <= radius).then(|| {
                    DiscoveredPoi::new(
                        ExternalIdKind::Bysykkel,
                        format!("{system}:{}", station.station_id),
                        station.name,
                        coordinates,
                        bike_category(),
                    )
                    .with_address(station.address)
                })
            })
            .collect()
    }
}
