//! Reqwest-backed Google Places source.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::{Client, Url};

use super::dto::{FIELD_MASK, SearchNearbyRequestDto, SearchNearbyResponseDto};
use crate::domain::place_type::PlaceType;
use crate::domain::poi::DiscoveredPoi;
use crate::domain::ports::{DiscoveryQuery, PoiDiscoverySource, PoiDiscoverySourceError};
use crate::outbound::http_support::{map_transport_error, read_json};

/// Nearby Search endpoint of the Places API (New).
pub const DEFAULT_GOOGLE_PLACES_ENDPOINT: &str =
    "https://places.googleapis.com/v1/places:searchNearby";

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// Google Places adapter.
pub struct GooglePlacesSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GooglePlacesSource {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    async fn search_type(
        &self,
        place_type: PlaceType,
        query: &DiscoveryQuery,
    ) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
        let body = SearchNearbyRequestDto::new(place_type, query.center, query.radius_m);
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(FIELD_MASK_HEADER, FIELD_MASK)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let decoded: SearchNearbyResponseDto = read_json("google places", response).await?;
        Ok(decoded.into_domain_pois(place_type))
    }
}

#[async_trait]
impl PoiDiscoverySource for GooglePlacesSource {
    async fn discover(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
        if self.api_key.trim().is_empty() {
            return Err(PoiDiscoverySourceError::not_configured(
                "Google Places API key is blank",
            ));
        }
        let per_type = try_join_all(
            query
                .place_types
                .iter()
                .map(|place_type| self.search_type(*place_type, query)),
        )
        .await?;
        Ok(per_type.into_iter().flatten().collect())
    }
}
