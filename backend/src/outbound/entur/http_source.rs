//! Reqwest-backed Entur stop-place source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::FeatureCollectionDto;
use crate::domain::poi::DiscoveredPoi;
use crate::domain::ports::{DiscoveryQuery, PoiDiscoverySource, PoiDiscoverySourceError};
use crate::outbound::http_support::{map_transport_error, read_json};

/// Geocoder reverse-lookup endpoint.
pub const DEFAULT_ENTUR_ENDPOINT: &str = "https://api.entur.io/geocoder/v1/reverse";
/// Client name sent in `ET-Client-Name` when none is configured.
pub const DEFAULT_ENTUR_CLIENT_NAME: &str = "placy-poi-import";

const CLIENT_NAME_HEADER: &str = "ET-Client-Name";
const MAX_RESULTS: u32 = 100;

/// Entur geocoder adapter returning stop places as POIs.
pub struct EnturStopPlaceSource {
    client: Client,
    endpoint: Url,
    client_name: String,
}

impl EnturStopPlaceSource {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        client_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            client_name: client_name.into(),
        })
    }
}

fn reverse_query(query: &DiscoveryQuery) -> [(&'static str, String); 5] {
    [
        ("point.lat", query.center.lat.to_string()),
        ("point.lon", query.center.lng.to_string()),
        (
            "boundary.circle.radius",
            (f64::from(query.radius_m) / 1_000.0).to_string(),
        ),
        ("layers", "venue".to_owned()),
        ("size", MAX_RESULTS.to_string()),
    ]
}

#[async_trait]
impl PoiDiscoverySource for EnturStopPlaceSource {
    async fn discover(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(CLIENT_NAME_HEADER, self.client_name.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&reverse_query(query))
            .send()
            .await
            .map_err(map_transport_error)?;

        let decoded: FeatureCollectionDto = read_json("entur", response).await?;
        Ok(decoded.into_domain_pois(query.center, query.radius_m))
    }
}
