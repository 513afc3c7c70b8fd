//! Driven port for discovering POIs from an external provider.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::geo::Coordinates;
use crate::domain::place_type::PlaceType;
use crate::domain::poi::DiscoveredPoi;

/// Area and filters a provider is asked to search.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    /// Search center.
    pub center: Coordinates,
    /// Search radius in metres.
    pub radius_m: u32,
    /// Google place types to search for. Providers with fixed categories
    /// ignore this.
    pub place_types: Vec<PlaceType>,
}

define_port_error! {
    /// Errors surfaced while calling a discovery provider.
    pub enum PoiDiscoverySourceError {
        /// Adapter lacks the configuration needed to call the provider.
        NotConfigured { message: String } =>
            "provider not configured: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "transport failed: {message}",
        /// Provider call exceeded the request timeout.
        Timeout { message: String } =>
            "request timed out: {message}",
        /// Provider throttled the request.
        RateLimited { message: String } =>
            "rate limited: {message}",
        /// Provider answered with a non-success status.
        Rejected { message: String } =>
            "request rejected: {message}",
        /// Response body could not be decoded.
        Decode { message: String } =>
            "response decode failed: {message}",
    }
}

/// Port for one POI provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiDiscoverySource: Send + Sync {
    /// Return every POI the provider knows inside the query circle.
    async fn discover(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError>;
}

/// Fixture source returning a canned list.
#[derive(Debug, Clone, Default)]
pub struct FixturePoiDiscoverySource {
    pois: Vec<DiscoveredPoi>,
}

impl FixturePoiDiscoverySource {
    /// Source that always returns `pois`.
    pub fn new(pois: Vec<DiscoveredPoi>) -> Self {
        Self { pois }
    }
}

#[async_trait]
impl PoiDiscoverySource for FixturePoiDiscoverySource {
    async fn discover(
        &self,
        _query: &DiscoveryQuery,
    ) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
        Ok(self.pois.clone())
    }
}
