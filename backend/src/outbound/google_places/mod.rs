//! Google Places (New) outbound adapter.
//!
//! Implements `PoiDiscoverySource` with one Nearby Search request per
//! requested place type.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_GOOGLE_PLACES_ENDPOINT, GooglePlacesSource};
