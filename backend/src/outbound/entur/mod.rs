//! Entur geocoder outbound adapter for public-transport stop places.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_ENTUR_CLIENT_NAME, DEFAULT_ENTUR_ENDPOINT, EnturStopPlaceSource};
