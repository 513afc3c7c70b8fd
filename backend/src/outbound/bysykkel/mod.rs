//! Bysykkel GBFS outbound adapter for city-bike docking stations.

mod dto;
mod http_source;

pub use http_source::BysykkelGbfsSource;
