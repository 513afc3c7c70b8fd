//! HTTP server configuration object.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use placy::inbound::http::state::AdminSettings;

/// Configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) admin: AdminSettings,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: PrometheusMetrics,
}

impl ServerConfig {
    /// Listen on `bind_addr` with the given admin switches.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        admin: AdminSettings,
        #[cfg(feature = "metrics")] prometheus: PrometheusMetrics,
    ) -> Self {
        Self {
            bind_addr,
            admin,
            #[cfg(feature = "metrics")]
            prometheus,
        }
    }
}
