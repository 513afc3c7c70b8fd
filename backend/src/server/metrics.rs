//! Prometheus wiring: request middleware plus import counters on one registry.

use std::io;
use std::sync::Arc;

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use placy::domain::ports::ImportMetrics;
use placy::outbound::metrics::PrometheusImportMetrics;

/// Middleware and domain recorder sharing a registry.
pub(crate) struct ServerMetrics {
    pub(crate) middleware: PrometheusMetrics,
    pub(crate) import: Arc<dyn ImportMetrics>,
}

/// Build the `/metrics` middleware and register import counters with it.
pub(crate) fn build_metrics() -> io::Result<ServerMetrics> {
    let middleware = PrometheusMetricsBuilder::new("placy")
        .endpoint("/metrics")
        .build()
        .map_err(|error| io::Error::other(format!("configure Prometheus metrics: {error}")))?;
    let import = PrometheusImportMetrics::new(&middleware.registry)
        .map_err(|error| io::Error::other(format!("import metrics registration failed: {error}")))?;
    Ok(ServerMetrics {
        middleware,
        import: Arc::new(import),
    })
}
