//! Prometheus adapter for POI import counters.
//!
//! `poi_import_runs_total` counts runs by mode and status;
//! `poi_import_pois_total` counts planned and written POIs by action.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{ImportMetrics, ImportMetricsError, ImportRunRecord};

/// Prometheus-backed recorder for import runs.
pub struct PrometheusImportMetrics {
    runs_total: CounterVec,
    pois_total: CounterVec,
}

impl PrometheusImportMetrics {
    /// Create and register counters with the provided registry.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let runs_total = CounterVec::new(
            Opts::new("poi_import_runs_total", "POI import runs by mode and status"),
            &["mode", "status"],
        )?;
        let pois_total = CounterVec::new(
            Opts::new("poi_import_pois_total", "POIs handled by import action"),
            &["action"],
        )?;
        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(pois_total.clone()))?;
        Ok(Self {
            runs_total,
            pois_total,
        })
    }

    fn add(&self, action: &str, count: usize) {
        if count > 0 {
            self.pois_total
                .with_label_values(&[action])
                .inc_by(count as f64);
        }
    }
}

#[async_trait]
impl ImportMetrics for PrometheusImportMetrics {
    async fn record_run(&self, run: &ImportRunRecord) -> Result<(), ImportMetricsError> {
        self.runs_total
            .with_label_values(&[run.mode.as_str(), run.status.as_str()])
            .inc();
        self.add("new", run.new);
        self.add("updated", run.updated);
        self.add("written", run.written);
        Ok(())
    }
}
