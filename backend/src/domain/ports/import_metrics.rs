//! Domain port for import run counters.

use async_trait::async_trait;

use super::define_port_error;
use super::ImportMode;

define_port_error! {
    /// Errors exposed when recording import metrics.
    pub enum ImportMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } =>
            "import metrics exporter failed: {message}",
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportRunStatus {
    /// Every step succeeded.
    Succeeded,
    /// The run returned, but `errors` is not empty.
    Partial,
    /// The run returned an error.
    Failed,
}

impl ImportRunStatus {
    /// Metric label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// Metric payload for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRunRecord {
    /// Preview or commit.
    pub mode: ImportMode,
    /// Outcome label.
    pub status: ImportRunStatus,
    /// POIs categorised as new.
    pub new: usize,
    /// POIs categorised as updates.
    pub updated: usize,
    /// Rows written (zero in preview).
    pub written: usize,
}

/// Metrics recording port for import runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImportMetrics: Send + Sync {
    /// Record one finished run.
    async fn record_run(&self, run: &ImportRunRecord) -> Result<(), ImportMetricsError>;
}

/// No-op implementation used when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpImportMetrics;

#[async_trait]
impl ImportMetrics for NoOpImportMetrics {
    async fn record_run(&self, _run: &ImportRunRecord) -> Result<(), ImportMetricsError> {
        Ok(())
    }
}
