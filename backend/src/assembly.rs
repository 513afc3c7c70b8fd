//! Builds the import service from [`PlacySettings`].
//!
//! Shared by the HTTP server and the `import-pois` binary so both run the
//! same adapters against the same store.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use crate::domain::ports::{ImportMetrics, PoiDiscoverySource, PoiRepository, ProjectLinkRepository};
use crate::domain::{DiscoverySources, PoiImportService};
use crate::outbound::bysykkel::BysykkelGbfsSource;
use crate::outbound::entur::EnturStopPlaceSource;
use crate::outbound::google_places::GooglePlacesSource;
use crate::outbound::memory::InMemoryPoiStore;
use crate::outbound::persistence::{
    DbPool, DieselPoiRepository, DieselProjectLinkRepository, MigrationError, PoolConfig,
    PoolError, run_pending_migrations,
};
use crate::settings::{PlacySettings, SettingsError};

/// Failure while assembling adapters.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// A setting could not be interpreted.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// An HTTP client could not be constructed.
    #[error("failed to build {provider} client: {source}")]
    HttpClient {
        /// Provider label.
        provider: &'static str,
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// Migrations failed.
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Store adapters chosen for this process.
#[derive(Clone)]
pub struct PoiStores {
    /// POI and category repository.
    pub pois: Arc<dyn PoiRepository>,
    /// Project link repository.
    pub links: Arc<dyn ProjectLinkRepository>,
}

/// Build the three provider adapters.
///
/// A missing Google key yields `google: None`, which the service reports as
/// `service_unavailable` on every import.
///
/// # Errors
///
/// Returns [`AssemblyError`] when an endpoint is malformed or a client cannot
/// be built.
pub fn build_discovery_sources(settings: &PlacySettings) -> Result<DiscoverySources, AssemblyError> {
    let timeout = settings.provider_timeout();
    let google = match settings.google_places_api_key() {
        Some(key) => {
            let source = GooglePlacesSource::new(settings.google_places_endpoint()?, key, timeout)
                .map_err(|source| client_error("google places", source))?;
            Some(Arc::new(source) as Arc<dyn PoiDiscoverySource>)
        }
        None => {
            warn!("PLACY_GOOGLE_PLACES_API_KEY is not set; imports will be rejected");
            None
        }
    };
    let entur = EnturStopPlaceSource::new(
        settings.entur_endpoint()?,
        settings.entur_client_name(),
        timeout,
    )
    .map_err(|source| client_error("entur", source))?;
    // GBFS operators identify clients the same way Entur does.
    let bysykkel =
        BysykkelGbfsSource::new(settings.bysykkel_feeds()?, settings.entur_client_name(), timeout)
            .map_err(|source| client_error("bysykkel", source))?;

    Ok(DiscoverySources {
        google,
        entur: Arc::new(entur),
        bysykkel: Arc::new(bysykkel),
    })
}

/// Connect to PostgreSQL when a URL is configured, else use memory.
///
/// # Errors
///
/// Returns [`AssemblyError`] when migrations or pool construction fail.
pub async fn build_stores(settings: &PlacySettings) -> Result<PoiStores, AssemblyError> {
    let Some(database_url) = settings.database_url() else {
        warn!("PLACY_DATABASE_URL is not set; POIs are kept in memory");
        let store = InMemoryPoiStore::new();
        return Ok(PoiStores {
            pois: Arc::new(store.clone()),
            links: Arc::new(store),
        });
    };
    if settings.run_migrations() {
        run_pending_migrations(database_url).await?;
        info!("database migrations applied");
    }
    let pool = DbPool::new(PoolConfig::new(database_url)).await?;
    Ok(PoiStores {
        pois: Arc::new(DieselPoiRepository::new(pool.clone())),
        links: Arc::new(DieselProjectLinkRepository::new(pool)),
    })
}

/// Assemble the import service with the given metrics sink.
///
/// # Errors
///
/// Propagates [`build_discovery_sources`] and [`build_stores`] failures.
pub async fn build_import_service(
    settings: &PlacySettings,
    metrics: Arc<dyn ImportMetrics>,
) -> Result<PoiImportService, AssemblyError> {
    let sources = build_discovery_sources(settings)?;
    let PoiStores { pois, links } = build_stores(settings).await?;
    Ok(PoiImportService::new(sources, pois, links, Arc::new(DefaultClock)).with_metrics(metrics))
}

fn client_error(provider: &'static str, source: reqwest::Error) -> AssemblyError {
    AssemblyError::HttpClient { provider, source }
}
