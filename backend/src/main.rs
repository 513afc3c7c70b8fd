//! Backend entry-point: loads settings, assembles adapters, and serves the
//! admin import API.

mod server;

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use placy::assembly::build_import_service;
#[cfg(not(feature = "metrics"))]
use placy::domain::ports::NoOpImportMetrics;
use placy::inbound::http::health::HealthState;
use placy::inbound::http::state::AdminSettings;
use placy::settings::PlacySettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PlacySettings::load_from_iter([OsString::from("placy")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let admin = AdminSettings {
        enabled: settings.admin_enabled,
    };

    #[cfg(feature = "metrics")]
    let metrics = server::build_metrics()?;
    #[cfg(feature = "metrics")]
    let import_metrics = metrics.import.clone();
    #[cfg(not(feature = "metrics"))]
    let import_metrics = Arc::new(NoOpImportMetrics);

    let service = build_import_service(&settings, import_metrics)
        .await
        .map_err(io::Error::other)?;

    let config = ServerConfig::new(
        bind_addr,
        admin,
        #[cfg(feature = "metrics")]
        metrics.middleware,
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config, Arc::new(service))?;
    info!(%bind_addr, admin_enabled = admin.enabled, "placy backend listening");
    server.await
}
