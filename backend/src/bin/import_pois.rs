//! Run one POI import from a JSON request file and print its stats.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

use placy::assembly::build_import_service;
use placy::domain::ports::{
    NoOpImportMetrics, PoiImportCommand, PoiImportOutcome, PoiImportRequest,
};
use placy::settings::PlacySettings;

/// `import-pois` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-pois",
    about = "Discover POIs around a point and preview or commit them",
    version
)]
struct CliArgs {
    /// JSON file holding the same body accepted by `POST /api/v1/admin/import`.
    #[arg(long = "request", value_name = "path")]
    request_path: PathBuf,
    /// Database connection URL. Falls back to `PLACY_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Force preview mode regardless of the request file.
    #[arg(long)]
    preview: bool,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
    let args = CliArgs::try_parse().map_err(io::Error::other)?;

    let mut settings = PlacySettings::load_from_iter([OsString::from("import-pois")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    if let Some(url) = args.database_url {
        if url.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        settings.database_url = Some(url);
    }

    let mut request = parse_request(&read_request_file(&args.request_path)?)?;
    request.preview |= args.preview;

    let service = build_import_service(&settings, Arc::new(NoOpImportMetrics))
        .await
        .map_err(io::Error::other)?;
    let outcome = service
        .import(request)
        .await
        .map_err(|error| io::Error::other(format!("import failed: {error}")))?;

    for line in summary_lines(&outcome) {
        println!("{line}");
    }
    Ok(())
}

fn read_request_file(path: &Path) -> io::Result<String> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "request path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open request directory '{}': {error}",
            parent.display()
        ))
    })?;
    let mut file = directory.open(Path::new(file_name)).map_err(|error| {
        io::Error::other(format!("open request file '{}': {error}", path.display()))
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|error| {
        io::Error::other(format!("read request file '{}': {error}", path.display()))
    })?;
    Ok(contents)
}

fn parse_request(raw: &str) -> io::Result<PoiImportRequest> {
    serde_json::from_str(raw).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("request file is not a valid import request: {error}"),
        )
    })
}

fn summary_lines(outcome: &PoiImportOutcome) -> Vec<String> {
    let stats = &outcome.stats;
    let mut lines = vec![
        format!("mode={}", outcome.mode.as_str()),
        format!("total={}", stats.total),
        format!("new={}", stats.new),
        format!("updated={}", stats.updated),
    ];
    lines.extend(
        stats
            .by_category
            .iter()
            .map(|(category, count)| format!("category.{category}={count}")),
    );
    if let Some(linked) = outcome.linked_to_project {
        lines.push(format!("linked_to_project={linked}"));
    }
    lines.extend(outcome.errors.iter().map(|error| format!("error={error}")));
    lines
}
