//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::PoiImportCommand;

/// Admin surface switches, resolved from configuration at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminSettings {
    /// Whether admin endpoints accept requests.
    pub enabled: bool,
}

impl AdminSettings {
    /// Settings with admin endpoints switched on.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }
}

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use placy::domain::ports::FixturePoiImportCommand;
/// use placy::inbound::http::state::{AdminSettings, HttpState};
///
/// let state = HttpState::new(Arc::new(FixturePoiImportCommand), AdminSettings::enabled());
/// assert!(state.admin.enabled);
/// ```
#[derive(Clone)]
pub struct HttpState {
    /// Import use-case.
    pub poi_import: Arc<dyn PoiImportCommand>,
    /// Admin switches.
    pub admin: AdminSettings,
}

impl HttpState {
    /// Bundle the import command with admin settings.
    pub fn new(poi_import: Arc<dyn PoiImportCommand>, admin: AdminSettings) -> Self {
        Self { poi_import, admin }
    }
}
