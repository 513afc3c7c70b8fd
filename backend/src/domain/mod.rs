//! Domain types, services, and ports for the POI import.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - [`PoiImportService`]: orchestrates discovery, dedup, and writes.
//! - [`TraceId`]: request-scoped correlation identifier.

pub mod error;
pub mod geo;
pub mod place_type;
pub mod poi;
pub mod poi_dedup;
pub mod poi_import;
pub mod poi_import_validation;
pub mod ports;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::poi_import::{DiscoverySources, PoiImportService};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use placy::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("admin mode is disabled"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
