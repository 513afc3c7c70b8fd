//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the admin import and health endpoints together with
//! the error schema wrappers. It backs Swagger UI in debug builds and the
//! `openapi-dump` binary.

use crate::inbound::http::admin_import::{
    CenterBody, ImportRequestBody, ImportResponseBody, ImportStatsBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Placy backend API",
        description = "Admin POI import and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::admin_import::import_pois,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CenterBody,
        ImportRequestBody,
        ImportResponseBody,
        ImportStatsBody
    )),
    tags(
        (name = "admin", description = "Operator-only endpoints"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
