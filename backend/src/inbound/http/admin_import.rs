//! Admin endpoint running a POI import.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, post, web};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::geo::Coordinates;
use crate::domain::poi_dedup::ImportStats;
use crate::domain::ports::{ImportMode, MistypedField, PoiImportOutcome, PoiImportRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::invalid_body;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Search center.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct CenterBody {
    /// Latitude, 57 to 72.
    #[schema(example = 63.4305)]
    pub lat: f64,
    /// Longitude, 4 to 32.
    #[schema(example = 10.3951)]
    pub lng: f64,
}

/// Request body for `POST /api/v1/admin/import`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequestBody {
    /// Search center inside Norway.
    pub center: Option<CenterBody>,
    /// Search radius in metres, 300 to 2000.
    #[schema(example = 1000)]
    pub radius_meters: Option<i64>,
    /// Google place types, 1 to 20 entries.
    #[schema(example = json!(["cafe", "restaurant"]))]
    pub categories: Option<Vec<String>>,
    /// Include Entur stop places. Defaults to true.
    pub include_entur: Option<bool>,
    /// Include Bysykkel stations. Defaults to true.
    pub include_bysykkel: Option<bool>,
    /// Link written POIs to this project.
    pub project_id: Option<String>,
    /// Report stats without writing. Defaults to false.
    pub preview: Option<bool>,
}

impl From<ImportRequestBody> for PoiImportRequest {
    fn from(body: ImportRequestBody) -> Self {
        Self {
            center: body
                .center
                .map(|center| Coordinates::new(center.lat, center.lng)),
            radius_meters: body.radius_meters,
            categories: body.categories,
            include_entur: body.include_entur.unwrap_or(true),
            include_bysykkel: body.include_bysykkel.unwrap_or(true),
            project_id: body.project_id,
            preview: body.preview.unwrap_or(false),
            mistyped_fields: Vec::new(),
        }
    }
}

/// Reads body fields one at a time so a wrongly typed value is recorded
/// instead of rejecting the whole body.
struct FieldDecoder {
    object: Map<String, Value>,
    mistyped: Vec<MistypedField>,
}

impl FieldDecoder {
    fn take<T: DeserializeOwned>(&mut self, field: &str) -> Option<T> {
        let value = self.object.remove(field).filter(|value| !value.is_null())?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                self.mistyped.push(MistypedField {
                    field: field.to_owned(),
                    message: err.to_string(),
                });
                None
            }
        }
    }
}

fn decode_import_request(object: Map<String, Value>) -> PoiImportRequest {
    let mut fields = FieldDecoder {
        object,
        mistyped: Vec::new(),
    };
    let body = ImportRequestBody {
        center: fields.take("center"),
        radius_meters: fields.take("radiusMeters"),
        categories: fields.take("categories"),
        include_entur: fields.take("includeEntur"),
        include_bysykkel: fields.take("includeBysykkel"),
        project_id: fields.take("projectId"),
        preview: fields.take("preview"),
    };
    PoiImportRequest {
        mistyped_fields: fields.mistyped,
        ..PoiImportRequest::from(body)
    }
}

/// Import counts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatsBody {
    /// Unique POIs discovered.
    pub total: usize,
    /// POI count per category id.
    pub by_category: BTreeMap<String, usize>,
    /// POIs with no stored match.
    pub new: usize,
    /// POIs matched to a stored row.
    pub updated: usize,
}

impl From<ImportStats> for ImportStatsBody {
    fn from(stats: ImportStats) -> Self {
        Self {
            total: stats.total,
            by_category: stats.by_category,
            new: stats.new,
            updated: stats.updated,
        }
    }
}

/// Response body for a finished import.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponseBody {
    /// Always true for a 200 response; partial failures are listed in `errors`.
    pub success: bool,
    /// Whether the run was a preview.
    pub preview: bool,
    /// Deduplication counts.
    pub stats: ImportStatsBody,
    /// POIs linked to `projectId`, when one was given in commit mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_to_project: Option<usize>,
    /// Non-fatal problems encountered during the run.
    pub errors: Vec<String>,
}

impl From<PoiImportOutcome> for ImportResponseBody {
    fn from(outcome: PoiImportOutcome) -> Self {
        Self {
            success: true,
            preview: outcome.mode == ImportMode::Preview,
            stats: outcome.stats.into(),
            linked_to_project: outcome.linked_to_project,
            errors: outcome.errors,
        }
    }
}

/// Discover POIs around a point and preview or commit them.
#[utoipa::path(
    post,
    path = "/api/v1/admin/import",
    request_body = ImportRequestBody,
    responses(
        (status = 200, description = "Import finished", body = ImportResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admin mode is disabled", body = ErrorSchema),
        (status = 503, description = "Provider or storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "importPois"
)]
#[post("/admin/import")]
pub async fn import_pois(
    state: web::Data<HttpState>,
    payload: Result<web::Json<Value>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    if !state.admin.enabled {
        return Err(Error::forbidden("admin mode is disabled"));
    }
    let Value::Object(object) = payload.map_err(|err| invalid_body(&err))?.into_inner() else {
        return Err(Error::invalid_request("request body must be a JSON object"));
    };

    let outcome = state.poi_import.import(decode_import_request(object)).await?;

    Ok(HttpResponse::Ok().json(ImportResponseBody::from(outcome)))
}

#[cfg(test)]
#[path = "admin_import_tests.rs"]
mod tests;
