//! Diesel row types. Internal to the persistence adapter.

use diesel::prelude::*;

use super::schema::{categories, pois, project_pois};
use crate::domain::place_type::PoiCategory;
use crate::domain::poi::{ExistingPoi, ExternalIds};

/// Dedup projection of a stored POI.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pois)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExistingPoiRow {
    pub id: String,
    pub google_place_id: Option<String>,
    pub entur_stopplace_id: Option<String>,
    pub bysykkel_station_id: Option<String>,
}

impl From<ExistingPoiRow> for ExistingPoi {
    fn from(row: ExistingPoiRow) -> Self {
        Self {
            id: row.id,
            external_ids: ExternalIds {
                google_place_id: row.google_place_id,
                entur_stopplace_id: row.entur_stopplace_id,
                bysykkel_station_id: row.bysykkel_station_id,
            },
        }
    }
}

/// Insertable category row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub icon: &'a str,
    pub color: &'a str,
}

impl<'a> From<&'a PoiCategory> for NewCategoryRow<'a> {
    fn from(category: &'a PoiCategory) -> Self {
        Self {
            id: &category.id,
            name: &category.name,
            icon: &category.icon,
            color: &category.color,
        }
    }
}

/// Insertable project link row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_pois)]
pub(crate) struct NewProjectPoiRow<'a> {
    pub project_id: &'a str,
    pub poi_id: &'a str,
}
