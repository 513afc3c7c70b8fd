//! PostgreSQL-backed POI repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Double, Integer, Nullable, Text, Timestamptz};
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use super::diesel_helpers::{
    describe_row_error, is_connection_error, map_diesel_error_message, map_pool_error_message,
};
use super::models::{ExistingPoiRow, NewCategoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{categories, pois};
use crate::domain::geo::BoundingBox;
use crate::domain::place_type::PoiCategory;
use crate::domain::poi::{ExistingPoi, PoiUpsertRecord, WriteIntent};
use crate::domain::ports::{
    POI_ID_ALREADY_STORED, PoiRepository, PoiRepositoryError, PoiUpsertReport,
};

/// Diesel implementation of [`PoiRepository`].
#[derive(Clone)]
pub struct DieselPoiRepository {
    pool: DbPool,
}

impl DieselPoiRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

macro_rules! insert_poi_sql {
    ($on_conflict:literal) => {
        concat!(
            r#"
INSERT INTO pois (
    id, name, lat, lng, address, category_id,
    google_place_id, entur_stopplace_id, bysykkel_station_id,
    google_rating, google_review_count, photo_reference, last_imported_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
"#,
            $on_conflict
        )
    };
}

// New rows only. A taken id affects zero rows and is reported per row.
const INSERT_SQL: &str = insert_poi_sql!("ON CONFLICT (id) DO NOTHING\n");

// Editorial columns appear in neither list. External ids are COALESCEd so a
// row matched through one provider keeps the ids recorded for the others.
const UPSERT_SQL: &str = insert_poi_sql!(
    r#"ON CONFLICT (id)
DO UPDATE SET
    name = EXCLUDED.name,
    lat = EXCLUDED.lat,
    lng = EXCLUDED.lng,
    address = EXCLUDED.address,
    category_id = EXCLUDED.category_id,
    google_place_id = COALESCE(EXCLUDED.google_place_id, pois.google_place_id),
    entur_stopplace_id = COALESCE(EXCLUDED.entur_stopplace_id, pois.entur_stopplace_id),
    bysykkel_station_id = COALESCE(EXCLUDED.bysykkel_station_id, pois.bysykkel_station_id),
    google_rating = EXCLUDED.google_rating,
    google_review_count = EXCLUDED.google_review_count,
    photo_reference = EXCLUDED.photo_reference,
    last_imported_at = EXCLUDED.last_imported_at
"#
);

fn statement_for(intent: WriteIntent) -> &'static str {
    match intent {
        WriteIntent::Insert => INSERT_SQL,
        WriteIntent::Update => UPSERT_SQL,
    }
}

fn map_pool_error(error: PoolError) -> PoiRepositoryError {
    PoiRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> PoiRepositoryError {
    let message = map_diesel_error_message(&error, operation);
    if is_connection_error(&error) {
        PoiRepositoryError::connection(message)
    } else {
        PoiRepositoryError::query(message)
    }
}

fn review_count_for_db(count: Option<u32>) -> Option<i32> {
    count.map(|value| i32::try_from(value).unwrap_or(i32::MAX))
}

async fn write_one(
    conn: &mut diesel_async::AsyncPgConnection,
    record: &PoiUpsertRecord,
) -> Result<usize, diesel::result::Error> {
    let imported_at: DateTime<Utc> = record.imported_at;
    sql_query(statement_for(record.intent))
        .bind::<Text, _>(&record.id)
        .bind::<Text, _>(&record.name)
        .bind::<Double, _>(record.coordinates.lat)
        .bind::<Double, _>(record.coordinates.lng)
        .bind::<Nullable<Text>, _>(record.address.as_deref())
        .bind::<Text, _>(&record.category_id)
        .bind::<Nullable<Text>, _>(record.external_ids.google_place_id.as_deref())
        .bind::<Nullable<Text>, _>(record.external_ids.entur_stopplace_id.as_deref())
        .bind::<Nullable<Text>, _>(record.external_ids.bysykkel_station_id.as_deref())
        .bind::<Nullable<Double>, _>(record.google_rating)
        .bind::<Nullable<Integer>, _>(review_count_for_db(record.google_review_count))
        .bind::<Nullable<Text>, _>(record.photo_reference.as_deref())
        .bind::<Timestamptz, _>(imported_at)
        .execute(conn)
        .await
}

#[async_trait]
impl PoiRepository for DieselPoiRepository {
    async fn find_in_bounding_box(
        &self,
        bounds: BoundingBox,
    ) -> Result<Vec<ExistingPoi>, PoiRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ExistingPoiRow> = pois::table
            .filter(pois::lat.between(bounds.min_lat, bounds.max_lat))
            .filter(pois::lng.between(bounds.min_lng, bounds.max_lng))
            .select(ExistingPoiRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "poi prefetch"))?;
        Ok(rows.into_iter().map(ExistingPoi::from).collect())
    }

    async fn upsert_categories(
        &self,
        categories: &[PoiCategory],
    ) -> Result<(), PoiRepositoryError> {
        if categories.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewCategoryRow<'_>> = categories.iter().map(NewCategoryRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(categories::table)
            .values(&rows)
            .on_conflict(categories::id)
            .do_update()
            .set((
                categories::name.eq(excluded(categories::name)),
                categories::icon.eq(excluded(categories::icon)),
                categories::color.eq(excluded(categories::color)),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "category upsert"))?;
        Ok(())
    }

    async fn upsert_pois(
        &self,
        records: &[PoiUpsertRecord],
    ) -> Result<PoiUpsertReport, PoiRepositoryError> {
        let mut report = PoiUpsertReport::default();
        if records.is_empty() {
            return Ok(report);
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        for record in records {
            match write_one(&mut conn, record).await {
                Ok(0) => report.push_error(&record.id, POI_ID_ALREADY_STORED),
                Ok(_) => report.written_ids.push(record.id.clone()),
                Err(err) => {
                    tracing::debug!(poi_id = %record.id, error = %err, "poi upsert failed");
                    report.push_error(&record.id, describe_row_error(&err));
                }
            }
        }
        Ok(report)
    }
}
