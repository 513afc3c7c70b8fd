//! PostgreSQL-backed project link repository.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_helpers::{
    is_connection_error, map_diesel_error_message, map_pool_error_message, violated_foreign_key,
};
use super::models::NewProjectPoiRow;
use super::pool::DbPool;
use super::schema::{project_pois, projects};
use crate::domain::ports::{ProjectLinkRepository, ProjectLinkRepositoryError};

/// Diesel implementation of [`ProjectLinkRepository`].
#[derive(Clone)]
pub struct DieselProjectLinkRepository {
    pool: DbPool,
}

impl DieselProjectLinkRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error, project_id: &str) -> ProjectLinkRepositoryError {
    if violated_foreign_key(&error).is_some_and(|name| name.contains("project_id")) {
        return ProjectLinkRepositoryError::project_not_found(project_id);
    }
    let message = map_diesel_error_message(&error, "project link");
    if is_connection_error(&error) {
        ProjectLinkRepositoryError::connection(message)
    } else {
        ProjectLinkRepositoryError::query(message)
    }
}

#[async_trait]
impl ProjectLinkRepository for DieselProjectLinkRepository {
    async fn link_pois(
        &self,
        project_id: &str,
        poi_ids: &[String],
    ) -> Result<(), ProjectLinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            ProjectLinkRepositoryError::connection(map_pool_error_message(err))
        })?;

        let project_exists: bool = diesel::select(exists(
            projects::table.filter(projects::id.eq(project_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, project_id))?;
        if !project_exists {
            return Err(ProjectLinkRepositoryError::project_not_found(project_id));
        }

        let rows: Vec<NewProjectPoiRow<'_>> = poi_ids
            .iter()
            .map(|poi_id| NewProjectPoiRow {
                project_id,
                poi_id,
            })
            .collect();
        diesel::insert_into(project_pois::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, project_id))?;
        Ok(())
    }
}
