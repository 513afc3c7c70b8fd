//! Driven port for attaching imported POIs to a customer project.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while linking POIs to a project.
    pub enum ProjectLinkRepositoryError {
        /// No project exists with the given id.
        ProjectNotFound { project_id: String } =>
            "project {project_id} does not exist",
        /// The store could not be reached.
        Connection { message: String } =>
            "project link connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } =>
            "project link query failed: {message}",
    }
}

/// Port for the `project_pois` association.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectLinkRepository: Send + Sync {
    /// Link every POI id to `project_id`. Existing links are kept as is.
    async fn link_pois(
        &self,
        project_id: &str,
        poi_ids: &[String],
    ) -> Result<(), ProjectLinkRepositoryError>;
}

/// Fixture that accepts every link.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureProjectLinkRepository;

#[async_trait]
impl ProjectLinkRepository for FixtureProjectLinkRepository {
    async fn link_pois(
        &self,
        _project_id: &str,
        _poi_ids: &[String],
    ) -> Result<(), ProjectLinkRepositoryError> {
        Ok(())
    }
}
