//! Port for archival record persistence.
//!
//! Archiving and restoring each touch three tables. Adapters run each of
//! them as one unit of work: it either commits whole or leaves every table
//! untouched, so a retry always starts from the original state.

use async_trait::async_trait;

use crate::domain::{
    ArchivalRecord, ArchiveId, CommentId, NewArchivalRecord, NewObstacle, Obstacle, ObstacleId,
    RestoredComment,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by archive repository adapters.
    pub enum ArchiveRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "archive repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "archive repository query failed: {message}",
    }
}

/// Port for the archive of rejected obstacles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Find a record by id.
    async fn find_by_id(
        &self,
        id: ArchiveId,
    ) -> Result<Option<ArchivalRecord>, ArchiveRepositoryError>;

    /// All records, newest archival first.
    async fn list(&self) -> Result<Vec<ArchivalRecord>, ArchiveRepositoryError>;

    /// Write `record`, delete the comments in `comment_ids` and delete the
    /// obstacle `record.original_obstacle_id`, as one unit.
    ///
    /// Fails with a `Query` error, changing nothing, when the obstacle is
    /// gone or its comments are no longer exactly `comment_ids`. A record
    /// already holding the same `original_obstacle_id` is overwritten and
    /// keeps its id.
    async fn archive_obstacle(
        &self,
        record: &NewArchivalRecord,
        comment_ids: &[CommentId],
    ) -> Result<ArchivalRecord, ArchiveRepositoryError>;

    /// Create `obstacle` with `comments` in order, then delete the record
    /// `archive_id`, as one unit.
    ///
    /// Fails with a `Query` error, creating nothing, when the record is gone.
    async fn restore_obstacle(
        &self,
        archive_id: ArchiveId,
        obstacle: &NewObstacle,
        comments: &[RestoredComment],
    ) -> Result<Obstacle, ArchiveRepositoryError>;

    /// Delete a record. Returns whether a row was removed.
    async fn delete(&self, id: ArchiveId) -> Result<bool, ArchiveRepositoryError>;
}

/// Fixture implementation for tests that do not exercise archive storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureArchiveRepository;

#[async_trait]
impl ArchiveRepository for FixtureArchiveRepository {
    async fn find_by_id(
        &self,
        _id: ArchiveId,
    ) -> Result<Option<ArchivalRecord>, ArchiveRepositoryError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<ArchivalRecord>, ArchiveRepositoryError> {
        Ok(Vec::new())
    }

    async fn archive_obstacle(
        &self,
        record: &NewArchivalRecord,
        _comment_ids: &[CommentId],
    ) -> Result<ArchivalRecord, ArchiveRepositoryError> {
        Ok(record.clone().with_id(ArchiveId::new(1)))
    }

    async fn restore_obstacle(
        &self,
        _archive_id: ArchiveId,
        obstacle: &NewObstacle,
        _comments: &[RestoredComment],
    ) -> Result<Obstacle, ArchiveRepositoryError> {
        Ok(obstacle.clone().with_id(ObstacleId::new(1)))
    }

    async fn delete(&self, _id: ArchiveId) -> Result<bool, ArchiveRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_list_is_empty() {
        let records = FixtureArchiveRepository
            .list()
            .await
            .expect("fixture list succeeds");
        assert!(records.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_delete_reports_nothing_removed() {
        let removed = FixtureArchiveRepository
            .delete(ArchiveId::new(5))
            .await
            .expect("fixture delete succeeds");
        assert!(!removed);
    }
}
