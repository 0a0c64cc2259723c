//! Port for comment persistence.

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, NewComment, ObstacleId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "comment repository query failed: {message}",
    }
}

/// Port for reading and writing obstacle comments.
///
/// Identifiers are assigned in strictly increasing order; every listing is
/// returned id ascending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments attached to one obstacle.
    async fn list_for_obstacle(
        &self,
        obstacle_id: ObstacleId,
    ) -> Result<Vec<Comment>, CommentRepositoryError>;

    /// Comments attached to any of `obstacle_ids`.
    async fn list_by_obstacle_ids(
        &self,
        obstacle_ids: &[ObstacleId],
    ) -> Result<Vec<Comment>, CommentRepositoryError>;

    /// Persist a comment and return it with its assigned id.
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Delete the given comments, returning how many rows were removed.
    async fn delete_many(&self, ids: &[CommentId]) -> Result<u64, CommentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise comment storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommentRepository;

#[async_trait]
impl CommentRepository for FixtureCommentRepository {
    async fn list_for_obstacle(
        &self,
        _obstacle_id: ObstacleId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_by_obstacle_ids(
        &self,
        _obstacle_ids: &[ObstacleId],
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        Ok(Vec::new())
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        Ok(Comment {
            id: CommentId::new(1),
            obstacle_id: comment.obstacle_id,
            text: comment.text.clone(),
            authored_by: comment.authored_by,
        })
    }

    async fn delete_many(&self, ids: &[CommentId]) -> Result<u64, CommentRepositoryError> {
        Ok(u64::try_from(ids.len()).unwrap_or(u64::MAX))
    }
}
