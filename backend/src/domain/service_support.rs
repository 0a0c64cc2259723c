//! Internal helpers shared by the obstacle registry services.

use crate::domain::ports::{ArchiveRepositoryError, CommentRepositoryError, ObstacleRepositoryError};
use crate::domain::{Caller, CommentValidationError, Error, Obstacle, ObstacleId};

pub(crate) fn map_obstacle_error(error: ObstacleRepositoryError) -> Error {
    match error {
        ObstacleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("obstacle repository unavailable: {message}"))
        }
        ObstacleRepositoryError::Query { message } => {
            Error::internal(format!("obstacle repository error: {message}"))
        }
    }
}

pub(crate) fn map_comment_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentRepositoryError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
    }
}

pub(crate) fn map_archive_error(error: ArchiveRepositoryError) -> Error {
    match error {
        ArchiveRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("archive repository unavailable: {message}"))
        }
        ArchiveRepositoryError::Query { message } => {
            Error::internal(format!("archive repository error: {message}"))
        }
    }
}

/// Audit text is generated from validated values, so a rejection here is a bug.
pub(crate) fn map_audit_text_error(error: CommentValidationError) -> Error {
    Error::internal(format!("failed to compose audit comment: {error}"))
}

pub(crate) fn obstacle_not_found(id: ObstacleId) -> Error {
    Error::not_found(format!("obstacle {id} not found"))
}

/// Owners and triagers may act on an obstacle; everyone else is refused.
pub(crate) fn require_owner_or_triager(caller: &Caller, obstacle: &Obstacle) -> Result<(), Error> {
    if obstacle.is_owned_by(caller.user_id()) || caller.is_triager() {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "obstacle {} belongs to another user",
            obstacle.id()
        )))
    }
}
