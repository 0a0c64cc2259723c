//! Driving port for obstacle mutations.
//!
//! Every request names the acting user; role checks happen behind the port so
//! adapters only need to establish who is calling.

use async_trait::async_trait;

use crate::domain::{
    ArchivalRecord, Comment, CommentId, CommentText, Error, Geometry, NewObstacle, Obstacle,
    ObstacleDetails, ObstacleDraft, ObstacleId, ObstacleStatus, UserId,
};

/// Request to submit a fully described obstacle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateObstacleRequest {
    /// Reporting pilot.
    pub actor: UserId,
    /// Unvalidated submission.
    pub draft: ObstacleDraft,
}

/// Request to save an obstacle location only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSaveObstacleRequest {
    /// Reporting pilot.
    pub actor: UserId,
    /// GeoJSON payload.
    pub geometry: String,
}

/// Request to move an obstacle to another status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetObstacleStatusRequest {
    /// Acting registrar or admin.
    pub actor: UserId,
    /// Target obstacle.
    pub obstacle_id: ObstacleId,
    /// Raw status code as received; validated behind the port.
    pub status: i32,
}

/// Request to overwrite the editable properties of a pending obstacle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditObstaclePropertiesRequest {
    /// Owner, registrar or admin.
    pub actor: UserId,
    /// Target obstacle.
    pub obstacle_id: ObstacleId,
    /// New name; `None` clears it.
    pub name: Option<String>,
    /// New description; `None` clears it.
    pub description: Option<String>,
    /// New height in metres.
    pub height: i32,
}

/// Request to attach a person-written comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommentRequest {
    /// Owner, registrar or admin.
    pub actor: UserId,
    /// Target obstacle.
    pub obstacle_id: ObstacleId,
    /// Comment body.
    pub text: String,
}

/// Request to delete an obstacle without archiving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteObstacleRequest {
    /// Owner, registrar or admin.
    pub actor: UserId,
    /// Target obstacle.
    pub obstacle_id: ObstacleId,
}

/// Outcome of a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// The obstacle stays live with its new status.
    Updated(Obstacle),
    /// The obstacle was rejected and replaced by an archival record.
    Archived {
        /// The record now holding the obstacle's data.
        record: ArchivalRecord,
        /// Number of comments folded into the record.
        archived_comment_count: usize,
    },
}

/// Driving port for obstacle write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObstacleCommand: Send + Sync {
    /// Submit a complete obstacle and write a "sendt inn" audit comment.
    async fn create_obstacle(&self, request: CreateObstacleRequest) -> Result<Obstacle, Error>;

    /// Save a location-only obstacle and write a "hurtiglagret" audit comment.
    async fn quick_save_obstacle(
        &self,
        request: QuickSaveObstacleRequest,
    ) -> Result<Obstacle, Error>;

    /// Change status; rejecting archives the obstacle.
    async fn set_obstacle_status(
        &self,
        request: SetObstacleStatusRequest,
    ) -> Result<StatusChange, Error>;

    /// Overwrite properties of a pending obstacle and write an audit comment.
    async fn edit_obstacle_properties(
        &self,
        request: EditObstaclePropertiesRequest,
    ) -> Result<Obstacle, Error>;

    /// Attach a person-written comment.
    async fn add_comment(&self, request: AddCommentRequest) -> Result<Comment, Error>;

    /// Delete an obstacle and its comments without archiving.
    async fn delete_obstacle(&self, request: DeleteObstacleRequest) -> Result<(), Error>;
}

/// Fixture command that validates input and echoes it back without storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObstacleCommand;

#[async_trait]
impl ObstacleCommand for FixtureObstacleCommand {
    async fn create_obstacle(&self, request: CreateObstacleRequest) -> Result<Obstacle, Error> {
        let new = NewObstacle::from_draft(request.actor, request.draft)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        Ok(new.with_id(ObstacleId::new(1)))
    }

    async fn quick_save_obstacle(
        &self,
        request: QuickSaveObstacleRequest,
    ) -> Result<Obstacle, Error> {
        let geometry = Geometry::new(request.geometry)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        Ok(NewObstacle::quick(request.actor, geometry).with_id(ObstacleId::new(1)))
    }

    async fn set_obstacle_status(
        &self,
        request: SetObstacleStatusRequest,
    ) -> Result<StatusChange, Error> {
        ObstacleStatus::try_from(request.status)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        Err(Error::not_found(format!(
            "obstacle {} not found",
            request.obstacle_id
        )))
    }

    async fn edit_obstacle_properties(
        &self,
        request: EditObstaclePropertiesRequest,
    ) -> Result<Obstacle, Error> {
        ObstacleDetails::try_new(
            request.name.unwrap_or_default(),
            request.height,
            request.description.unwrap_or_default(),
        )
        .map_err(|err| Error::invalid_argument(err.to_string()))?;
        Err(Error::not_found(format!(
            "obstacle {} not found",
            request.obstacle_id
        )))
    }

    async fn add_comment(&self, request: AddCommentRequest) -> Result<Comment, Error> {
        let text =
            CommentText::new(request.text).map_err(|err| Error::invalid_argument(err.to_string()))?;
        Ok(Comment {
            id: CommentId::new(1),
            obstacle_id: request.obstacle_id,
            text,
            authored_by: crate::domain::CommentAuthor::Human,
        })
    }

    async fn delete_obstacle(&self, request: DeleteObstacleRequest) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "obstacle {} not found",
            request.obstacle_id
        )))
    }
}
