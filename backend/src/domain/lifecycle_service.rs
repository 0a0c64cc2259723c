//! Obstacle lifecycle: submission, triage status changes and edits.
//!
//! Pending obstacles may move to approved and back freely. Rejection is
//! terminal for the live obstacle: it is handed to the [`ArchivalService`]
//! and replaced by an archival record.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::access::AccessPolicy;
use crate::domain::comment::audit;
use crate::domain::ports::{
    AddCommentRequest, ArchiveRepository, CommentRepository, CreateObstacleRequest,
    DeleteObstacleRequest, EditObstaclePropertiesRequest, GetObstacleRequest,
    ListObstaclesByStatusRequest, ListOwnedObstaclesRequest, ObstacleCommand, ObstacleQuery,
    ObstacleRepository, ObstacleView, QuickSaveObstacleRequest, SetObstacleStatusRequest,
    StatusChange, UserDirectory,
};
use crate::domain::service_support::{
    map_audit_text_error, map_comment_error, map_obstacle_error, obstacle_not_found,
    require_owner_or_triager,
};
use crate::domain::{
    ArchivalService, Comment, CommentText, CommentValidationError, Error, Geometry, NewComment,
    NewObstacle, Obstacle, ObstacleDetails, ObstacleId, ObstacleStatus, UserRole,
};

fn parse_status(code: i32) -> Result<ObstacleStatus, Error> {
    ObstacleStatus::try_from(code).map_err(|err| Error::invalid_argument(err.to_string()))
}

/// Service implementing the obstacle driving ports.
pub struct ObstacleLifecycleService<O, C, A, D> {
    obstacles: Arc<O>,
    comments: Arc<C>,
    access: AccessPolicy<D>,
    archival: ArchivalService<O, C, A, D>,
}

impl<O, C, A, D> Clone for ObstacleLifecycleService<O, C, A, D> {
    fn clone(&self) -> Self {
        Self {
            obstacles: Arc::clone(&self.obstacles),
            comments: Arc::clone(&self.comments),
            access: self.access.clone(),
            archival: self.archival.clone(),
        }
    }
}

impl<O, C, A, D> ObstacleLifecycleService<O, C, A, D> {
    /// Create the service; rejections are delegated to `archival`.
    pub fn new(
        obstacles: Arc<O>,
        comments: Arc<C>,
        directory: Arc<D>,
        archival: ArchivalService<O, C, A, D>,
    ) -> Self {
        Self {
            obstacles,
            comments,
            access: AccessPolicy::new(directory),
            archival,
        }
    }
}

impl<O, C, A, D> ObstacleLifecycleService<O, C, A, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    A: ArchiveRepository,
    D: UserDirectory,
{
    async fn load(&self, id: ObstacleId) -> Result<Obstacle, Error> {
        self.obstacles
            .find_by_id(id)
            .await
            .map_err(map_obstacle_error)?
            .ok_or_else(|| obstacle_not_found(id))
    }

    async fn write_audit(&self, obstacle_id: ObstacleId, text: CommentText) -> Result<(), Error> {
        self.comments
            .create(&NewComment::system(obstacle_id, text))
            .await
            .map_err(map_comment_error)?;
        Ok(())
    }

    async fn persist_submission(
        &self,
        new: NewObstacle,
        compose: fn(&Obstacle) -> Result<CommentText, CommentValidationError>,
    ) -> Result<Obstacle, Error> {
        let obstacle = self
            .obstacles
            .create(&new)
            .await
            .map_err(map_obstacle_error)?;
        let text = compose(&obstacle).map_err(map_audit_text_error)?;
        self.write_audit(obstacle.id(), text).await?;
        Ok(obstacle)
    }
}

#[async_trait]
impl<O, C, A, D> ObstacleCommand for ObstacleLifecycleService<O, C, A, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    A: ArchiveRepository,
    D: UserDirectory,
{
    async fn create_obstacle(&self, request: CreateObstacleRequest) -> Result<Obstacle, Error> {
        let caller = self
            .access
            .require_any(&request.actor, &[UserRole::Pilot])
            .await?;
        let new = NewObstacle::from_draft(caller.user_id().clone(), request.draft)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        let obstacle = self.persist_submission(new, audit::submitted).await?;
        info!(obstacle_id = %obstacle.id(), owner = %caller.user_id(), "obstacle submitted");
        Ok(obstacle)
    }

    async fn quick_save_obstacle(
        &self,
        request: QuickSaveObstacleRequest,
    ) -> Result<Obstacle, Error> {
        let caller = self
            .access
            .require_any(&request.actor, &[UserRole::Pilot])
            .await?;
        let geometry = Geometry::new(request.geometry)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        let new = NewObstacle::quick(caller.user_id().clone(), geometry);
        let obstacle = self.persist_submission(new, audit::quick_saved).await?;
        info!(obstacle_id = %obstacle.id(), owner = %caller.user_id(), "obstacle quick-saved");
        Ok(obstacle)
    }

    async fn set_obstacle_status(
        &self,
        request: SetObstacleStatusRequest,
    ) -> Result<StatusChange, Error> {
        let status = parse_status(request.status)?;
        self.access.require_triager(&request.actor).await?;
        let mut obstacle = self.load(request.obstacle_id).await?;

        if status == ObstacleStatus::Rejected {
            let outcome = self.archival.archive(&obstacle).await?;
            return Ok(StatusChange::Archived {
                record: outcome.record,
                archived_comment_count: outcome.archived_comment_count,
            });
        }

        let previous = obstacle.status();
        obstacle.set_status(status);
        let updated = self
            .obstacles
            .replace(&obstacle)
            .await
            .map_err(map_obstacle_error)?;
        info!(
            obstacle_id = %updated.id(),
            from = %previous,
            to = %status,
            "obstacle status changed"
        );
        Ok(StatusChange::Updated(updated))
    }

    async fn edit_obstacle_properties(
        &self,
        request: EditObstaclePropertiesRequest,
    ) -> Result<Obstacle, Error> {
        let caller = self.access.caller(&request.actor).await?;
        let mut obstacle = self.load(request.obstacle_id).await?;
        require_owner_or_triager(&caller, &obstacle)?;
        if obstacle.status() != ObstacleStatus::Pending {
            return Err(Error::invalid_state("can only edit while under review"));
        }

        let details = ObstacleDetails::try_new(
            request.name.unwrap_or_default(),
            request.height,
            request.description.unwrap_or_default(),
        )
        .map_err(|err| Error::invalid_argument(err.to_string()))?;
        let before = obstacle.details().clone();
        obstacle.set_details(details);

        let updated = self
            .obstacles
            .replace(&obstacle)
            .await
            .map_err(map_obstacle_error)?;
        let text = audit::edited(&before, &updated).map_err(map_audit_text_error)?;
        self.write_audit(updated.id(), text).await?;
        info!(obstacle_id = %updated.id(), "obstacle properties edited");
        Ok(updated)
    }

    async fn add_comment(&self, request: AddCommentRequest) -> Result<Comment, Error> {
        let text = CommentText::new(request.text)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        let caller = self.access.caller(&request.actor).await?;
        let obstacle = self.load(request.obstacle_id).await?;
        require_owner_or_triager(&caller, &obstacle)?;

        self.comments
            .create(&NewComment::human(obstacle.id(), text))
            .await
            .map_err(map_comment_error)
    }

    async fn delete_obstacle(&self, request: DeleteObstacleRequest) -> Result<(), Error> {
        let caller = self.access.caller(&request.actor).await?;
        let obstacle = self.load(request.obstacle_id).await?;
        require_owner_or_triager(&caller, &obstacle)?;

        let removed = self
            .obstacles
            .delete(obstacle.id())
            .await
            .map_err(map_obstacle_error)?;
        if !removed {
            return Err(obstacle_not_found(obstacle.id()));
        }
        info!(obstacle_id = %obstacle.id(), "obstacle deleted");
        Ok(())
    }
}

#[async_trait]
impl<O, C, A, D> ObstacleQuery for ObstacleLifecycleService<O, C, A, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    A: ArchiveRepository,
    D: UserDirectory,
{
    async fn get_obstacle(&self, request: GetObstacleRequest) -> Result<ObstacleView, Error> {
        let caller = self.access.caller(&request.actor).await?;
        let obstacle = self.load(request.obstacle_id).await?;
        require_owner_or_triager(&caller, &obstacle)?;
        let comments = self
            .comments
            .list_for_obstacle(obstacle.id())
            .await
            .map_err(map_comment_error)?;
        Ok(ObstacleView { obstacle, comments })
    }

    async fn list_owned(
        &self,
        request: ListOwnedObstaclesRequest,
    ) -> Result<Vec<Obstacle>, Error> {
        self.obstacles
            .list_by_owner(&request.actor)
            .await
            .map_err(map_obstacle_error)
    }

    async fn list_by_status(
        &self,
        request: ListObstaclesByStatusRequest,
    ) -> Result<Vec<Obstacle>, Error> {
        let status = parse_status(request.status)?;
        self.access.require_triager(&request.actor).await?;
        self.obstacles
            .list_by_status(status)
            .await
            .map_err(map_obstacle_error)
    }
}

#[cfg(test)]
#[path = "lifecycle_service_tests.rs"]
mod tests;
