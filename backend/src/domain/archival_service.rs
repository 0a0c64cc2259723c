//! Archival of rejected obstacles and their restoration.
//!
//! The service reads and validates; the writes of each operation go to the
//! archive store as one unit of work. A failed archive leaves the obstacle
//! and its comments live, and a failed restore leaves only the record.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::access::AccessPolicy;
use crate::domain::ports::{
    ArchiveCommand, ArchiveObstacleRequest, ArchiveOutcome, ArchiveQuery, ArchiveRepository,
    ArchivedReportView, CommentRepository, DeleteArchivedReportRequest, GetArchivedReportRequest,
    ListArchivedReportsRequest, ObstacleRepository, RestoreArchivedReportRequest, RestoreOutcome,
    UserDirectory,
};
use crate::domain::service_support::{
    map_archive_error, map_comment_error, map_obstacle_error, obstacle_not_found,
};
use crate::domain::{
    ArchivalRecord, ArchiveId, ArchivedComments, CommentId, CommentText, Error,
    NewArchivalRecord, NewObstacle, Obstacle, ObstacleStatus, RestoredComment,
};

fn archive_not_found(id: ArchiveId) -> Error {
    Error::not_found(format!("archived report {id} not found"))
}

/// Status a restored obstacle may take.
fn restorable_status(code: i32) -> Result<ObstacleStatus, Error> {
    match ObstacleStatus::try_from(code) {
        Ok(status @ (ObstacleStatus::Pending | ObstacleStatus::Approved)) => Ok(status),
        Ok(ObstacleStatus::Rejected) | Err(_) => Err(Error::invalid_argument(format!(
            "restored reports must be pending (1) or approved (2), got {code}"
        ))),
    }
}

/// Decode stored comment texts, falling back to none when unreadable.
fn decode_comments(record: &ArchivalRecord) -> ArchivedComments {
    match ArchivedComments::decode(&record.comments_json) {
        Ok(comments) => comments,
        Err(err) => {
            warn!(
                archive_id = %record.id,
                error = %err,
                "archived comments could not be decoded; treating as empty"
            );
            ArchivedComments::default()
        }
    }
}

/// Service converting obstacles to archival records and back.
pub struct ArchivalService<O, C, A, D> {
    obstacles: Arc<O>,
    comments: Arc<C>,
    archive: Arc<A>,
    access: AccessPolicy<D>,
    clock: Arc<dyn Clock>,
}

impl<O, C, A, D> Clone for ArchivalService<O, C, A, D> {
    fn clone(&self) -> Self {
        Self {
            obstacles: Arc::clone(&self.obstacles),
            comments: Arc::clone(&self.comments),
            archive: Arc::clone(&self.archive),
            access: self.access.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<O, C, A, D> ArchivalService<O, C, A, D> {
    /// Create the service over its stores.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use obstacle_registry::domain::ArchivalService;
    /// # use obstacle_registry::domain::ports::{
    /// #     FixtureArchiveRepository, FixtureCommentRepository, FixtureObstacleRepository,
    /// #     FixtureUserDirectory,
    /// # };
    /// let service = ArchivalService::new(
    ///     Arc::new(FixtureObstacleRepository),
    ///     Arc::new(FixtureCommentRepository),
    ///     Arc::new(FixtureArchiveRepository),
    ///     Arc::new(FixtureUserDirectory::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        obstacles: Arc<O>,
        comments: Arc<C>,
        archive: Arc<A>,
        directory: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            obstacles,
            comments,
            archive,
            access: AccessPolicy::new(directory),
            clock,
        }
    }
}

impl<O, C, A, D> ArchivalService<O, C, A, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    A: ArchiveRepository,
    D: UserDirectory,
{
    /// Fold `obstacle` and its comments into one archival record.
    ///
    /// The comments are read first; writing the record and deleting the
    /// comments and the obstacle then commit together.
    pub async fn archive(&self, obstacle: &Obstacle) -> Result<ArchiveOutcome, Error> {
        let comments = self
            .comments
            .list_for_obstacle(obstacle.id())
            .await
            .map_err(map_comment_error)?;
        let captured = ArchivedComments::capture(&comments);
        let new_record = NewArchivalRecord::capture(obstacle, &captured, self.clock.utc())
            .map_err(|err| Error::internal(format!("failed to encode archived comments: {err}")))?;
        let comment_ids: Vec<CommentId> = comments.iter().map(|comment| comment.id).collect();

        let record = self
            .archive
            .archive_obstacle(&new_record, &comment_ids)
            .await
            .map_err(map_archive_error)?;

        info!(
            obstacle_id = %obstacle.id(),
            archive_id = %record.id,
            comments = comment_ids.len(),
            "obstacle archived"
        );
        Ok(ArchiveOutcome {
            record,
            archived_comment_count: comment_ids.len(),
        })
    }

    /// Recreate a live obstacle from an archival record.
    ///
    /// The status is checked before anything is read or written. The new
    /// obstacle has no owner; comments are recreated in stored order and
    /// receive fresh ids. Creating the obstacle and its comments and
    /// deleting the record commit together.
    pub async fn restore(
        &self,
        archive_id: ArchiveId,
        status_code: i32,
    ) -> Result<RestoreOutcome, Error> {
        let status = restorable_status(status_code)?;
        let record = self
            .archive
            .find_by_id(archive_id)
            .await
            .map_err(map_archive_error)?
            .ok_or_else(|| archive_not_found(archive_id))?;

        let comments: Vec<RestoredComment> = decode_comments(&record)
            .into_texts()
            .into_iter()
            .filter_map(|raw| match CommentText::new(raw) {
                Ok(text) => Some(RestoredComment::from_text(text)),
                Err(err) => {
                    warn!(
                        archive_id = %archive_id,
                        error = %err,
                        "skipping unusable archived comment"
                    );
                    None
                }
            })
            .collect();

        let obstacle = self
            .archive
            .restore_obstacle(
                record.id,
                &NewObstacle {
                    owner: None,
                    details: record.details.clone(),
                    geometry: record.geometry.clone(),
                    status,
                },
                &comments,
            )
            .await
            .map_err(map_archive_error)?;

        info!(
            archive_id = %archive_id,
            obstacle_id = %obstacle.id(),
            status = %status,
            comments = comments.len(),
            "archived report restored"
        );
        Ok(RestoreOutcome {
            obstacle,
            restored_comment_count: comments.len(),
        })
    }
}

#[async_trait]
impl<O, C, A, D> ArchiveCommand for ArchivalService<O, C, A, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    A: ArchiveRepository,
    D: UserDirectory,
{
    async fn archive_obstacle(
        &self,
        request: ArchiveObstacleRequest,
    ) -> Result<ArchiveOutcome, Error> {
        self.access.require_triager(&request.actor).await?;
        let obstacle = self
            .obstacles
            .find_by_id(request.obstacle_id)
            .await
            .map_err(map_obstacle_error)?
            .ok_or_else(|| obstacle_not_found(request.obstacle_id))?;
        self.archive(&obstacle).await
    }

    async fn restore_archived_report(
        &self,
        request: RestoreArchivedReportRequest,
    ) -> Result<RestoreOutcome, Error> {
        restorable_status(request.status)?;
        self.access.require_triager(&request.actor).await?;
        self.restore(request.archive_id, request.status).await
    }

    async fn delete_archived_report(
        &self,
        request: DeleteArchivedReportRequest,
    ) -> Result<(), Error> {
        self.access.require_triager(&request.actor).await?;
        let removed = self
            .archive
            .delete(request.archive_id)
            .await
            .map_err(map_archive_error)?;
        if !removed {
            return Err(archive_not_found(request.archive_id));
        }
        info!(archive_id = %request.archive_id, "archived report deleted");
        Ok(())
    }
}

#[async_trait]
impl<O, C, A, D> ArchiveQuery for ArchivalService<O, C, A, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    A: ArchiveRepository,
    D: UserDirectory,
{
    async fn list_archived_reports(
        &self,
        request: ListArchivedReportsRequest,
    ) -> Result<Vec<ArchivalRecord>, Error> {
        self.access.require_triager(&request.actor).await?;
        self.archive.list().await.map_err(map_archive_error)
    }

    async fn get_archived_report(
        &self,
        request: GetArchivedReportRequest,
    ) -> Result<ArchivedReportView, Error> {
        self.access.require_triager(&request.actor).await?;
        let record = self
            .archive
            .find_by_id(request.archive_id)
            .await
            .map_err(map_archive_error)?
            .ok_or_else(|| archive_not_found(request.archive_id))?;
        let comments = decode_comments(&record).into_texts();
        Ok(ArchivedReportView { record, comments })
    }
}

#[cfg(test)]
#[path = "archival_service_tests.rs"]
mod tests;
