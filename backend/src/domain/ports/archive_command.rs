//! Driving port for archive mutations.

use async_trait::async_trait;

use crate::domain::{
    ArchivalRecord, ArchiveId, Error, Obstacle, ObstacleId, ObstacleStatus, UserId,
};

/// Request to archive an obstacle directly, without a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveObstacleRequest {
    /// Acting registrar or admin.
    pub actor: UserId,
    /// Obstacle to archive.
    pub obstacle_id: ObstacleId,
}

/// Result of archiving an obstacle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutcome {
    /// The record now holding the obstacle's data.
    pub record: ArchivalRecord,
    /// Number of comments folded into the record.
    pub archived_comment_count: usize,
}

/// Request to bring an archived report back as a live obstacle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreArchivedReportRequest {
    /// Acting registrar or admin.
    pub actor: UserId,
    /// Record to restore.
    pub archive_id: ArchiveId,
    /// Raw status for the restored obstacle; must be pending or approved.
    pub status: i32,
}

/// Result of a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// The recreated obstacle; it has a new id and no owner.
    pub obstacle: Obstacle,
    /// Number of comments recreated from the record.
    pub restored_comment_count: usize,
}

/// Request to permanently delete an archived report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteArchivedReportRequest {
    /// Acting registrar or admin.
    pub actor: UserId,
    /// Record to delete.
    pub archive_id: ArchiveId,
}

/// Driving port for archive write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveCommand: Send + Sync {
    /// Move an obstacle and its comments into an archival record.
    async fn archive_obstacle(
        &self,
        request: ArchiveObstacleRequest,
    ) -> Result<ArchiveOutcome, Error>;

    /// Recreate an obstacle and its comments from an archival record.
    async fn restore_archived_report(
        &self,
        request: RestoreArchivedReportRequest,
    ) -> Result<RestoreOutcome, Error>;

    /// Permanently delete an archival record.
    async fn delete_archived_report(
        &self,
        request: DeleteArchivedReportRequest,
    ) -> Result<(), Error>;
}

/// Fixture command with an empty archive.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureArchiveCommand;

#[async_trait]
impl ArchiveCommand for FixtureArchiveCommand {
    async fn archive_obstacle(
        &self,
        request: ArchiveObstacleRequest,
    ) -> Result<ArchiveOutcome, Error> {
        Err(Error::not_found(format!(
            "obstacle {} not found",
            request.obstacle_id
        )))
    }

    async fn restore_archived_report(
        &self,
        request: RestoreArchivedReportRequest,
    ) -> Result<RestoreOutcome, Error> {
        match ObstacleStatus::try_from(request.status) {
            Ok(ObstacleStatus::Pending | ObstacleStatus::Approved) => Err(Error::not_found(
                format!("archived report {} not found", request.archive_id),
            )),
            _ => Err(Error::invalid_argument(
                "restored reports must be pending (1) or approved (2)",
            )),
        }
    }

    async fn delete_archived_report(
        &self,
        request: DeleteArchivedReportRequest,
    ) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "archived report {} not found",
            request.archive_id
        )))
    }
}
