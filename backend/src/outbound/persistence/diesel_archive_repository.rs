//! PostgreSQL-backed `ArchiveRepository` implementation using Diesel ORM.
//!
//! Archiving and restoring each run in one transaction across the obstacle,
//! comment and archive tables. `original_obstacle_id` is unique, so a record
//! for the same obstacle is overwritten in place.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ArchiveRepository, ArchiveRepositoryError};
use crate::domain::{
    ArchivalRecord, ArchiveId, CommentId, Geometry, NewArchivalRecord, NewObstacle, Obstacle,
    ObstacleDetails, ObstacleId, RestoredComment,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_obstacle_repository::{row_to_obstacle, values as obstacle_values};
use super::models::{ArchivedReportRow, ArchivedReportValues, NewCommentRow, ObstacleRow};
use super::pool::{DbPool, PoolError};
use super::schema::{archived_reports, obstacle_comments, obstacles};

/// Diesel-backed implementation of the `ArchiveRepository` port.
#[derive(Clone)]
pub struct DieselArchiveRepository {
    pool: DbPool,
}

impl DieselArchiveRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArchiveRepositoryError {
    map_basic_pool_error(error, ArchiveRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ArchiveRepositoryError {
    map_basic_diesel_error(
        error,
        ArchiveRepositoryError::query,
        ArchiveRepositoryError::connection,
    )
}

/// Failure inside an archive or restore transaction.
#[derive(Debug, thiserror::Error)]
enum UnitOfWorkError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
    /// The rows changed since the service read them; the transaction rolls
    /// back.
    #[error("{0}")]
    Stale(String),
}

fn map_unit_error(error: UnitOfWorkError) -> ArchiveRepositoryError {
    match error {
        UnitOfWorkError::Diesel(err) => map_diesel_error(err),
        UnitOfWorkError::Stale(message) => ArchiveRepositoryError::query(message),
    }
}

fn row_to_record(row: ArchivedReportRow) -> Result<ArchivalRecord, ArchiveRepositoryError> {
    let id = row.id;
    let invalid = |err: &dyn std::fmt::Display| {
        ArchiveRepositoryError::query(format!("stored archive record {id} is invalid: {err}"))
    };
    let details = ObstacleDetails::try_new(row.name, row.height, row.description)
        .map_err(|err| invalid(&err))?;
    let geometry = Geometry::new(row.geometry).map_err(|err| invalid(&err))?;
    Ok(ArchivalRecord {
        id: ArchiveId::new(id),
        original_obstacle_id: ObstacleId::new(row.original_obstacle_id),
        details,
        geometry,
        archived_at: row.archived_at,
        comments_json: row.comments_json,
    })
}

fn values(record: &NewArchivalRecord) -> ArchivedReportValues<'_> {
    ArchivedReportValues {
        original_obstacle_id: record.original_obstacle_id.get(),
        name: &record.details.name,
        height: record.details.height.metres(),
        description: record.details.description.as_str(),
        geometry: record.geometry.as_str(),
        archived_at: record.archived_at,
        comments_json: &record.comments_json,
    }
}

#[async_trait]
impl ArchiveRepository for DieselArchiveRepository {
    async fn find_by_id(
        &self,
        id: ArchiveId,
    ) -> Result<Option<ArchivalRecord>, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ArchivedReportRow> = archived_reports::table
            .find(id.get())
            .select(ArchivedReportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn list(&self) -> Result<Vec<ArchivalRecord>, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ArchivedReportRow> = archived_reports::table
            .order((archived_reports::archived_at.desc(), archived_reports::id.desc()))
            .select(ArchivedReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn archive_obstacle(
        &self,
        record: &NewArchivalRecord,
        comment_ids: &[CommentId],
    ) -> Result<ArchivalRecord, ArchiveRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row_values = values(record);
        let obstacle_id = record.original_obstacle_id.get();
        let ids: Vec<i64> = comment_ids.iter().map(|id| id.get()).collect();

        let row: ArchivedReportRow = conn
            .transaction(|conn| {
                async move {
                    // Row lock blocks concurrent comment inserts until commit.
                    let locked: Option<i64> = obstacles::table
                        .find(obstacle_id)
                        .select(obstacles::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Err(UnitOfWorkError::Stale(format!(
                            "obstacle {obstacle_id} no longer exists"
                        )));
                    }

                    let row: ArchivedReportRow = diesel::insert_into(archived_reports::table)
                        .values(&row_values)
                        .on_conflict(archived_reports::original_obstacle_id)
                        .do_update()
                        .set(&row_values)
                        .returning(ArchivedReportRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let expected = ids.len();
                    let removed = diesel::delete(
                        obstacle_comments::table
                            .filter(obstacle_comments::obstacle_id.eq(obstacle_id))
                            .filter(obstacle_comments::id.eq_any(ids)),
                    )
                    .execute(conn)
                    .await?;
                    let remaining: i64 = obstacle_comments::table
                        .filter(obstacle_comments::obstacle_id.eq(obstacle_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if removed != expected || remaining > 0 {
                        return Err(UnitOfWorkError::Stale(format!(
                            "comment trail of obstacle {obstacle_id} changed while archiving"
                        )));
                    }

                    diesel::delete(obstacles::table.find(obstacle_id))
                        .execute(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_unit_error)?;

        debug!(
            archive_id = row.id,
            original_obstacle_id = row.original_obstacle_id,
            "obstacle archived"
        );
        row_to_record(row)
    }

    async fn restore_obstacle(
        &self,
        archive_id: ArchiveId,
        obstacle: &NewObstacle,
        comments: &[RestoredComment],
    ) -> Result<Obstacle, ArchiveRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_obstacle = obstacle_values(
            obstacle.owner.as_ref(),
            &obstacle.details,
            &obstacle.geometry,
            obstacle.status,
        );

        let row: ObstacleRow = conn
            .transaction(|conn| {
                async move {
                    let row: ObstacleRow = diesel::insert_into(obstacles::table)
                        .values(new_obstacle)
                        .returning(ObstacleRow::as_returning())
                        .get_result(conn)
                        .await?;

                    // One statement per comment keeps ids in stored order.
                    for comment in comments {
                        diesel::insert_into(obstacle_comments::table)
                            .values(NewCommentRow {
                                obstacle_id: row.id,
                                text: comment.text.as_str(),
                                authored_by: comment.authored_by.as_str(),
                            })
                            .execute(conn)
                            .await?;
                    }

                    let removed = diesel::delete(archived_reports::table.find(archive_id.get()))
                        .execute(conn)
                        .await?;
                    if removed == 0 {
                        return Err(UnitOfWorkError::Stale(format!(
                            "archived report {archive_id} no longer exists"
                        )));
                    }
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_unit_error)?;

        debug!(archive_id = archive_id.get(), obstacle_id = row.id, "archived report restored");
        row_to_obstacle(row).map_err(|err| ArchiveRepositoryError::query(err.to_string()))
    }

    async fn delete(&self, id: ArchiveId) -> Result<bool, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(archived_reports::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}
