//! PostgreSQL-backed `CommentRepository` implementation using Diesel ORM.
//!
//! Comment ids come from a `BIGSERIAL` sequence, so they increase strictly
//! and are never reused after a delete.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentAuthor, CommentId, CommentText, NewComment, ObstacleId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError};
use super::schema::obstacle_comments;

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentRepositoryError {
    map_basic_pool_error(error, CommentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CommentRepositoryError {
    map_basic_diesel_error(
        error,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
    )
}

/// Convert a database row to a domain comment.
///
/// Unknown author tags fall back to classifying the text.
fn row_to_comment(row: CommentRow) -> Result<Comment, CommentRepositoryError> {
    let text = CommentText::new(row.text).map_err(|err| {
        CommentRepositoryError::query(format!("stored comment {} is invalid: {err}", row.id))
    })?;
    let authored_by = row.authored_by.parse().unwrap_or_else(|_| {
        warn!(
            comment_id = row.id,
            value = %row.authored_by,
            "unrecognised authored_by value, inferring from text"
        );
        CommentAuthor::infer_from_text(&text)
    });
    Ok(Comment {
        id: CommentId::new(row.id),
        obstacle_id: ObstacleId::new(row.obstacle_id),
        text,
        authored_by,
    })
}

fn rows_to_comments(rows: Vec<CommentRow>) -> Result<Vec<Comment>, CommentRepositoryError> {
    rows.into_iter().map(row_to_comment).collect()
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list_for_obstacle(
        &self,
        obstacle_id: ObstacleId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CommentRow> = obstacle_comments::table
            .filter(obstacle_comments::obstacle_id.eq(obstacle_id.get()))
            .order(obstacle_comments::id.asc())
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_comments(rows)
    }

    async fn list_by_obstacle_ids(
        &self,
        obstacle_ids: &[ObstacleId],
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        if obstacle_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<i64> = obstacle_ids.iter().map(|id| id.get()).collect();

        let rows: Vec<CommentRow> = obstacle_comments::table
            .filter(obstacle_comments::obstacle_id.eq_any(ids))
            .order(obstacle_comments::id.asc())
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_comments(rows)
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: CommentRow = diesel::insert_into(obstacle_comments::table)
            .values(NewCommentRow {
                obstacle_id: comment.obstacle_id.get(),
                text: comment.text.as_str(),
                authored_by: comment.authored_by.as_str(),
            })
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_comment(row)
    }

    async fn delete_many(&self, ids: &[CommentId]) -> Result<u64, CommentRepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();

        let removed = diesel::delete(obstacle_comments::table.filter(obstacle_comments::id.eq_any(raw)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
