//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{archived_reports, obstacle_comments, obstacles};

/// Row struct for reading from the obstacles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = obstacles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ObstacleRow {
    pub id: i64,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub height: i32,
    pub description: String,
    pub geometry: String,
    pub status: i32,
}

/// Insertable and changeset struct for obstacle writes.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = obstacles)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ObstacleValues<'a> {
    pub owner_id: Option<Uuid>,
    pub name: &'a str,
    pub height: i32,
    pub description: &'a str,
    pub geometry: &'a str,
    pub status: i32,
}

/// Row struct for reading from the obstacle_comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = obstacle_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i64,
    pub obstacle_id: i64,
    pub text: String,
    pub authored_by: String,
}

/// Insertable struct for new comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = obstacle_comments)]
pub(crate) struct NewCommentRow<'a> {
    pub obstacle_id: i64,
    pub text: &'a str,
    pub authored_by: &'a str,
}

/// Row struct for reading from the archived_reports table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = archived_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArchivedReportRow {
    pub id: i64,
    pub original_obstacle_id: i64,
    pub name: String,
    pub height: i32,
    pub description: String,
    pub geometry: String,
    pub archived_at: DateTime<Utc>,
    pub comments_json: String,
}

/// Insertable and changeset struct for archive upserts.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = archived_reports)]
pub(crate) struct ArchivedReportValues<'a> {
    pub original_obstacle_id: i64,
    pub name: &'a str,
    pub height: i32,
    pub description: &'a str,
    pub geometry: &'a str,
    pub archived_at: DateTime<Utc>,
    pub comments_json: &'a str,
}
