//! Response payloads shared by the obstacle, archive and notification
//! handlers.
//!
//! Domain types stay free of wire concerns; these structs fix the JSON shape.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ArchivedReportView, ObstacleView};
use crate::domain::{
    ArchivalRecord, Comment, CommentAuthor, GroupedNotifications, NotificationGroup, Obstacle,
};

/// Obstacle as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleResponse {
    #[schema(example = 42)]
    pub id: i64,
    /// Absent for restored obstacles.
    pub owner_id: Option<String>,
    pub name: String,
    #[schema(example = 35)]
    pub height: i32,
    pub description: String,
    /// GeoJSON geometry document.
    pub geometry: String,
    /// 1 pending, 2 approved, 3 rejected.
    #[schema(example = 1)]
    pub status: i32,
    #[schema(example = "pending")]
    pub status_label: String,
}

impl From<&Obstacle> for ObstacleResponse {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            id: obstacle.id().get(),
            owner_id: obstacle.owner().map(ToString::to_string),
            name: obstacle.name().to_owned(),
            height: obstacle.height().metres(),
            description: obstacle.description().as_str().to_owned(),
            geometry: obstacle.geometry().as_str().to_owned(),
            status: obstacle.status().code(),
            status_label: obstacle.status().label().to_owned(),
        }
    }
}

impl From<Obstacle> for ObstacleResponse {
    fn from(obstacle: Obstacle) -> Self {
        Self::from(&obstacle)
    }
}

/// Comment as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub obstacle_id: i64,
    pub text: String,
    pub authored_by: CommentAuthor,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.get(),
            obstacle_id: comment.obstacle_id.get(),
            text: comment.text.as_str().to_owned(),
            authored_by: comment.authored_by,
        }
    }
}

/// An obstacle with its comment trail in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleDetailResponse {
    pub obstacle: ObstacleResponse,
    pub comments: Vec<CommentResponse>,
}

impl From<ObstacleView> for ObstacleDetailResponse {
    fn from(view: ObstacleView) -> Self {
        Self {
            obstacle: view.obstacle.into(),
            comments: view.comments.into_iter().map(CommentResponse::from).collect(),
        }
    }
}

/// Archived report summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedReportResponse {
    pub id: i64,
    pub original_obstacle_id: i64,
    pub name: String,
    pub height: i32,
    pub description: String,
    pub geometry: String,
    /// Always 3 (rejected).
    #[schema(example = 3)]
    pub status: i32,
    /// RFC 3339 timestamp.
    pub archived_at: String,
}

impl From<&ArchivalRecord> for ArchivedReportResponse {
    fn from(record: &ArchivalRecord) -> Self {
        Self {
            id: record.id.get(),
            original_obstacle_id: record.original_obstacle_id.get(),
            name: record.details.name.clone(),
            height: record.details.height.metres(),
            description: record.details.description.as_str().to_owned(),
            geometry: record.geometry.as_str().to_owned(),
            status: record.status().code(),
            archived_at: record.archived_at.to_rfc3339(),
        }
    }
}

/// Archived report with its decoded comment texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedReportDetailResponse {
    pub report: ArchivedReportResponse,
    pub comments: Vec<String>,
}

impl From<ArchivedReportView> for ArchivedReportDetailResponse {
    fn from(view: ArchivedReportView) -> Self {
        Self {
            report: ArchivedReportResponse::from(&view.record),
            comments: view.comments,
        }
    }
}

/// One notification group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationGroupResponse {
    pub obstacle: ObstacleResponse,
    pub count: usize,
    /// Newest first.
    pub comments: Vec<CommentResponse>,
}

impl From<NotificationGroup> for NotificationGroupResponse {
    fn from(group: NotificationGroup) -> Self {
        Self {
            obstacle: group.obstacle.into(),
            count: group.count,
            comments: group.comments.into_iter().map(CommentResponse::from).collect(),
        }
    }
}

/// Grouped notification view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupedNotificationsResponse {
    pub groups: Vec<NotificationGroupResponse>,
    /// Watermark now stored in the session.
    pub watermark: i64,
}

impl From<GroupedNotifications> for GroupedNotificationsResponse {
    fn from(view: GroupedNotifications) -> Self {
        Self {
            groups: view
                .groups
                .into_iter()
                .map(NotificationGroupResponse::from)
                .collect(),
            watermark: view.watermark.get(),
        }
    }
}
