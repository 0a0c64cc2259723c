//! Obstacle HTTP handlers.
//!
//! ```text
//! POST   /api/v1/obstacles
//! POST   /api/v1/obstacles/quick
//! GET    /api/v1/obstacles/mine
//! GET    /api/v1/obstacles?status=
//! GET    /api/v1/obstacles/{id}
//! PUT    /api/v1/obstacles/{id}/status
//! PATCH  /api/v1/obstacles/{id}
//! POST   /api/v1/obstacles/{id}/comments
//! DELETE /api/v1/obstacles/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AddCommentRequest, CreateObstacleRequest, DeleteObstacleRequest,
    EditObstaclePropertiesRequest, GetObstacleRequest, ListObstaclesByStatusRequest,
    ListOwnedObstaclesRequest, QuickSaveObstacleRequest, SetObstacleStatusRequest, StatusChange,
};
use crate::domain::{Error, ObstacleDraft, ObstacleId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    ArchivedReportResponse, CommentResponse, ObstacleDetailResponse, ObstacleResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

const GEOMETRY: FieldName = FieldName::new("geometry");
const STATUS: FieldName = FieldName::new("status");
const HEIGHT: FieldName = FieldName::new("height");
const TEXT: FieldName = FieldName::new("text");

/// Full obstacle submission.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateObstacleBody {
    pub name: Option<String>,
    /// Metres above ground; 0 when omitted.
    pub height: Option<i32>,
    pub description: Option<String>,
    /// GeoJSON geometry document.
    pub geometry: Option<String>,
}

/// Geometry-only submission.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickSaveBody {
    pub geometry: Option<String>,
}

/// Requested status: 1 pending, 2 approved, 3 rejected.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    #[schema(example = 2)]
    pub status: Option<i32>,
}

/// Replacement properties for a pending obstacle.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditObstacleBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub height: Option<i32>,
}

/// Comment submission.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub text: Option<String>,
}

/// Filter for the triage listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusFilter {
    /// 1 pending, 2 approved, 3 rejected.
    pub status: Option<i32>,
}

/// Result of a status change. Rejection archives the obstacle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusChangeResponse {
    Updated {
        obstacle: ObstacleResponse,
    },
    #[serde(rename_all = "camelCase")]
    Archived {
        report: ArchivedReportResponse,
        archived_comment_count: usize,
    },
}

impl From<StatusChange> for StatusChangeResponse {
    fn from(change: StatusChange) -> Self {
        match change {
            StatusChange::Updated(obstacle) => Self::Updated {
                obstacle: obstacle.into(),
            },
            StatusChange::Archived {
                record,
                archived_comment_count,
            } => Self::Archived {
                report: ArchivedReportResponse::from(&record),
                archived_comment_count,
            },
        }
    }
}

fn parse_create(actor: UserId, body: CreateObstacleBody) -> ApiResult<CreateObstacleRequest> {
    Ok(CreateObstacleRequest {
        actor,
        draft: ObstacleDraft {
            name: body.name,
            height: body.height.unwrap_or_default(),
            description: body.description,
            geometry: require(body.geometry, GEOMETRY)?,
        },
    })
}

/// Submit a new obstacle.
#[utoipa::path(
    post,
    path = "/api/v1/obstacles",
    request_body = CreateObstacleBody,
    responses(
        (status = 201, description = "Obstacle created", body = ObstacleResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Pilot role required", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "createObstacle"
)]
#[post("/obstacles")]
pub async fn create_obstacle(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateObstacleBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = parse_create(actor, payload.into_inner())?;
    let obstacle = state.obstacles.create_obstacle(request).await?;
    Ok(HttpResponse::Created().json(ObstacleResponse::from(obstacle)))
}

/// Save a geometry with default properties.
#[utoipa::path(
    post,
    path = "/api/v1/obstacles/quick",
    request_body = QuickSaveBody,
    responses(
        (status = 201, description = "Obstacle created", body = ObstacleResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Pilot role required", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "quickSaveObstacle"
)]
#[post("/obstacles/quick")]
pub async fn quick_save_obstacle(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<QuickSaveBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let geometry = require(payload.into_inner().geometry, GEOMETRY)?;
    let obstacle = state
        .obstacles
        .quick_save_obstacle(QuickSaveObstacleRequest { actor, geometry })
        .await?;
    Ok(HttpResponse::Created().json(ObstacleResponse::from(obstacle)))
}

/// List the caller's own obstacles.
#[utoipa::path(
    get,
    path = "/api/v1/obstacles/mine",
    responses(
        (status = 200, description = "Owned obstacles", body = [ObstacleResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "listOwnedObstacles"
)]
#[get("/obstacles/mine")]
pub async fn list_owned_obstacles(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ObstacleResponse>>> {
    let actor = session.require_user_id()?;
    let obstacles = state
        .obstacles_query
        .list_owned(ListOwnedObstaclesRequest { actor })
        .await?;
    Ok(web::Json(
        obstacles.into_iter().map(ObstacleResponse::from).collect(),
    ))
}

/// Triage listing by status.
#[utoipa::path(
    get,
    path = "/api/v1/obstacles",
    params(StatusFilter),
    responses(
        (status = 200, description = "Obstacles with the status", body = [ObstacleResponse]),
        (status = 400, description = "Invalid status", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Registrar or admin role required", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "listObstaclesByStatus"
)]
#[get("/obstacles")]
pub async fn list_obstacles_by_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    filter: web::Query<StatusFilter>,
) -> ApiResult<web::Json<Vec<ObstacleResponse>>> {
    let actor = session.require_user_id()?;
    let status = require(filter.into_inner().status, STATUS)?;
    let obstacles = state
        .obstacles_query
        .list_by_status(ListObstaclesByStatusRequest { actor, status })
        .await?;
    Ok(web::Json(
        obstacles.into_iter().map(ObstacleResponse::from).collect(),
    ))
}

/// Fetch one obstacle with its comments.
#[utoipa::path(
    get,
    path = "/api/v1/obstacles/{id}",
    params(("id" = i64, Path, description = "Obstacle id")),
    responses(
        (status = 200, description = "Obstacle and comments", body = ObstacleDetailResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "getObstacle"
)]
#[get("/obstacles/{id}")]
pub async fn get_obstacle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ObstacleDetailResponse>> {
    let actor = session.require_user_id()?;
    let view = state
        .obstacles_query
        .get_obstacle(GetObstacleRequest {
            actor,
            obstacle_id: ObstacleId::new(path.into_inner()),
        })
        .await?;
    Ok(web::Json(view.into()))
}

/// Change an obstacle's status; 3 archives it.
#[utoipa::path(
    put,
    path = "/api/v1/obstacles/{id}/status",
    params(("id" = i64, Path, description = "Obstacle id")),
    request_body = StatusBody,
    responses(
        (status = 200, description = "Status changed", body = StatusChangeResponse),
        (status = 400, description = "Invalid status", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Registrar or admin role required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "setObstacleStatus"
)]
#[put("/obstacles/{id}/status")]
pub async fn set_obstacle_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<StatusBody>,
) -> ApiResult<web::Json<StatusChangeResponse>> {
    let actor = session.require_user_id()?;
    let status = require(payload.into_inner().status, STATUS)?;
    let change = state
        .obstacles
        .set_obstacle_status(SetObstacleStatusRequest {
            actor,
            obstacle_id: ObstacleId::new(path.into_inner()),
            status,
        })
        .await?;
    Ok(web::Json(change.into()))
}

/// Replace the properties of a pending obstacle.
#[utoipa::path(
    patch,
    path = "/api/v1/obstacles/{id}",
    params(("id" = i64, Path, description = "Obstacle id")),
    request_body = EditObstacleBody,
    responses(
        (status = 200, description = "Obstacle updated", body = ObstacleResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Obstacle is no longer pending", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "editObstacle"
)]
#[patch("/obstacles/{id}")]
pub async fn edit_obstacle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<EditObstacleBody>,
) -> ApiResult<web::Json<ObstacleResponse>> {
    let actor = session.require_user_id()?;
    let body = payload.into_inner();
    let obstacle = state
        .obstacles
        .edit_obstacle_properties(EditObstaclePropertiesRequest {
            actor,
            obstacle_id: ObstacleId::new(path.into_inner()),
            name: body.name,
            description: body.description,
            height: require(body.height, HEIGHT)?,
        })
        .await?;
    Ok(web::Json(obstacle.into()))
}

/// Add a comment to an obstacle.
#[utoipa::path(
    post,
    path = "/api/v1/obstacles/{id}/comments",
    params(("id" = i64, Path, description = "Obstacle id")),
    request_body = CommentBody,
    responses(
        (status = 201, description = "Comment stored", body = CommentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "addComment"
)]
#[post("/obstacles/{id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<CommentBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let text = require(payload.into_inner().text, TEXT)?;
    let comment = state
        .obstacles
        .add_comment(AddCommentRequest {
            actor,
            obstacle_id: ObstacleId::new(path.into_inner()),
            text,
        })
        .await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}

/// Delete an obstacle and its comments.
#[utoipa::path(
    delete,
    path = "/api/v1/obstacles/{id}",
    params(("id" = i64, Path, description = "Obstacle id")),
    responses(
        (status = 204, description = "Obstacle deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["obstacles"],
    operation_id = "deleteObstacle"
)]
#[delete("/obstacles/{id}")]
pub async fn delete_obstacle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state
        .obstacles
        .delete_obstacle(DeleteObstacleRequest {
            actor,
            obstacle_id: ObstacleId::new(path.into_inner()),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "obstacles_tests.rs"]
mod tests;
