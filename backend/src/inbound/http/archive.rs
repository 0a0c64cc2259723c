//! Archive HTTP handlers.
//!
//! ```text
//! POST   /api/v1/obstacles/{id}/archive
//! GET    /api/v1/archive
//! GET    /api/v1/archive/{id}
//! POST   /api/v1/archive/{id}/restore
//! DELETE /api/v1/archive/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    ArchiveObstacleRequest, ArchiveOutcome, DeleteArchivedReportRequest,
    GetArchivedReportRequest, ListArchivedReportsRequest, RestoreArchivedReportRequest,
    RestoreOutcome,
};
use crate::domain::{ArchiveId, Error, ObstacleId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    ArchivedReportDetailResponse, ArchivedReportResponse, ObstacleResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

const STATUS: FieldName = FieldName::new("status");

/// Status the restored obstacle starts in: 1 pending or 2 approved.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreBody {
    #[schema(example = 1)]
    pub status: Option<i32>,
}

/// Result of archiving an obstacle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveOutcomeResponse {
    pub report: ArchivedReportResponse,
    pub archived_comment_count: usize,
}

impl From<ArchiveOutcome> for ArchiveOutcomeResponse {
    fn from(outcome: ArchiveOutcome) -> Self {
        Self {
            report: ArchivedReportResponse::from(&outcome.record),
            archived_comment_count: outcome.archived_comment_count,
        }
    }
}

/// Result of restoring an archived report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcomeResponse {
    pub obstacle: ObstacleResponse,
    pub restored_comment_count: usize,
}

impl From<RestoreOutcome> for RestoreOutcomeResponse {
    fn from(outcome: RestoreOutcome) -> Self {
        Self {
            obstacle: outcome.obstacle.into(),
            restored_comment_count: outcome.restored_comment_count,
        }
    }
}

/// Archive an obstacle without going through a status change.
#[utoipa::path(
    post,
    path = "/api/v1/obstacles/{id}/archive",
    params(("id" = i64, Path, description = "Obstacle id")),
    responses(
        (status = 200, description = "Obstacle archived", body = ArchiveOutcomeResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Registrar or admin role required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["archive"],
    operation_id = "archiveObstacle"
)]
#[post("/obstacles/{id}/archive")]
pub async fn archive_obstacle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ArchiveOutcomeResponse>> {
    let actor = session.require_user_id()?;
    let outcome = state
        .archive
        .archive_obstacle(ArchiveObstacleRequest {
            actor,
            obstacle_id: ObstacleId::new(path.into_inner()),
        })
        .await?;
    Ok(web::Json(outcome.into()))
}

/// List archived reports.
#[utoipa::path(
    get,
    path = "/api/v1/archive",
    responses(
        (status = 200, description = "Archived reports", body = [ArchivedReportResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Registrar or admin role required", body = Error)
    ),
    tags = ["archive"],
    operation_id = "listArchivedReports"
)]
#[get("/archive")]
pub async fn list_archived_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ArchivedReportResponse>>> {
    let actor = session.require_user_id()?;
    let records = state
        .archive_query
        .list_archived_reports(ListArchivedReportsRequest { actor })
        .await?;
    Ok(web::Json(
        records.iter().map(ArchivedReportResponse::from).collect(),
    ))
}

/// Fetch one archived report with its comment texts.
#[utoipa::path(
    get,
    path = "/api/v1/archive/{id}",
    params(("id" = i64, Path, description = "Archived report id")),
    responses(
        (status = 200, description = "Archived report", body = ArchivedReportDetailResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Registrar or admin role required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["archive"],
    operation_id = "getArchivedReport"
)]
#[get("/archive/{id}")]
pub async fn get_archived_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ArchivedReportDetailResponse>> {
    let actor = session.require_user_id()?;
    let view = state
        .archive_query
        .get_archived_report(GetArchivedReportRequest {
            actor,
            archive_id: ArchiveId::new(path.into_inner()),
        })
        .await?;
    Ok(web::Json(view.into()))
}

/// Restore an archived report as a live obstacle.
#[utoipa::path(
    post,
    path = "/api/v1/archive/{id}/restore",
    params(("id" = i64, Path, description = "Archived report id")),
    request_body = RestoreBody,
    responses(
        (status = 201, description = "Obstacle restored", body = RestoreOutcomeResponse),
        (status = 400, description = "Status must be 1 or 2", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Registrar or admin role required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["archive"],
    operation_id = "restoreArchivedReport"
)]
#[post("/archive/{id}/restore")]
pub async fn restore_archived_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RestoreBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let status = require(payload.into_inner().status, STATUS)?;
    let outcome = state
        .archive
        .restore_archived_report(RestoreArchivedReportRequest {
            actor,
            archive_id: ArchiveId::new(path.into_inner()),
            status,
        })
        .await?;
    Ok(HttpResponse::Created().json(RestoreOutcomeResponse::from(outcome)))
}

/// Permanently delete an archived report.
#[utoipa::path(
    delete,
    path = "/api/v1/archive/{id}",
    params(("id" = i64, Path, description = "Archived report id")),
    responses(
        (status = 204, description = "Archived report deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Registrar or admin role required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["archive"],
    operation_id = "deleteArchivedReport"
)]
#[delete("/archive/{id}")]
pub async fn delete_archived_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state
        .archive
        .delete_archived_report(DeleteArchivedReportRequest {
            actor,
            archive_id: ArchiveId::new(path.into_inner()),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
