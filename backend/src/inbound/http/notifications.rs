//! Pilot notification handlers.
//!
//! The session carries the notification watermark. Reading the grouped view
//! advances it, so the unread badge drops to zero until new comments arrive.
//!
//! ```text
//! GET /api/v1/notifications/unread-count
//! GET /api/v1/notifications
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{GroupedNotificationsRequest, UnreadCountRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::GroupedNotificationsResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Unread badge payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    #[schema(example = 3)]
    pub count: u64,
}

/// Count comments the session has not seen yet.
///
/// Anonymous callers get zero rather than an error.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread comment count", body = UnreadCountResponse)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount"
)]
#[get("/notifications/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> web::Json<UnreadCountResponse> {
    let user = session.user_id().ok().flatten();
    let count = state
        .notifications
        .unread_count(UnreadCountRequest {
            user,
            watermark: session.watermark(),
        })
        .await;
    web::Json(UnreadCountResponse { count })
}

/// Group human comments by obstacle and mark them as seen.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Grouped notifications", body = GroupedNotificationsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Pilot role required", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "groupedNotifications"
)]
#[get("/notifications")]
pub async fn grouped_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<GroupedNotificationsResponse>> {
    let actor = session.require_user_id()?;
    let view = state
        .notifications
        .grouped_notifications(GroupedNotificationsRequest { actor })
        .await?;
    session.set_watermark(view.watermark)?;
    debug!(watermark = view.watermark.get(), "notification watermark advanced");
    Ok(web::Json(view.into()))
}
