//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the request
//! and response bodies, and the session cookie security scheme. The document
//! is served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{CommentAuthor, Error, ErrorCode};
use crate::inbound::http::archive::{ArchiveOutcomeResponse, RestoreBody, RestoreOutcomeResponse};
use crate::inbound::http::dto::{
    ArchivedReportDetailResponse, ArchivedReportResponse, CommentResponse,
    GroupedNotificationsResponse, NotificationGroupResponse, ObstacleDetailResponse,
    ObstacleResponse,
};
use crate::inbound::http::health::{ProbeResponse, StorageBackend};
use crate::inbound::http::notifications::UnreadCountResponse;
use crate::inbound::http::obstacles::{
    CommentBody, CreateObstacleBody, EditObstacleBody, QuickSaveBody, StatusBody,
    StatusChangeResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie written by the identity provider's login flow.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Obstacle registry API",
        description = "Obstacle report lifecycle, archival and pilot notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::obstacles::create_obstacle,
        crate::inbound::http::obstacles::quick_save_obstacle,
        crate::inbound::http::obstacles::list_owned_obstacles,
        crate::inbound::http::obstacles::list_obstacles_by_status,
        crate::inbound::http::obstacles::get_obstacle,
        crate::inbound::http::obstacles::set_obstacle_status,
        crate::inbound::http::obstacles::edit_obstacle,
        crate::inbound::http::obstacles::add_comment,
        crate::inbound::http::obstacles::delete_obstacle,
        crate::inbound::http::archive::archive_obstacle,
        crate::inbound::http::archive::list_archived_reports,
        crate::inbound::http::archive::get_archived_report,
        crate::inbound::http::archive::restore_archived_report,
        crate::inbound::http::archive::delete_archived_report,
        crate::inbound::http::notifications::unread_count,
        crate::inbound::http::notifications::grouped_notifications,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CommentAuthor,
        ObstacleResponse,
        CommentResponse,
        ObstacleDetailResponse,
        ArchivedReportResponse,
        ArchivedReportDetailResponse,
        NotificationGroupResponse,
        GroupedNotificationsResponse,
        CreateObstacleBody,
        QuickSaveBody,
        StatusBody,
        EditObstacleBody,
        CommentBody,
        StatusChangeResponse,
        RestoreBody,
        ArchiveOutcomeResponse,
        RestoreOutcomeResponse,
        UnreadCountResponse,
        ProbeResponse,
        StorageBackend,
    )),
    tags(
        (name = "obstacles", description = "Reporting, triage and comments"),
        (name = "archive", description = "Archived reports and restore"),
        (name = "notifications", description = "Unread comments for pilots"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    #[case("/api/v1/obstacles")]
    #[case("/api/v1/obstacles/{id}/status")]
    #[case("/api/v1/archive/{id}/restore")]
    #[case("/api/v1/notifications/unread-count")]
    #[case("/health/ready")]
    fn endpoints_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
