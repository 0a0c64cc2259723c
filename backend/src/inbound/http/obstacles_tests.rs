//! Tests for obstacle HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockObstacleCommand, MockObstacleQuery};
use crate::domain::{
    ArchivalRecord, ArchiveId, Comment, CommentAuthor, CommentId, CommentText, Geometry,
    NewObstacle, Obstacle, ObstacleDetails, ObstacleStatus,
};
use crate::inbound::http::test_utils::{login_cookie, test_login, test_session_middleware};

const POINT: &str = r#"{"type":"Point","coordinates":[10.75,59.91]}"#;

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/test-login/{id}", web::post().to(test_login))
        .service(
            web::scope("/api/v1")
                .service(create_obstacle)
                .service(quick_save_obstacle)
                .service(list_owned_obstacles)
                .service(list_obstacles_by_status)
                .service(get_obstacle)
                .service(set_obstacle_status)
                .service(edit_obstacle)
                .service(add_comment)
                .service(delete_obstacle),
        )
}

fn state_with(commands: MockObstacleCommand, queries: MockObstacleQuery) -> HttpState {
    HttpState {
        obstacles: Arc::new(commands),
        obstacles_query: Arc::new(queries),
        ..HttpState::default()
    }
}

fn stored_obstacle(id: i64, owner: &UserId) -> Obstacle {
    NewObstacle::quick(owner.clone(), Geometry::new(POINT).expect("point"))
        .with_id(ObstacleId::new(id))
}

#[rstest]
#[actix_web::test]
async fn create_requires_login() {
    let mut commands = MockObstacleCommand::new();
    commands.expect_create_obstacle().times(0);
    let app = actix_test::init_service(test_app(state_with(commands, MockObstacleQuery::new())))
        .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/obstacles")
            .set_json(json!({"geometry": POINT}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn create_without_geometry_is_rejected_before_the_domain() {
    let mut commands = MockObstacleCommand::new();
    commands.expect_create_obstacle().times(0);
    let app = actix_test::init_service(test_app(state_with(commands, MockObstacleQuery::new())))
        .await;
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/obstacles")
            .cookie(cookie)
            .set_json(json!({"name": "Mast", "height": 40}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_argument");
    assert_eq!(body["details"]["field"], "geometry");
}

#[rstest]
#[actix_web::test]
async fn create_forwards_draft_and_returns_created() {
    let pilot = UserId::random();
    let expected_actor = pilot.clone();
    let owner = pilot.clone();
    let mut commands = MockObstacleCommand::new();
    commands
        .expect_create_obstacle()
        .withf(move |request| {
            request.actor == expected_actor
                && request.draft.name.as_deref() == Some("Mast")
                && request.draft.height == 40
                && request.draft.geometry == POINT
        })
        .times(1)
        .return_once(move |request| {
            Ok(NewObstacle::from_draft(owner, request.draft)
                .expect("valid draft")
                .with_id(ObstacleId::new(7)))
        });
    let app = actix_test::init_service(test_app(state_with(commands, MockObstacleQuery::new())))
        .await;
    let cookie = login_cookie(&app, &pilot).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/obstacles")
            .cookie(cookie)
            .set_json(json!({"name": "Mast", "height": 40, "geometry": POINT}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: ObstacleResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.id, 7);
    assert_eq!(body.owner_id, Some(pilot.to_string()));
    assert_eq!(body.status, 1);
    assert_eq!(body.status_label, "pending");
}

#[rstest]
#[actix_web::test]
async fn rejection_reports_the_archived_record() {
    let mut commands = MockObstacleCommand::new();
    commands
        .expect_set_obstacle_status()
        .withf(|request| request.obstacle_id == ObstacleId::new(5) && request.status == 3)
        .times(1)
        .return_once(|_| {
            Ok(StatusChange::Archived {
                record: ArchivalRecord {
                    id: ArchiveId::new(11),
                    original_obstacle_id: ObstacleId::new(5),
                    details: ObstacleDetails::default(),
                    geometry: Geometry::new(POINT).expect("point"),
                    archived_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                    comments_json: "[\"a\",\"b\"]".to_owned(),
                },
                archived_comment_count: 2,
            })
        });
    let app = actix_test::init_service(test_app(state_with(commands, MockObstacleQuery::new())))
        .await;
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/obstacles/5/status")
            .cookie(cookie)
            .set_json(json!({"status": 3}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["outcome"], "archived");
    assert_eq!(body["archivedCommentCount"], 2);
    assert_eq!(body["report"]["originalObstacleId"], 5);
    assert_eq!(body["report"]["status"], 3);
}

#[rstest]
#[actix_web::test]
async fn status_change_requires_status_field() {
    let mut commands = MockObstacleCommand::new();
    commands.expect_set_obstacle_status().times(0);
    let app = actix_test::init_service(test_app(state_with(commands, MockObstacleQuery::new())))
        .await;
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/obstacles/5/status")
            .cookie(cookie)
            .set_json(json!({}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn editing_a_triaged_obstacle_conflicts() {
    let mut commands = MockObstacleCommand::new();
    commands
        .expect_edit_obstacle_properties()
        .times(1)
        .return_once(|_| Err(Error::invalid_state("can only edit while under review")));
    let app = actix_test::init_service(test_app(state_with(commands, MockObstacleQuery::new())))
        .await;
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/obstacles/5")
            .cookie(cookie)
            .set_json(json!({"name": "Crane", "height": 30}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_state");
}

#[rstest]
#[actix_web::test]
async fn mine_is_not_parsed_as_an_obstacle_id() {
    let pilot = UserId::random();
    let owned = vec![stored_obstacle(1, &pilot), stored_obstacle(2, &pilot)];
    let mut queries = MockObstacleQuery::new();
    queries.expect_get_obstacle().times(0);
    queries
        .expect_list_owned()
        .times(1)
        .return_once(move |_| Ok(owned));
    let app = actix_test::init_service(test_app(state_with(MockObstacleCommand::new(), queries)))
        .await;
    let cookie = login_cookie(&app, &pilot).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/obstacles/mine")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<ObstacleResponse> = actix_test::read_body_json(res).await;
    assert_eq!(body.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[rstest]
#[actix_web::test]
async fn status_listing_passes_the_filter_through() {
    let mut queries = MockObstacleQuery::new();
    queries
        .expect_list_by_status()
        .withf(|request| request.status == ObstacleStatus::Approved.code())
        .times(1)
        .return_once(|_| Err(Error::forbidden("registrar or admin role required")));
    let app = actix_test::init_service(test_app(state_with(MockObstacleCommand::new(), queries)))
        .await;
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/obstacles?status=2")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn comment_and_delete_round_out_the_surface() {
    let mut commands = MockObstacleCommand::new();
    commands
        .expect_add_comment()
        .withf(|request| request.text == "Still standing")
        .times(1)
        .return_once(|request| {
            Ok(Comment {
                id: CommentId::new(21),
                obstacle_id: request.obstacle_id,
                text: CommentText::new(request.text).expect("text"),
                authored_by: CommentAuthor::Human,
            })
        });
    commands
        .expect_delete_obstacle()
        .withf(|request| request.obstacle_id == ObstacleId::new(9))
        .times(1)
        .return_once(|_| Ok(()));
    let app = actix_test::init_service(test_app(state_with(commands, MockObstacleQuery::new())))
        .await;
    let cookie = login_cookie(&app, &UserId::random()).await;

    let commented = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/obstacles/9/comments")
            .cookie(cookie.clone())
            .set_json(json!({"text": "Still standing"}))
            .to_request(),
    )
    .await;
    assert_eq!(commented.status(), StatusCode::CREATED);
    let body: CommentResponse = actix_test::read_body_json(commented).await;
    assert_eq!(body.obstacle_id, 9);

    let deleted = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/obstacles/9")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}
