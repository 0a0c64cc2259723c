//! Tests for the notification service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    CommentRepositoryError, MockCommentRepository, MockObstacleRepository, MockUserDirectory,
    UserDirectoryError,
};
use crate::domain::{
    CommentAuthor, CommentId, CommentText, ErrorCode, Geometry, ObstacleDetails, ObstacleStatus,
};

type Service = NotificationService<MockObstacleRepository, MockCommentRepository, MockUserDirectory>;

fn obstacle(id: i64, owner: &UserId) -> Obstacle {
    Obstacle::from_parts(
        ObstacleId::new(id),
        Some(owner.clone()),
        ObstacleDetails::default(),
        Geometry::new(r#"{"type":"Point","coordinates":[1,2]}"#).expect("point"),
        ObstacleStatus::Pending,
    )
}

fn comment(id: i64, obstacle_id: i64, authored_by: CommentAuthor) -> Comment {
    let text = match authored_by {
        CommentAuthor::System => format!("Hindring '#{obstacle_id}' ble sendt inn."),
        CommentAuthor::Human => format!("Kommentar {id}"),
    };
    Comment {
        id: CommentId::new(id),
        obstacle_id: ObstacleId::new(obstacle_id),
        text: CommentText::new(text).expect("text"),
        authored_by,
    }
}

fn directory_with(roles: Vec<UserRole>) -> MockUserDirectory {
    let mut directory = MockUserDirectory::new();
    directory
        .expect_roles_for()
        .times(1)
        .return_once(move |_| Ok(roles));
    directory
}

fn make_service(
    obstacles: MockObstacleRepository,
    comments: MockCommentRepository,
    directory: MockUserDirectory,
) -> Service {
    NotificationService::new(Arc::new(obstacles), Arc::new(comments), Arc::new(directory))
}

fn stores_for(
    owner: &UserId,
    stored: Vec<Comment>,
) -> (MockObstacleRepository, MockCommentRepository) {
    let owned = vec![obstacle(1, owner), obstacle(2, owner)];
    let mut obstacles = MockObstacleRepository::new();
    obstacles
        .expect_list_by_owner()
        .times(1)
        .return_once(move |_| Ok(owned));
    let mut comments = MockCommentRepository::new();
    comments
        .expect_list_by_obstacle_ids()
        .withf(|ids| ids.to_vec() == vec![ObstacleId::new(1), ObstacleId::new(2)])
        .times(1)
        .return_once(move |_| Ok(stored));
    (obstacles, comments)
}

#[rstest]
#[tokio::test]
async fn anonymous_callers_have_nothing_unread() {
    let mut directory = MockUserDirectory::new();
    directory.expect_roles_for().times(0);

    let service = make_service(
        MockObstacleRepository::new(),
        MockCommentRepository::new(),
        directory,
    );
    let count = service
        .unread_count(UnreadCountRequest {
            user: None,
            watermark: Watermark::default(),
        })
        .await;

    assert_eq!(count, 0);
}

#[rstest]
#[case(vec![])]
#[case(vec![UserRole::Registrar])]
#[case(vec![UserRole::Admin])]
#[tokio::test]
async fn non_pilots_have_nothing_unread(#[case] roles: Vec<UserRole>) {
    let mut obstacles = MockObstacleRepository::new();
    obstacles.expect_list_by_owner().times(0);

    let service = make_service(obstacles, MockCommentRepository::new(), directory_with(roles));
    let count = service
        .unread_count(UnreadCountRequest {
            user: Some(UserId::random()),
            watermark: Watermark::default(),
        })
        .await;

    assert_eq!(count, 0);
}

#[rstest]
#[tokio::test]
async fn directory_failure_counts_as_zero() {
    let mut directory = MockUserDirectory::new();
    directory
        .expect_roles_for()
        .times(1)
        .return_once(|_| Err(UserDirectoryError::connection("idp down")));

    let service = make_service(
        MockObstacleRepository::new(),
        MockCommentRepository::new(),
        directory,
    );
    let count = service
        .unread_count(UnreadCountRequest {
            user: Some(UserId::random()),
            watermark: Watermark::default(),
        })
        .await;

    assert_eq!(count, 0);
}

#[rstest]
#[tokio::test]
async fn store_failure_counts_as_zero() {
    let owner = UserId::random();
    let owned = vec![obstacle(1, &owner)];
    let mut obstacles = MockObstacleRepository::new();
    obstacles
        .expect_list_by_owner()
        .times(1)
        .return_once(move |_| Ok(owned));
    let mut comments = MockCommentRepository::new();
    comments
        .expect_list_by_obstacle_ids()
        .times(1)
        .return_once(|_| Err(CommentRepositoryError::query("timeout")));

    let service = make_service(obstacles, comments, directory_with(vec![UserRole::Pilot]));
    let count = service
        .unread_count(UnreadCountRequest {
            user: Some(owner),
            watermark: Watermark::default(),
        })
        .await;

    assert_eq!(count, 0);
}

#[rstest]
#[case(0, 3)]
#[case(4, 2)]
#[case(7, 1)]
#[case(9, 0)]
#[tokio::test]
async fn counts_human_comments_above_watermark(#[case] watermark: i64, #[case] expected: u64) {
    let owner = UserId::random();
    let (obstacles, comments) = stores_for(
        &owner,
        vec![
            comment(1, 1, CommentAuthor::System),
            comment(3, 1, CommentAuthor::Human),
            comment(5, 2, CommentAuthor::Human),
            comment(6, 2, CommentAuthor::System),
            comment(9, 1, CommentAuthor::Human),
        ],
    );

    let service = make_service(obstacles, comments, directory_with(vec![UserRole::Pilot]));
    let count = service
        .unread_count(UnreadCountRequest {
            user: Some(owner),
            watermark: Watermark::new(watermark),
        })
        .await;

    assert_eq!(count, expected);
}

#[rstest]
#[tokio::test]
async fn grouped_view_requires_pilot() {
    let mut obstacles = MockObstacleRepository::new();
    obstacles.expect_list_by_owner().times(0);

    let service = make_service(
        obstacles,
        MockCommentRepository::new(),
        directory_with(vec![UserRole::Registrar]),
    );
    let err = service
        .grouped_notifications(GroupedNotificationsRequest {
            actor: UserId::random(),
        })
        .await
        .expect_err("registrars have no notifications");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn grouped_view_orders_groups_and_comments_newest_first() {
    let owner = UserId::random();
    let (obstacles, comments) = stores_for(
        &owner,
        vec![
            comment(1, 1, CommentAuthor::System),
            comment(2, 2, CommentAuthor::System),
            comment(3, 1, CommentAuthor::Human),
            comment(4, 2, CommentAuthor::Human),
            comment(5, 1, CommentAuthor::Human),
            comment(8, 2, CommentAuthor::System),
        ],
    );

    let service = make_service(obstacles, comments, directory_with(vec![UserRole::Pilot]));
    let view = service
        .grouped_notifications(GroupedNotificationsRequest { actor: owner })
        .await
        .expect("pilot view");

    assert_eq!(view.watermark, Watermark::new(8));
    let summary: Vec<(i64, Vec<i64>)> = view
        .groups
        .iter()
        .map(|group| {
            (
                group.obstacle.id().get(),
                group.comments.iter().map(|c| c.id.get()).collect(),
            )
        })
        .collect();
    assert_eq!(summary, vec![(1, vec![5, 3]), (2, vec![4])]);
    assert_eq!(view.groups[0].count, 2);
}

#[rstest]
#[tokio::test]
async fn grouped_view_without_obstacles_resets_watermark() {
    let mut obstacles = MockObstacleRepository::new();
    obstacles
        .expect_list_by_owner()
        .times(1)
        .return_once(|_| Ok(Vec::new()));
    let mut comments = MockCommentRepository::new();
    comments.expect_list_by_obstacle_ids().times(0);

    let service = make_service(obstacles, comments, directory_with(vec![UserRole::Pilot]));
    let view = service
        .grouped_notifications(GroupedNotificationsRequest {
            actor: UserId::random(),
        })
        .await
        .expect("pilot view");

    assert!(view.groups.is_empty());
    assert_eq!(view.watermark, Watermark::default());
}
