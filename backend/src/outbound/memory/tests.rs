//! Behaviour of the in-memory registry.

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{CommentText, Geometry, ObstacleDetails};

const POINT: &str = r#"{"type":"Point","coordinates":[10.39,63.43]}"#;

#[fixture]
fn registry() -> MemoryRegistry {
    MemoryRegistry::new()
}

fn quick(owner: &UserId) -> NewObstacle {
    NewObstacle::quick(owner.clone(), Geometry::new(POINT).expect("point"))
}

fn text(value: &str) -> CommentText {
    CommentText::new(value).expect("comment text")
}

fn archival(original: ObstacleId, day: u32, comments_json: &str) -> NewArchivalRecord {
    NewArchivalRecord {
        original_obstacle_id: original,
        details: ObstacleDetails::try_new("Crane", 60, "").expect("details"),
        geometry: Geometry::new(POINT).expect("point"),
        archived_at: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
        comments_json: comments_json.to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn obstacle_ids_increase_and_listings_filter(registry: MemoryRegistry) {
    let pilot = UserId::random();
    let other = UserId::random();
    let first = ObstacleRepository::create(&registry, &quick(&pilot))
        .await
        .expect("create");
    let second = ObstacleRepository::create(&registry, &quick(&other))
        .await
        .expect("create");
    assert!(second.id() > first.id());

    let owned = registry.list_by_owner(&pilot).await.expect("owned");
    assert_eq!(owned, vec![first.clone()]);

    let pending = registry
        .list_by_status(ObstacleStatus::Pending)
        .await
        .expect("pending");
    assert_eq!(pending.len(), 2);
    assert!(
        registry
            .list_by_status(ObstacleStatus::Approved)
            .await
            .expect("approved")
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn replace_requires_an_existing_obstacle(registry: MemoryRegistry) {
    let ghost = quick(&UserId::random()).with_id(ObstacleId::new(99));

    let err = registry.replace(&ghost).await.expect_err("unknown obstacle");

    assert!(matches!(err, ObstacleRepositoryError::Query { .. }));
}

#[rstest]
#[tokio::test]
async fn deleting_an_obstacle_cascades_to_its_comments(registry: MemoryRegistry) {
    let pilot = UserId::random();
    let kept = ObstacleRepository::create(&registry, &quick(&pilot))
        .await
        .expect("create");
    let doomed = ObstacleRepository::create(&registry, &quick(&pilot))
        .await
        .expect("create");
    for id in [kept.id(), doomed.id()] {
        CommentRepository::create(&registry, &NewComment::human(id, text("note")))
            .await
            .expect("comment");
    }

    assert!(ObstacleRepository::delete(&registry, doomed.id()).await.expect("delete"));
    assert!(!ObstacleRepository::delete(&registry, doomed.id()).await.expect("delete"));

    let remaining = registry
        .list_by_obstacle_ids(&[kept.id(), doomed.id()])
        .await
        .expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].obstacle_id, kept.id());
}

#[rstest]
#[tokio::test]
async fn comment_ids_are_never_reused(registry: MemoryRegistry) {
    let obstacle = ObstacleRepository::create(&registry, &quick(&UserId::random()))
        .await
        .expect("create");
    let first = CommentRepository::create(&registry, &NewComment::human(obstacle.id(), text("a")))
        .await
        .expect("comment");
    let removed = registry.delete_many(&[first.id]).await.expect("delete");
    assert_eq!(removed, 1);

    let second = CommentRepository::create(&registry, &NewComment::system(obstacle.id(), text("b")))
        .await
        .expect("comment");

    assert!(second.id > first.id);
    assert_eq!(second.authored_by, crate::domain::CommentAuthor::System);
}

#[rstest]
#[tokio::test]
async fn comments_need_a_live_obstacle(registry: MemoryRegistry) {
    let err = CommentRepository::create(
        &registry,
        &NewComment::human(ObstacleId::new(404), text("orphan")),
    )
    .await
    .expect_err("missing obstacle");

    assert!(matches!(err, CommentRepositoryError::Query { .. }));
}

async fn obstacle_with_comments(
    registry: &MemoryRegistry,
    texts: &[&str],
) -> (Obstacle, Vec<Comment>) {
    let obstacle = ObstacleRepository::create(registry, &quick(&UserId::random()))
        .await
        .expect("create");
    let mut comments = Vec::new();
    for body in texts {
        let comment = CommentRepository::create(registry, &NewComment::human(obstacle.id(), text(body)))
            .await
            .expect("comment");
        comments.push(comment);
    }
    (obstacle, comments)
}

fn ids(comments: &[Comment]) -> Vec<CommentId> {
    comments.iter().map(|comment| comment.id).collect()
}

#[rstest]
#[tokio::test]
async fn archive_unit_moves_obstacle_and_comments_into_the_record(registry: MemoryRegistry) {
    let (obstacle, comments) = obstacle_with_comments(&registry, &["a", "b", "c"]).await;

    let record = registry
        .archive_obstacle(
            &archival(obstacle.id(), 1, r#"["a","b","c"]"#),
            &ids(&comments),
        )
        .await
        .expect("archive");

    assert_eq!(record.original_obstacle_id, obstacle.id());
    assert!(
        ObstacleRepository::find_by_id(&registry, obstacle.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        registry
            .list_for_obstacle(obstacle.id())
            .await
            .expect("comments")
            .is_empty()
    );
    assert_eq!(registry.list().await.expect("list"), vec![record]);
}

#[rstest]
#[tokio::test]
async fn stale_comment_list_fails_the_unit_and_a_fresh_retry_keeps_every_text(
    registry: MemoryRegistry,
) {
    let (obstacle, mut comments) = obstacle_with_comments(&registry, &["a", "b", "c"]).await;
    let late = comments.pop().expect("third comment");

    let err = registry
        .archive_obstacle(&archival(obstacle.id(), 1, r#"["a","b"]"#), &ids(&comments))
        .await
        .expect_err("comment list is stale");

    assert!(matches!(err, ArchiveRepositoryError::Query { .. }));
    assert!(registry.list().await.expect("list").is_empty());
    assert_eq!(
        registry
            .list_for_obstacle(obstacle.id())
            .await
            .expect("comments")
            .len(),
        3
    );

    comments.push(late);
    let record = registry
        .archive_obstacle(
            &archival(obstacle.id(), 2, r#"["a","b","c"]"#),
            &ids(&comments),
        )
        .await
        .expect("retry");
    assert_eq!(record.comments_json, r#"["a","b","c"]"#);
}

#[rstest]
#[tokio::test]
async fn archiving_a_vanished_obstacle_writes_no_record(registry: MemoryRegistry) {
    let err = registry
        .archive_obstacle(&archival(ObstacleId::new(404), 1, "[]"), &[])
        .await
        .expect_err("obstacle is gone");

    assert!(matches!(err, ArchiveRepositoryError::Query { .. }));
    assert!(registry.list().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn records_list_newest_first(registry: MemoryRegistry) {
    let (older, _) = obstacle_with_comments(&registry, &[]).await;
    let (newer, _) = obstacle_with_comments(&registry, &[]).await;
    let first = registry
        .archive_obstacle(&archival(older.id(), 1, "[]"), &[])
        .await
        .expect("archive");
    let second = registry
        .archive_obstacle(&archival(newer.id(), 3, "[]"), &[])
        .await
        .expect("archive");

    assert_ne!(first.id, second.id);
    let listed = registry.list().await.expect("list");
    assert_eq!(
        listed.iter().map(|record| record.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
}

#[rstest]
#[tokio::test]
async fn restore_unit_recreates_in_order_and_drops_the_record(registry: MemoryRegistry) {
    let (obstacle, comments) = obstacle_with_comments(&registry, &["a"]).await;
    let record = registry
        .archive_obstacle(&archival(obstacle.id(), 1, r#"["a"]"#), &ids(&comments))
        .await
        .expect("archive");
    let restored = [
        RestoredComment::from_text(text("Hindring 'Crane' ble sendt inn.")),
        RestoredComment::from_text(text("a")),
    ];

    let live = registry
        .restore_obstacle(record.id, &quick(&UserId::random()), &restored)
        .await
        .expect("restore");

    let recreated = registry.list_for_obstacle(live.id()).await.expect("comments");
    assert_eq!(
        recreated
            .iter()
            .map(|comment| (comment.text.as_str(), comment.authored_by))
            .collect::<Vec<_>>(),
        vec![
            ("Hindring 'Crane' ble sendt inn.", CommentAuthor::System),
            ("a", CommentAuthor::Human),
        ]
    );
    assert!(recreated[0].id < recreated[1].id);
    assert!(recreated[0].id > comments[0].id);
    assert!(registry.list().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn restoring_a_vanished_record_creates_nothing(registry: MemoryRegistry) {
    let err = registry
        .restore_obstacle(
            ArchiveId::new(77),
            &quick(&UserId::random()),
            &[RestoredComment::from_text(text("a"))],
        )
        .await
        .expect_err("record is gone");

    assert!(matches!(err, ArchiveRepositoryError::Query { .. }));
    assert!(
        registry
            .list_by_status(ObstacleStatus::Pending)
            .await
            .expect("pending")
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn archive_delete_reports_removal(registry: MemoryRegistry) {
    let (obstacle, _) = obstacle_with_comments(&registry, &[]).await;
    let record = registry
        .archive_obstacle(&archival(obstacle.id(), 4, "[]"), &[])
        .await
        .expect("archive");

    assert!(ArchiveRepository::delete(&registry, record.id).await.expect("delete"));
    assert!(
        !ArchiveRepository::delete(&registry, record.id)
            .await
            .expect("second delete")
    );
    assert!(
        ArchiveRepository::find_by_id(&registry, record.id)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn granted_roles_are_reported_once(registry: MemoryRegistry) {
    let user = UserId::random();
    assert!(registry.grant(&user, UserRole::Registrar));
    assert!(registry.grant(&user, UserRole::Registrar));
    assert!(registry.grant(&user, UserRole::Pilot));

    let roles = registry.roles_for(&user).await.expect("roles");
    assert_eq!(roles, vec![UserRole::Registrar, UserRole::Pilot]);
    assert!(
        registry
            .roles_for(&UserId::random())
            .await
            .expect("roles")
            .is_empty()
    );
}
