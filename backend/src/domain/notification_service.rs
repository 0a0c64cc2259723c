//! Unread-comment notifications for pilots.
//!
//! Only person-written comments notify. System audit comments are filtered
//! by their author tag but still advance the watermark when a pilot opens
//! the grouped view, so they never resurface as unread later.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::access::{AccessPolicy, map_directory_error};
use crate::domain::ports::{
    CommentRepository, GroupedNotificationsRequest, NotificationQuery, ObstacleRepository,
    UnreadCountRequest, UserDirectory,
};
use crate::domain::service_support::{map_comment_error, map_obstacle_error};
use crate::domain::{
    Comment, Error, GroupedNotifications, NotificationGroup, Obstacle, ObstacleId, UserId,
    UserRole, Watermark,
};

/// Service implementing the notification driving port.
pub struct NotificationService<O, C, D> {
    obstacles: Arc<O>,
    comments: Arc<C>,
    directory: Arc<D>,
    access: AccessPolicy<D>,
}

impl<O, C, D> Clone for NotificationService<O, C, D> {
    fn clone(&self) -> Self {
        Self {
            obstacles: Arc::clone(&self.obstacles),
            comments: Arc::clone(&self.comments),
            directory: Arc::clone(&self.directory),
            access: self.access.clone(),
        }
    }
}

impl<O, C, D> NotificationService<O, C, D> {
    /// Create the service over the obstacle and comment stores.
    pub fn new(obstacles: Arc<O>, comments: Arc<C>, directory: Arc<D>) -> Self {
        Self {
            obstacles,
            comments,
            access: AccessPolicy::new(Arc::clone(&directory)),
            directory,
        }
    }
}

impl<O, C, D> NotificationService<O, C, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    D: UserDirectory,
{
    async fn owned_obstacles(&self, user: &UserId) -> Result<Vec<Obstacle>, Error> {
        self.obstacles
            .list_by_owner(user)
            .await
            .map_err(map_obstacle_error)
    }

    async fn comments_for(&self, obstacles: &[Obstacle]) -> Result<Vec<Comment>, Error> {
        if obstacles.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ObstacleId> = obstacles.iter().map(Obstacle::id).collect();
        self.comments
            .list_by_obstacle_ids(&ids)
            .await
            .map_err(map_comment_error)
    }

    async fn count_unread(&self, user: &UserId, watermark: Watermark) -> Result<u64, Error> {
        let roles = self
            .directory
            .roles_for(user)
            .await
            .map_err(map_directory_error)?;
        if !roles.contains(&UserRole::Pilot) {
            return Ok(0);
        }

        let obstacles = self.owned_obstacles(user).await?;
        let comments = self.comments_for(&obstacles).await?;
        let unread = comments
            .iter()
            .filter(|comment| !comment.is_system() && watermark.is_before(comment.id))
            .count();
        Ok(u64::try_from(unread).unwrap_or(u64::MAX))
    }
}

/// Group human comments by obstacle, newest comment first in every group and
/// groups ordered by their newest comment.
fn group_comments(obstacles: Vec<Obstacle>, comments: Vec<Comment>) -> Vec<NotificationGroup> {
    let mut by_id: HashMap<ObstacleId, Obstacle> = obstacles
        .into_iter()
        .map(|obstacle| (obstacle.id(), obstacle))
        .collect();
    let mut buckets: BTreeMap<ObstacleId, Vec<Comment>> = BTreeMap::new();
    for comment in comments.into_iter().filter(|comment| !comment.is_system()) {
        buckets.entry(comment.obstacle_id).or_default().push(comment);
    }

    let mut groups: Vec<NotificationGroup> = buckets
        .into_iter()
        .filter_map(|(obstacle_id, mut comments)| {
            let obstacle = by_id.remove(&obstacle_id)?;
            comments.sort_by(|a, b| b.id.cmp(&a.id));
            Some(NotificationGroup {
                obstacle,
                count: comments.len(),
                comments,
            })
        })
        .collect();
    groups.sort_by(|a, b| b.latest_comment_id().cmp(&a.latest_comment_id()));
    groups
}

#[async_trait]
impl<O, C, D> NotificationQuery for NotificationService<O, C, D>
where
    O: ObstacleRepository,
    C: CommentRepository,
    D: UserDirectory,
{
    async fn unread_count(&self, request: UnreadCountRequest) -> u64 {
        let Some(user) = request.user else {
            return 0;
        };
        match self.count_unread(&user, request.watermark).await {
            Ok(count) => count,
            Err(err) => {
                warn!(
                    user_id = %user,
                    code = ?err.code(),
                    error = %err,
                    "unread count unavailable; reporting zero"
                );
                0
            }
        }
    }

    async fn grouped_notifications(
        &self,
        request: GroupedNotificationsRequest,
    ) -> Result<GroupedNotifications, Error> {
        self.access
            .require_any(&request.actor, &[UserRole::Pilot])
            .await?;
        let obstacles = self.owned_obstacles(&request.actor).await?;
        let comments = self.comments_for(&obstacles).await?;
        let watermark = Watermark::highest(&comments);
        let groups = group_comments(obstacles, comments);
        Ok(GroupedNotifications { groups, watermark })
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
