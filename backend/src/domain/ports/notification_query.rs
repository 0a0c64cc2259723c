//! Driving port for pilot notifications.

use async_trait::async_trait;

use crate::domain::{Error, GroupedNotifications, UserId, Watermark};

/// Request for the number of unseen comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadCountRequest {
    /// Authenticated user, if any.
    pub user: Option<UserId>,
    /// Highest comment id the session has already seen.
    pub watermark: Watermark,
}

/// Request for the grouped notification view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedNotificationsRequest {
    /// Pilot reading their notifications.
    pub actor: UserId,
}

/// Driving port for notification reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    /// Count human comments on the user's obstacles newer than the watermark.
    ///
    /// Never fails: anonymous users, non-pilots and lookup failures all count
    /// as zero.
    async fn unread_count(&self, request: UnreadCountRequest) -> u64;

    /// Group human comments by obstacle and report the advanced watermark.
    async fn grouped_notifications(
        &self,
        request: GroupedNotificationsRequest,
    ) -> Result<GroupedNotifications, Error>;
}

/// Fixture query for a pilot without obstacles.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationQuery;

#[async_trait]
impl NotificationQuery for FixtureNotificationQuery {
    async fn unread_count(&self, _request: UnreadCountRequest) -> u64 {
        0
    }

    async fn grouped_notifications(
        &self,
        _request: GroupedNotificationsRequest,
    ) -> Result<GroupedNotifications, Error> {
        Ok(GroupedNotifications {
            groups: Vec::new(),
            watermark: Watermark::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_nothing_unread() {
        let count = FixtureNotificationQuery
            .unread_count(UnreadCountRequest {
                user: Some(UserId::random()),
                watermark: Watermark::new(10),
            })
            .await;
        assert_eq!(count, 0);
    }
}
