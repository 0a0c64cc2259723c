//! Notification read models for pilots.
//!
//! The watermark is the highest comment id a session has seen. It lives in
//! per-session state owned by the inbound adapter and is passed in and out of
//! the domain explicitly.

use serde::{Deserialize, Serialize};

use crate::domain::{Comment, CommentId, Obstacle};

/// Highest comment id a session has acknowledged; `0` when nothing was seen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Watermark(i64);

impl Watermark {
    /// Wrap a raw comment id.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw value.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether `comment` arrived after this watermark.
    pub fn is_before(self, comment: CommentId) -> bool {
        comment.get() > self.0
    }

    /// The highest id in `comments`, or the zero watermark when empty.
    pub fn highest<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> Self {
        comments
            .into_iter()
            .map(|comment| comment.id.get())
            .max()
            .map_or_else(Self::default, Self)
    }
}

/// Human comments on one of a pilot's obstacles, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationGroup {
    /// The commented obstacle.
    pub obstacle: Obstacle,
    /// Number of comments in the group.
    pub count: usize,
    /// Comments ordered by id descending.
    pub comments: Vec<Comment>,
}

impl NotificationGroup {
    /// Highest comment id in the group.
    pub fn latest_comment_id(&self) -> Option<CommentId> {
        self.comments.first().map(|comment| comment.id)
    }
}

/// Grouped notification view plus the watermark it advances to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedNotifications {
    /// Groups ordered by their newest comment, descending.
    pub groups: Vec<NotificationGroup>,
    /// Highest comment id across all of the pilot's comments, system ones
    /// included.
    pub watermark: Watermark,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{CommentAuthor, CommentText, ObstacleId};

    fn comment(id: i64) -> Comment {
        Comment {
            id: CommentId::new(id),
            obstacle_id: ObstacleId::new(1),
            text: CommentText::new("ok").expect("text"),
            authored_by: CommentAuthor::Human,
        }
    }

    #[rstest]
    fn highest_defaults_to_zero() {
        assert_eq!(Watermark::highest(&Vec::<Comment>::new()), Watermark::new(0));
    }

    #[rstest]
    fn highest_picks_the_largest_id() {
        let comments = [comment(3), comment(9), comment(4)];
        assert_eq!(Watermark::highest(&comments), Watermark::new(9));
    }

    #[rstest]
    #[case(5, 6, true)]
    #[case(5, 5, false)]
    #[case(0, 1, true)]
    fn is_before_is_strict(#[case] mark: i64, #[case] id: i64, #[case] expected: bool) {
        assert_eq!(Watermark::new(mark).is_before(CommentId::new(id)), expected);
    }
}
