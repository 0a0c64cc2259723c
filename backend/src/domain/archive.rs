//! Archival records for rejected obstacles.
//!
//! A record is the only remaining copy of a rejected obstacle. Its shape is
//! deliberately compact: the owner is dropped and comments survive only as an
//! ordered JSON array of their texts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Comment, CommentAuthor, CommentText, Geometry, Obstacle, ObstacleDetails, ObstacleId,
    ObstacleStatus,
};

/// Integer identifier assigned by the archive store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveId(i64);

impl ArchiveId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Comment texts captured at archival time, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchivedComments(Vec<String>);

impl ArchivedComments {
    /// Capture the texts of `comments` in the order given.
    pub fn capture(comments: &[Comment]) -> Self {
        Self(
            comments
                .iter()
                .map(|comment| comment.text.as_str().to_owned())
                .collect(),
        )
    }

    /// Decode a stored JSON string array.
    ///
    /// # Examples
    /// ```
    /// use obstacle_registry::domain::ArchivedComments;
    ///
    /// let comments = ArchivedComments::decode(r#"["a","b"]"#).expect("array");
    /// assert_eq!(comments.texts(), ["a", "b"]);
    /// assert!(ArchivedComments::decode("{oops").is_err());
    /// ```
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<String>>(raw).map(Self)
    }

    /// Encode as a JSON string array.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Captured texts.
    pub fn texts(&self) -> &[String] {
        &self.0
    }

    /// Number of captured comments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no comments were captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the captured texts.
    pub fn into_texts(self) -> Vec<String> {
        self.0
    }
}

/// A comment recreated on a restored obstacle.
///
/// The author tag is lost on archival, so it is inferred from the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredComment {
    /// Comment body.
    pub text: CommentText,
    /// Author category inferred from the body.
    pub authored_by: CommentAuthor,
}

impl RestoredComment {
    /// Classify `text` by its audit prefix.
    pub fn from_text(text: CommentText) -> Self {
        let authored_by = CommentAuthor::infer_from_text(&text);
        Self { text, authored_by }
    }
}

/// An archival record waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArchivalRecord {
    /// Identifier of the obstacle being archived; unique across records.
    pub original_obstacle_id: ObstacleId,
    /// Copied properties.
    pub details: ObstacleDetails,
    /// Copied location.
    pub geometry: Geometry,
    /// When the obstacle was archived.
    pub archived_at: DateTime<Utc>,
    /// Comment texts as a JSON string array.
    pub comments_json: String,
}

impl NewArchivalRecord {
    /// Snapshot an obstacle and its comments.
    pub fn capture(
        obstacle: &Obstacle,
        comments: &ArchivedComments,
        archived_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            original_obstacle_id: obstacle.id(),
            details: obstacle.details().clone(),
            geometry: obstacle.geometry().clone(),
            archived_at,
            comments_json: comments.encode()?,
        })
    }

    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: ArchiveId) -> ArchivalRecord {
        ArchivalRecord {
            id,
            original_obstacle_id: self.original_obstacle_id,
            details: self.details,
            geometry: self.geometry,
            archived_at: self.archived_at,
            comments_json: self.comments_json,
        }
    }
}

/// A stored archival record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivalRecord {
    /// Store-assigned identifier, distinct from the obstacle id.
    pub id: ArchiveId,
    /// Identifier the obstacle had before archival.
    pub original_obstacle_id: ObstacleId,
    /// Copied properties.
    pub details: ObstacleDetails,
    /// Copied location.
    pub geometry: Geometry,
    /// When the obstacle was archived.
    pub archived_at: DateTime<Utc>,
    /// Comment texts as a JSON string array.
    pub comments_json: String,
}

impl ArchivalRecord {
    /// Archived obstacles are always rejected.
    pub const fn status(&self) -> ObstacleStatus {
        ObstacleStatus::Rejected
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::{CommentAuthor, CommentId, CommentText, NewObstacle, UserId};

    fn comment(id: i64, text: &str) -> Comment {
        Comment {
            id: CommentId::new(id),
            obstacle_id: ObstacleId::new(1),
            text: CommentText::new(text).expect("text"),
            authored_by: CommentAuthor::Human,
        }
    }

    #[rstest]
    fn capture_keeps_order_and_encodes_as_string_array() {
        let comments = ArchivedComments::capture(&[comment(1, "first"), comment(2, "second")]);
        assert_eq!(comments.encode().expect("encode"), r#"["first","second"]"#);
    }

    #[rstest]
    #[case("")]
    #[case("[1,2]")]
    #[case(r#"{"a":"b"}"#)]
    fn decode_rejects_non_string_arrays(#[case] raw: &str) {
        assert!(ArchivedComments::decode(raw).is_err());
    }

    #[rstest]
    fn record_snapshot_drops_owner_and_is_rejected() {
        let geometry = Geometry::new(r#"{"type":"Point","coordinates":[1,2]}"#).expect("point");
        let obstacle = NewObstacle::quick(UserId::random(), geometry).with_id(ObstacleId::new(7));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("timestamp");

        let record = NewArchivalRecord::capture(&obstacle, &ArchivedComments::default(), at)
            .expect("capture")
            .with_id(ArchiveId::new(1));

        assert_eq!(record.original_obstacle_id, ObstacleId::new(7));
        assert_eq!(record.comments_json, "[]");
        assert_eq!(record.status(), ObstacleStatus::Rejected);
        assert_eq!(record.archived_at, at);
    }
}
