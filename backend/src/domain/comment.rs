//! Comments ("rapporter") attached to obstacles.
//!
//! Comment identifiers increase strictly and double as the notification
//! watermark key. Each comment records whether the system or a person wrote
//! it so notification filtering never depends on message wording.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ObstacleId;

/// Prefix shared by every audit comment the registry writes.
pub const AUTO_COMMENT_PREFIX: &str = "Hindring '";
/// Maximum comment length in characters.
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Validation errors raised while building comment text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    /// The comment was blank.
    #[error("comment must not be empty")]
    Empty,
    /// The comment exceeded the length limit.
    #[error("comment must be at most {max} characters, got {length}")]
    TooLong {
        /// Submitted length in characters.
        length: usize,
        /// Maximum length.
        max: usize,
    },
}

/// Integer identifier assigned by the comment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(i64);

impl CommentId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty comment text of at most 1000 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentText(String);

impl CommentText {
    /// Validate comment text.
    ///
    /// # Examples
    /// ```
    /// use obstacle_registry::domain::CommentText;
    ///
    /// assert!(CommentText::new("Kran er fjernet").is_ok());
    /// assert!(CommentText::new("  ").is_err());
    /// ```
    pub fn new(text: impl Into<String>) -> Result<Self, CommentValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CommentValidationError::Empty);
        }
        let length = text.chars().count();
        if length > MAX_COMMENT_CHARS {
            return Err(CommentValidationError::TooLong {
                length,
                max: MAX_COMMENT_CHARS,
            });
        }
        Ok(Self(text))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the text carries the audit prefix.
    pub fn has_audit_prefix(&self) -> bool {
        self.0.starts_with(AUTO_COMMENT_PREFIX)
    }
}

impl TryFrom<String> for CommentText {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommentText> for String {
    fn from(value: CommentText) -> Self {
        value.0
    }
}

/// Who wrote a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommentAuthor {
    /// Audit trail entry written by the registry itself.
    System,
    /// Written by a pilot, registrar or admin.
    Human,
}

impl CommentAuthor {
    /// Storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Human => "human",
        }
    }

    /// Classify legacy text that was stored without an author tag.
    pub fn infer_from_text(text: &CommentText) -> Self {
        if text.has_audit_prefix() {
            Self::System
        } else {
            Self::Human
        }
    }
}

impl std::str::FromStr for CommentAuthor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system" => Ok(Self::System),
            "human" => Ok(Self::Human),
            other => Err(format!("unknown comment author: {other}")),
        }
    }
}

/// A comment waiting for its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Obstacle the comment belongs to.
    pub obstacle_id: ObstacleId,
    /// Comment body.
    pub text: CommentText,
    /// Author category.
    pub authored_by: CommentAuthor,
}

impl NewComment {
    /// A comment written by a person.
    pub fn human(obstacle_id: ObstacleId, text: CommentText) -> Self {
        Self {
            obstacle_id,
            text,
            authored_by: CommentAuthor::Human,
        }
    }

    /// An audit comment written by the registry.
    pub fn system(obstacle_id: ObstacleId, text: CommentText) -> Self {
        Self {
            obstacle_id,
            text,
            authored_by: CommentAuthor::System,
        }
    }
}

/// A persisted comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Store-assigned identifier.
    pub id: CommentId,
    /// Obstacle the comment belongs to.
    pub obstacle_id: ObstacleId,
    /// Comment body.
    pub text: CommentText,
    /// Author category.
    pub authored_by: CommentAuthor,
}

impl Comment {
    /// Whether the registry wrote this comment.
    pub fn is_system(&self) -> bool {
        self.authored_by == CommentAuthor::System
    }
}

/// Builders for the audit comments written by lifecycle operations.
pub mod audit {
    use super::{AUTO_COMMENT_PREFIX, CommentText, CommentValidationError};
    use crate::domain::{Obstacle, ObstacleDetails};

    fn compose(label: &str, tail: &str) -> Result<CommentText, CommentValidationError> {
        CommentText::new(format!("{AUTO_COMMENT_PREFIX}{label}' {tail}"))
    }

    /// Written after a location-only quick save.
    pub fn quick_saved(obstacle: &Obstacle) -> Result<CommentText, CommentValidationError> {
        compose(&obstacle.audit_label(), "ble hurtiglagret.")
    }

    /// Written after a complete submission.
    pub fn submitted(obstacle: &Obstacle) -> Result<CommentText, CommentValidationError> {
        compose(&obstacle.audit_label(), "ble sendt inn.")
    }

    /// Written after a property edit, naming the fields that changed.
    pub fn edited(
        before: &ObstacleDetails,
        after: &Obstacle,
    ) -> Result<CommentText, CommentValidationError> {
        let changed = changed_fields(before, after.details());
        let tail = if changed.is_empty() {
            "ble lagret uten endringer.".to_owned()
        } else {
            format!("ble endret: {}.", changed.join(", "))
        };
        compose(&after.audit_label(), &tail)
    }

    fn changed_fields(before: &ObstacleDetails, after: &ObstacleDetails) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if before.name != after.name {
            fields.push("navn");
        }
        if before.height != after.height {
            fields.push("høyde");
        }
        if before.description != after.description {
            fields.push("beskrivelse");
        }
        fields
    }
}
