//! Obstacle aggregate: a reported map hazard and its review status.
//!
//! Status codes are part of the persisted contract (`1`, `2`, `3`) and must
//! never be renumbered. A rejected obstacle does not live on as an
//! [`Obstacle`]; it is converted into an archival record instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Geometry, GeometryValidationError, UserId};

/// Inclusive upper bound for obstacle height in metres.
pub const MAX_HEIGHT_METRES: i32 = 200;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
const AUDIT_LABEL_CHARS: usize = 120;

/// Validation errors raised while building obstacle values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObstacleValidationError {
    /// Status code outside `{1, 2, 3}`.
    #[error("status must be 1 (pending), 2 (approved) or 3 (rejected), got {0}")]
    UnknownStatus(i32),
    /// Height outside `0..=200`.
    #[error("height must be between 0 and {max} metres, got {height}")]
    HeightOutOfRange {
        /// Rejected value.
        height: i32,
        /// Inclusive upper bound.
        max: i32,
    },
    /// Description longer than the allowed number of characters.
    #[error("description must be at most {max} characters, got {length}")]
    DescriptionTooLong {
        /// Submitted length in characters.
        length: usize,
        /// Maximum length.
        max: usize,
    },
    /// Geometry payload was rejected.
    #[error(transparent)]
    Geometry(#[from] GeometryValidationError),
}

/// Integer identifier assigned by the obstacle store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleId(i64);

impl ObstacleId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of an obstacle report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ObstacleStatus {
    /// Awaiting review; the only editable state.
    #[default]
    Pending,
    /// Accepted by a registrar.
    Approved,
    /// Rejected; only ever observed on archival records.
    Rejected,
}

impl ObstacleStatus {
    /// Persisted numeric code.
    ///
    /// # Examples
    /// ```
    /// use obstacle_registry::domain::ObstacleStatus;
    ///
    /// assert_eq!(ObstacleStatus::Approved.code(), 2);
    /// assert_eq!(ObstacleStatus::try_from(3), Ok(ObstacleStatus::Rejected));
    /// assert!(ObstacleStatus::try_from(4).is_err());
    /// ```
    pub const fn code(self) -> i32 {
        match self {
            Self::Pending => 1,
            Self::Approved => 2,
            Self::Rejected => 3,
        }
    }

    /// Lower-case label used in logs and messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<i32> for ObstacleStatus {
    type Error = ObstacleValidationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Approved),
            3 => Ok(Self::Rejected),
            other => Err(ObstacleValidationError::UnknownStatus(other)),
        }
    }
}

impl From<ObstacleStatus> for i32 {
    fn from(value: ObstacleStatus) -> Self {
        value.code()
    }
}

impl fmt::Display for ObstacleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Obstacle height in whole metres, `0..=200`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ObstacleHeight(i32);

impl ObstacleHeight {
    /// Validate a height in metres.
    pub fn new(metres: i32) -> Result<Self, ObstacleValidationError> {
        if (0..=MAX_HEIGHT_METRES).contains(&metres) {
            Ok(Self(metres))
        } else {
            Err(ObstacleValidationError::HeightOutOfRange {
                height: metres,
                max: MAX_HEIGHT_METRES,
            })
        }
    }

    /// Height in metres.
    pub const fn metres(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for ObstacleHeight {
    type Error = ObstacleValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObstacleHeight> for i32 {
    fn from(value: ObstacleHeight) -> Self {
        value.0
    }
}

/// Free-text description, at most 1000 characters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObstacleDescription(String);

impl ObstacleDescription {
    /// Validate a description.
    pub fn new(text: impl Into<String>) -> Result<Self, ObstacleValidationError> {
        let text = text.into();
        let length = text.chars().count();
        if length > MAX_DESCRIPTION_CHARS {
            return Err(ObstacleValidationError::DescriptionTooLong {
                length,
                max: MAX_DESCRIPTION_CHARS,
            });
        }
        Ok(Self(text))
    }

    /// Borrow the description text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ObstacleDescription {
    type Error = ObstacleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObstacleDescription> for String {
    fn from(value: ObstacleDescription) -> Self {
        value.0
    }
}

/// The editable properties of an obstacle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleDetails {
    /// Display name; empty when not supplied.
    pub name: String,
    /// Height above ground.
    pub height: ObstacleHeight,
    /// Free-text description; empty when not supplied.
    pub description: ObstacleDescription,
}

impl ObstacleDetails {
    /// Validate raw property values.
    pub fn try_new(
        name: impl Into<String>,
        height: i32,
        description: impl Into<String>,
    ) -> Result<Self, ObstacleValidationError> {
        Ok(Self {
            name: name.into(),
            height: ObstacleHeight::new(height)?,
            description: ObstacleDescription::new(description)?,
        })
    }
}

/// Unvalidated obstacle submission as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObstacleDraft {
    /// Optional display name.
    pub name: Option<String>,
    /// Height in metres.
    pub height: i32,
    /// Optional description.
    pub description: Option<String>,
    /// GeoJSON payload.
    pub geometry: String,
}

/// A validated obstacle awaiting its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObstacle {
    /// Reporting user, when known.
    pub owner: Option<UserId>,
    /// Editable properties.
    pub details: ObstacleDetails,
    /// Location payload.
    pub geometry: Geometry,
    /// Initial status.
    pub status: ObstacleStatus,
}

impl NewObstacle {
    /// Validate a submission into a pending obstacle owned by `owner`.
    pub fn from_draft(owner: UserId, draft: ObstacleDraft) -> Result<Self, ObstacleValidationError> {
        let geometry = Geometry::new(draft.geometry)?;
        let details = ObstacleDetails::try_new(
            draft.name.unwrap_or_default(),
            draft.height,
            draft.description.unwrap_or_default(),
        )?;
        Ok(Self {
            owner: Some(owner),
            details,
            geometry,
            status: ObstacleStatus::Pending,
        })
    }

    /// A pending obstacle with only a location; every other field defaults.
    pub fn quick(owner: UserId, geometry: Geometry) -> Self {
        Self {
            owner: Some(owner),
            details: ObstacleDetails::default(),
            geometry,
            status: ObstacleStatus::Pending,
        }
    }

    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: ObstacleId) -> Obstacle {
        Obstacle {
            id,
            owner: self.owner,
            details: self.details,
            geometry: self.geometry,
            status: self.status,
        }
    }
}

/// A persisted obstacle report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    id: ObstacleId,
    owner: Option<UserId>,
    #[serde(flatten)]
    details: ObstacleDetails,
    geometry: Geometry,
    status: ObstacleStatus,
}

impl Obstacle {
    /// Reassemble an obstacle from stored parts.
    pub fn from_parts(
        id: ObstacleId,
        owner: Option<UserId>,
        details: ObstacleDetails,
        geometry: Geometry,
        status: ObstacleStatus,
    ) -> Self {
        Self {
            id,
            owner,
            details,
            geometry,
            status,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> ObstacleId {
        self.id
    }

    /// Reporting user; `None` for obstacles restored from the archive.
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Editable properties.
    pub fn details(&self) -> &ObstacleDetails {
        &self.details
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.details.name.as_str()
    }

    /// Height above ground.
    pub fn height(&self) -> ObstacleHeight {
        self.details.height
    }

    /// Free-text description.
    pub fn description(&self) -> &ObstacleDescription {
        &self.details.description
    }

    /// Location payload.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Current review status.
    pub fn status(&self) -> ObstacleStatus {
        self.status
    }

    /// Whether `user` reported this obstacle.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner.as_ref() == Some(user)
    }

    /// Label used in audit comments: the name, or `#id` when unnamed.
    pub fn audit_label(&self) -> String {
        let name = self.details.name.trim();
        if name.is_empty() {
            format!("#{}", self.id)
        } else {
            name.chars().take(AUDIT_LABEL_CHARS).collect()
        }
    }

    pub(crate) fn set_status(&mut self, status: ObstacleStatus) {
        self.status = status;
    }

    pub(crate) fn set_details(&mut self, details: ObstacleDetails) {
        self.details = details;
    }
}
