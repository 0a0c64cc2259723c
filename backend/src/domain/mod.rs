//! Domain primitives, aggregates and services for the obstacle registry.
//!
//! Purpose: define strongly typed entities and the lifecycle, archival and
//! notification services. Everything here is transport agnostic; inbound and
//! outbound adapters talk to it through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: failure payload returned by every operation.
//! - Obstacle, Comment, ArchivalRecord: persisted aggregates.
//! - ObstacleLifecycleService, ArchivalService, NotificationService: driving
//!   port implementations.

mod access;
pub mod archival_service;
pub mod archive;
pub mod comment;
pub mod error;
pub mod geometry;
pub mod lifecycle_service;
pub mod notification;
pub mod notification_service;
pub mod obstacle;
pub mod ports;
mod service_support;
pub mod trace_id;
pub mod user;

pub use self::access::AccessPolicy;
pub use self::archival_service::ArchivalService;
pub use self::archive::{
    ArchivalRecord, ArchiveId, ArchivedComments, NewArchivalRecord, RestoredComment,
};
pub use self::comment::{
    AUTO_COMMENT_PREFIX, Comment, CommentAuthor, CommentId, CommentText, CommentValidationError,
    MAX_COMMENT_CHARS, NewComment,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geometry::{Geometry, GeometryKind, GeometryValidationError};
pub use self::lifecycle_service::ObstacleLifecycleService;
pub use self::notification::{GroupedNotifications, NotificationGroup, Watermark};
pub use self::notification_service::NotificationService;
pub use self::obstacle::{
    MAX_DESCRIPTION_CHARS, MAX_HEIGHT_METRES, NewObstacle, Obstacle, ObstacleDescription,
    ObstacleDetails, ObstacleDraft, ObstacleHeight, ObstacleId, ObstacleStatus,
    ObstacleValidationError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Caller, UserId, UserRole, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use obstacle_registry::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
