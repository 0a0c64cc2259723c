//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`UserDirectory`]) are implemented by the
//! outbound adapters. Driving ports (`*Command`, `*Query`) are implemented by
//! the domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod archive_command;
mod archive_query;
mod archive_repository;
mod comment_repository;
mod notification_query;
mod obstacle_command;
mod obstacle_query;
mod obstacle_repository;
mod user_directory;

#[cfg(test)]
pub use archive_command::MockArchiveCommand;
pub use archive_command::{
    ArchiveCommand, ArchiveObstacleRequest, ArchiveOutcome, DeleteArchivedReportRequest,
    FixtureArchiveCommand, RestoreArchivedReportRequest, RestoreOutcome,
};
#[cfg(test)]
pub use archive_query::MockArchiveQuery;
pub use archive_query::{
    ArchiveQuery, ArchivedReportView, FixtureArchiveQuery, GetArchivedReportRequest,
    ListArchivedReportsRequest,
};
#[cfg(test)]
pub use archive_repository::MockArchiveRepository;
pub use archive_repository::{ArchiveRepository, ArchiveRepositoryError, FixtureArchiveRepository};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError, FixtureCommentRepository};
#[cfg(test)]
pub use notification_query::MockNotificationQuery;
pub use notification_query::{
    FixtureNotificationQuery, GroupedNotificationsRequest, NotificationQuery, UnreadCountRequest,
};
#[cfg(test)]
pub use obstacle_command::MockObstacleCommand;
pub use obstacle_command::{
    AddCommentRequest, CreateObstacleRequest, DeleteObstacleRequest,
    EditObstaclePropertiesRequest, FixtureObstacleCommand, ObstacleCommand,
    QuickSaveObstacleRequest, SetObstacleStatusRequest, StatusChange,
};
#[cfg(test)]
pub use obstacle_query::MockObstacleQuery;
pub use obstacle_query::{
    FixtureObstacleQuery, GetObstacleRequest, ListObstaclesByStatusRequest,
    ListOwnedObstaclesRequest, ObstacleQuery, ObstacleView,
};
#[cfg(test)]
pub use obstacle_repository::MockObstacleRepository;
pub use obstacle_repository::{
    FixtureObstacleRepository, ObstacleRepository, ObstacleRepositoryError,
};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{FixtureUserDirectory, UserDirectory, UserDirectoryError};
