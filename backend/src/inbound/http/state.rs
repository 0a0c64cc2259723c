//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ArchiveCommand, ArchiveQuery, FixtureArchiveCommand, FixtureArchiveQuery,
    FixtureNotificationQuery, FixtureObstacleCommand, FixtureObstacleQuery, NotificationQuery,
    ObstacleCommand, ObstacleQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub obstacles: Arc<dyn ObstacleCommand>,
    pub obstacles_query: Arc<dyn ObstacleQuery>,
    pub archive: Arc<dyn ArchiveCommand>,
    pub archive_query: Arc<dyn ArchiveQuery>,
    pub notifications: Arc<dyn NotificationQuery>,
}

impl HttpState {
    /// Construct state from one service implementing every driving port.
    ///
    /// # Examples
    /// ```
    /// use obstacle_registry::domain::ports::{
    ///     FixtureArchiveCommand, FixtureArchiveQuery, FixtureNotificationQuery,
    ///     FixtureObstacleCommand, FixtureObstacleQuery,
    /// };
    /// use obstacle_registry::inbound::http::state::HttpState;
    /// use std::sync::Arc;
    ///
    /// let state = HttpState {
    ///     obstacles: Arc::new(FixtureObstacleCommand),
    ///     obstacles_query: Arc::new(FixtureObstacleQuery),
    ///     archive: Arc::new(FixtureArchiveCommand),
    ///     archive_query: Arc::new(FixtureArchiveQuery),
    ///     notifications: Arc::new(FixtureNotificationQuery),
    /// };
    /// let _archive = state.archive.clone();
    /// ```
    pub fn new<L, A, N>(lifecycle: Arc<L>, archival: Arc<A>, notifications: Arc<N>) -> Self
    where
        L: ObstacleCommand + ObstacleQuery + 'static,
        A: ArchiveCommand + ArchiveQuery + 'static,
        N: NotificationQuery + 'static,
    {
        Self {
            obstacles: lifecycle.clone(),
            obstacles_query: lifecycle,
            archive: archival.clone(),
            archive_query: archival,
            notifications,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self {
            obstacles: Arc::new(FixtureObstacleCommand),
            obstacles_query: Arc::new(FixtureObstacleQuery),
            archive: Arc::new(FixtureArchiveCommand),
            archive_query: Arc::new(FixtureArchiveQuery),
            notifications: Arc::new(FixtureNotificationQuery),
        }
    }
}
