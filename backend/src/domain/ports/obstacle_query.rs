//! Driving port for obstacle reads.

use async_trait::async_trait;

use crate::domain::{Comment, Error, Obstacle, ObstacleId, ObstacleStatus, UserId};

/// Request for a single obstacle with its comment trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetObstacleRequest {
    /// Owner, registrar or admin.
    pub actor: UserId,
    /// Target obstacle.
    pub obstacle_id: ObstacleId,
}

/// An obstacle together with its comments, id ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleView {
    /// The obstacle.
    pub obstacle: Obstacle,
    /// Its comments, oldest first.
    pub comments: Vec<Comment>,
}

/// Request for the obstacles a pilot reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOwnedObstaclesRequest {
    /// Reporting pilot.
    pub actor: UserId,
}

/// Request for the triage queue of one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObstaclesByStatusRequest {
    /// Acting registrar or admin.
    pub actor: UserId,
    /// Raw status code; only pending and approved hold live obstacles.
    pub status: i32,
}

/// Driving port for obstacle read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObstacleQuery: Send + Sync {
    /// Fetch one obstacle and its comments.
    async fn get_obstacle(&self, request: GetObstacleRequest) -> Result<ObstacleView, Error>;

    /// List the caller's own obstacles.
    async fn list_owned(
        &self,
        request: ListOwnedObstaclesRequest,
    ) -> Result<Vec<Obstacle>, Error>;

    /// List obstacles by status for triage.
    async fn list_by_status(
        &self,
        request: ListObstaclesByStatusRequest,
    ) -> Result<Vec<Obstacle>, Error>;
}

/// Fixture query with no stored obstacles.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObstacleQuery;

#[async_trait]
impl ObstacleQuery for FixtureObstacleQuery {
    async fn get_obstacle(&self, request: GetObstacleRequest) -> Result<ObstacleView, Error> {
        Err(Error::not_found(format!(
            "obstacle {} not found",
            request.obstacle_id
        )))
    }

    async fn list_owned(
        &self,
        _request: ListOwnedObstaclesRequest,
    ) -> Result<Vec<Obstacle>, Error> {
        Ok(Vec::new())
    }

    async fn list_by_status(
        &self,
        request: ListObstaclesByStatusRequest,
    ) -> Result<Vec<Obstacle>, Error> {
        ObstacleStatus::try_from(request.status)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        Ok(Vec::new())
    }
}
