//! Port for obstacle persistence.

use async_trait::async_trait;

use crate::domain::{NewObstacle, Obstacle, ObstacleId, ObstacleStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by obstacle repository adapters.
    pub enum ObstacleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "obstacle repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "obstacle repository query failed: {message}",
    }
}

/// Port for reading and writing obstacle reports.
///
/// Each call is transactional on its own and reads its own writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObstacleRepository: Send + Sync {
    /// Find an obstacle by id.
    async fn find_by_id(
        &self,
        id: ObstacleId,
    ) -> Result<Option<Obstacle>, ObstacleRepositoryError>;

    /// List obstacles reported by `owner`, id ascending.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Obstacle>, ObstacleRepositoryError>;

    /// List obstacles in `status`, id ascending.
    async fn list_by_status(
        &self,
        status: ObstacleStatus,
    ) -> Result<Vec<Obstacle>, ObstacleRepositoryError>;

    /// Persist a new obstacle and return it with its assigned id.
    async fn create(&self, obstacle: &NewObstacle) -> Result<Obstacle, ObstacleRepositoryError>;

    /// Overwrite an existing obstacle.
    async fn replace(&self, obstacle: &Obstacle) -> Result<Obstacle, ObstacleRepositoryError>;

    /// Delete an obstacle; comments cascade. Returns whether a row was removed.
    async fn delete(&self, id: ObstacleId) -> Result<bool, ObstacleRepositoryError>;
}

/// Fixture implementation for tests that do not exercise obstacle storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObstacleRepository;

#[async_trait]
impl ObstacleRepository for FixtureObstacleRepository {
    async fn find_by_id(
        &self,
        _id: ObstacleId,
    ) -> Result<Option<Obstacle>, ObstacleRepositoryError> {
        Ok(None)
    }

    async fn list_by_owner(
        &self,
        _owner: &UserId,
    ) -> Result<Vec<Obstacle>, ObstacleRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_by_status(
        &self,
        _status: ObstacleStatus,
    ) -> Result<Vec<Obstacle>, ObstacleRepositoryError> {
        Ok(Vec::new())
    }

    async fn create(&self, obstacle: &NewObstacle) -> Result<Obstacle, ObstacleRepositoryError> {
        Ok(obstacle.clone().with_id(ObstacleId::new(1)))
    }

    async fn replace(&self, obstacle: &Obstacle) -> Result<Obstacle, ObstacleRepositoryError> {
        Ok(obstacle.clone())
    }

    async fn delete(&self, _id: ObstacleId) -> Result<bool, ObstacleRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::Geometry;

    #[rstest]
    #[tokio::test]
    async fn fixture_create_assigns_an_id() {
        let geometry = Geometry::new(r#"{"type":"Point","coordinates":[1,2]}"#).expect("point");
        let new = NewObstacle::quick(UserId::random(), geometry);

        let created = FixtureObstacleRepository
            .create(&new)
            .await
            .expect("fixture create succeeds");

        assert_eq!(created.id(), ObstacleId::new(1));
        assert_eq!(created.status(), ObstacleStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_find_returns_none() {
        let found = FixtureObstacleRepository
            .find_by_id(ObstacleId::new(3))
            .await
            .expect("fixture lookup succeeds");
        assert!(found.is_none());
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = ObstacleRepositoryError::connection("pool closed");
        assert_eq!(
            err.to_string(),
            "obstacle repository connection failed: pool closed"
        );
    }
}
