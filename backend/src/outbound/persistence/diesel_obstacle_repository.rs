//! PostgreSQL-backed `ObstacleRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ObstacleRepository, ObstacleRepositoryError};
use crate::domain::{
    Geometry, NewObstacle, Obstacle, ObstacleDetails, ObstacleId, ObstacleStatus,
    ObstacleValidationError, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ObstacleRow, ObstacleValues};
use super::pool::{DbPool, PoolError};
use super::schema::obstacles;

/// Diesel-backed implementation of the `ObstacleRepository` port.
#[derive(Clone)]
pub struct DieselObstacleRepository {
    pool: DbPool,
}

impl DieselObstacleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ObstacleRepositoryError {
    map_basic_pool_error(error, ObstacleRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ObstacleRepositoryError {
    map_basic_diesel_error(
        error,
        ObstacleRepositoryError::query,
        ObstacleRepositoryError::connection,
    )
}

fn invalid_row(id: i64, error: ObstacleValidationError) -> ObstacleRepositoryError {
    ObstacleRepositoryError::query(format!("stored obstacle {id} is invalid: {error}"))
}

/// Convert a database row to a domain obstacle.
pub(super) fn row_to_obstacle(row: ObstacleRow) -> Result<Obstacle, ObstacleRepositoryError> {
    let id = row.id;
    let details = ObstacleDetails::try_new(row.name, row.height, row.description)
        .map_err(|err| invalid_row(id, err))?;
    let geometry = Geometry::new(row.geometry).map_err(|err| invalid_row(id, err.into()))?;
    let status = ObstacleStatus::try_from(row.status).map_err(|err| invalid_row(id, err))?;
    Ok(Obstacle::from_parts(
        ObstacleId::new(id),
        row.owner_id.map(UserId::from_uuid),
        details,
        geometry,
        status,
    ))
}

fn rows_to_obstacles(rows: Vec<ObstacleRow>) -> Result<Vec<Obstacle>, ObstacleRepositoryError> {
    rows.into_iter().map(row_to_obstacle).collect()
}

pub(super) fn values<'a>(
    owner: Option<&UserId>,
    details: &'a ObstacleDetails,
    geometry: &'a Geometry,
    status: ObstacleStatus,
) -> ObstacleValues<'a> {
    ObstacleValues {
        owner_id: owner.map(|user| *user.as_uuid()),
        name: &details.name,
        height: details.height.metres(),
        description: details.description.as_str(),
        geometry: geometry.as_str(),
        status: status.code(),
    }
}

#[async_trait]
impl ObstacleRepository for DieselObstacleRepository {
    async fn find_by_id(
        &self,
        id: ObstacleId,
    ) -> Result<Option<Obstacle>, ObstacleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ObstacleRow> = obstacles::table
            .find(id.get())
            .select(ObstacleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_obstacle).transpose()
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Obstacle>, ObstacleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ObstacleRow> = obstacles::table
            .filter(obstacles::owner_id.eq(owner.as_uuid()))
            .order(obstacles::id.asc())
            .select(ObstacleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_obstacles(rows)
    }

    async fn list_by_status(
        &self,
        status: ObstacleStatus,
    ) -> Result<Vec<Obstacle>, ObstacleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ObstacleRow> = obstacles::table
            .filter(obstacles::status.eq(status.code()))
            .order(obstacles::id.asc())
            .select(ObstacleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_obstacles(rows)
    }

    async fn create(&self, obstacle: &NewObstacle) -> Result<Obstacle, ObstacleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ObstacleRow = diesel::insert_into(obstacles::table)
            .values(values(
                obstacle.owner.as_ref(),
                &obstacle.details,
                &obstacle.geometry,
                obstacle.status,
            ))
            .returning(ObstacleRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(obstacle_id = row.id, "obstacle inserted");
        row_to_obstacle(row)
    }

    async fn replace(&self, obstacle: &Obstacle) -> Result<Obstacle, ObstacleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ObstacleRow = diesel::update(obstacles::table.find(obstacle.id().get()))
            .set(values(
                obstacle.owner(),
                obstacle.details(),
                obstacle.geometry(),
                obstacle.status(),
            ))
            .returning(ObstacleRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_obstacle(row)
    }

    async fn delete(&self, id: ObstacleId) -> Result<bool, ObstacleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(obstacles::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and error mapping.
    use super::*;
    use rstest::rstest;

    fn row(status: i32, geometry: &str) -> ObstacleRow {
        ObstacleRow {
            id: 4,
            owner_id: None,
            name: "Mast".to_owned(),
            height: 30,
            description: String::new(),
            geometry: geometry.to_owned(),
            status,
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, ObstacleRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, ObstacleRepositoryError::Query { .. }));
    }

    #[rstest]
    fn ownerless_row_converts() {
        let obstacle = row_to_obstacle(row(2, r#"{"type":"Point","coordinates":[1,2]}"#))
            .expect("valid row");

        assert_eq!(obstacle.id(), ObstacleId::new(4));
        assert_eq!(obstacle.owner(), None);
        assert_eq!(obstacle.status(), ObstacleStatus::Approved);
    }

    #[rstest]
    #[case(7, r#"{"type":"Point","coordinates":[1,2]}"#)]
    #[case(1, "")]
    fn corrupt_rows_are_query_errors(#[case] status: i32, #[case] geometry: &str) {
        let err = row_to_obstacle(row(status, geometry)).expect_err("corrupt row");

        assert!(err.to_string().contains("stored obstacle 4 is invalid"));
    }
}
