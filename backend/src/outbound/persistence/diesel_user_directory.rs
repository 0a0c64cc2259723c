//! PostgreSQL-backed `UserDirectory` reading mirrored role memberships.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{UserId, UserRole};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::user_roles;

/// Diesel-backed implementation of the `UserDirectory` port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    map_basic_pool_error(error, UserDirectoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserDirectoryError {
    map_basic_diesel_error(
        error,
        UserDirectoryError::query,
        UserDirectoryError::connection,
    )
}

/// Parse stored role names, skipping values the registry does not know.
fn parse_roles(user: &UserId, names: Vec<String>) -> Vec<UserRole> {
    names
        .into_iter()
        .filter_map(|name| match name.parse::<UserRole>() {
            Ok(role) => Some(role),
            Err(err) => {
                warn!(user_id = %user, value = %name, error = %err, "skipping unknown role");
                None
            }
        })
        .collect()
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn roles_for(&self, user: &UserId) -> Result<Vec<UserRole>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let names: Vec<String> = user_roles::table
            .filter(user_roles::user_id.eq(user.as_uuid()))
            .order(user_roles::role.asc())
            .select(user_roles::role)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(parse_roles(user, names))
    }
}
