//! Role resolution shared by the domain services.

use std::sync::Arc;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{Caller, Error, UserId, UserRole};

pub(crate) fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
    }
}

/// Resolves acting users into [`Caller`]s and enforces role requirements.
pub struct AccessPolicy<D> {
    directory: Arc<D>,
}

impl<D> Clone for AccessPolicy<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D> AccessPolicy<D> {
    /// Build a policy backed by `directory`.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

impl<D> AccessPolicy<D>
where
    D: UserDirectory,
{
    /// Look up the roles held by `user`.
    pub async fn caller(&self, user: &UserId) -> Result<Caller, Error> {
        let roles = self
            .directory
            .roles_for(user)
            .await
            .map_err(map_directory_error)?;
        Ok(Caller::new(user.clone(), roles))
    }

    /// Resolve `user` and require one of `roles`.
    pub async fn require_any(&self, user: &UserId, roles: &[UserRole]) -> Result<Caller, Error> {
        let caller = self.caller(user).await?;
        caller.require_any(roles)?;
        Ok(caller)
    }

    /// Resolve `user` and require the registrar or admin role.
    pub async fn require_triager(&self, user: &UserId) -> Result<Caller, Error> {
        self.require_any(user, &[UserRole::Registrar, UserRole::Admin])
            .await
    }
}
