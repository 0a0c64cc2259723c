//! Port for resolving caller role memberships.

use async_trait::async_trait;

use crate::domain::{UserId, UserRole};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// The directory could not be reached.
        Connection { message: String } =>
            "user directory connection failed: {message}",
        /// The lookup failed during execution.
        Query { message: String } =>
            "user directory query failed: {message}",
    }
}

/// Port onto the identity provider's role store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Roles held by `user`; unknown users hold none.
    async fn roles_for(&self, user: &UserId) -> Result<Vec<UserRole>, UserDirectoryError>;
}

/// Fixture directory that grants every user the same fixed roles.
#[derive(Debug, Default, Clone)]
pub struct FixtureUserDirectory {
    roles: Vec<UserRole>,
}

impl FixtureUserDirectory {
    /// Grant `roles` to every user.
    pub fn with_roles(roles: Vec<UserRole>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn roles_for(&self, _user: &UserId) -> Result<Vec<UserRole>, UserDirectoryError> {
        Ok(self.roles.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn default_fixture_knows_no_roles() {
        let roles = FixtureUserDirectory::default()
            .roles_for(&UserId::random())
            .await
            .expect("fixture lookup succeeds");
        assert!(roles.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn configured_fixture_returns_roles() {
        let directory = FixtureUserDirectory::with_roles(vec![UserRole::Pilot]);
        let roles = directory
            .roles_for(&UserId::random())
            .await
            .expect("fixture lookup succeeds");
        assert_eq!(roles, vec![UserRole::Pilot]);
    }
}
