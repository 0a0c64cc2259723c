//! Caller identity as seen by the obstacle registry.
//!
//! Authentication is owned by an external identity provider. The domain only
//! needs a stable user identifier and the caller's role memberships.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;

/// Validation errors returned when parsing identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a canonical UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The role name is not one the registry recognises.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Examples
    /// ```
    /// use obstacle_registry::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-validated UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role memberships resolved by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Reports obstacles and follows comments on them.
    Pilot,
    /// Full administrative access.
    Admin,
    /// Triages reported obstacles ("Registerfører").
    Registrar,
}

impl UserRole {
    /// Canonical storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pilot => "pilot",
            Self::Admin => "admin",
            Self::Registrar => "registrar",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pilot" => Ok(Self::Pilot),
            "admin" => Ok(Self::Admin),
            "registrar" | "registerfører" | "registerforer" => Ok(Self::Registrar),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// An authenticated caller together with their resolved roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
    roles: Vec<UserRole>,
}

impl Caller {
    /// Build a caller from an identifier and role list.
    pub fn new(user_id: UserId, roles: Vec<UserRole>) -> Self {
        Self { user_id, roles }
    }

    /// The caller's user identifier.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Whether the caller holds `role`.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the caller may triage reports (registrar or admin).
    pub fn is_triager(&self) -> bool {
        self.has_role(UserRole::Registrar) || self.has_role(UserRole::Admin)
    }

    /// Require at least one of `roles`, failing with `Forbidden` otherwise.
    pub fn require_any(&self, roles: &[UserRole]) -> Result<(), Error> {
        if roles.iter().any(|role| self.has_role(*role)) {
            Ok(())
        } else {
            Err(Error::forbidden("insufficient role for this operation"))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("not-a-uuid")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        assert!(UserId::new(raw).is_err());
    }

    #[rstest]
    #[case("pilot", UserRole::Pilot)]
    #[case("Admin", UserRole::Admin)]
    #[case("Registerfører", UserRole::Registrar)]
    fn parses_role_names(#[case] raw: &str, #[case] expected: UserRole) {
        assert_eq!(raw.parse::<UserRole>().expect("known role"), expected);
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        let err = "captain".parse::<UserRole>().expect_err("unknown");
        assert_eq!(err, UserValidationError::UnknownRole("captain".to_owned()));
    }

    #[rstest]
    fn registrar_is_triager_but_pilot_is_not() {
        let registrar = Caller::new(UserId::random(), vec![UserRole::Registrar]);
        let pilot = Caller::new(UserId::random(), vec![UserRole::Pilot]);

        assert!(registrar.is_triager());
        assert!(!pilot.is_triager());
        assert!(pilot.require_any(&[UserRole::Admin, UserRole::Registrar]).is_err());
        assert!(pilot.require_any(&[UserRole::Pilot]).is_ok());
    }
}
