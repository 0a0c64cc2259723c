//! Service configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `OBSTACLES_*` environment variables over an
//! optional configuration file.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{UserId, UserRole, UserValidationError};

const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Runtime settings for the obstacle registry server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "OBSTACLES")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string; the in-memory registry is used when
    /// absent.
    pub database_url: Option<String>,
    /// Maximum connections held by the database pool.
    pub pool_max_size: Option<u32>,
    /// Path of the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for session cookies: `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// Permit a generated session key when the key file cannot be read.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
    /// Role grants for the in-memory registry, as comma-separated
    /// `user-uuid=role` pairs. Ignored when a database is configured.
    pub seed_roles: Option<String>,
}

/// A malformed entry in `seed_roles`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleSeedError {
    /// The entry has no `=` separating user and role.
    #[error("role seed `{entry}` is not of the form user-uuid=role")]
    Malformed { entry: String },
    /// The user id or role name was rejected.
    #[error("role seed `{entry}`: {source}")]
    Invalid {
        entry: String,
        #[source]
        source: UserValidationError,
    },
}

impl AppSettings {
    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or_else(default_bind_addr)
    }

    /// Return the configured pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Return the database URL when one is configured and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Parse `seed_roles` into grants; blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RoleSeedError`] for the first entry that does not name a
    /// UUID and a known role.
    pub fn role_seeds(&self) -> Result<Vec<(UserId, UserRole)>, RoleSeedError> {
        let Some(raw) = self.seed_roles.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_role_seed)
            .collect()
    }
}

fn parse_role_seed(entry: &str) -> Result<(UserId, UserRole), RoleSeedError> {
    let (user, role) = entry
        .split_once('=')
        .ok_or_else(|| RoleSeedError::Malformed {
            entry: entry.to_owned(),
        })?;
    let invalid = |source| RoleSeedError::Invalid {
        entry: entry.to_owned(),
        source,
    };
    let user = UserId::new(user.trim()).map_err(invalid)?;
    let role = role.parse::<UserRole>().map_err(invalid)?;
    Ok((user, role))
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
