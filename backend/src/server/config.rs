//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use obstacle_registry::domain::{UserId, UserRole};
use obstacle_registry::inbound::http::health::StorageBackend;
use obstacle_registry::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) role_seeds: Vec<(UserId, UserRole)>,
}

impl ServerConfig {
    /// Construct a server configuration from validated session settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            role_seeds: Vec::new(),
        }
    }

    /// Attach a database connection pool for the Diesel adapters.
    ///
    /// Without a pool the server runs on the in-memory registry.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Roles granted at startup when running on the in-memory registry.
    #[must_use]
    pub fn with_role_seeds(mut self, seeds: Vec<(UserId, UserRole)>) -> Self {
        self.role_seeds = seeds;
        self
    }

    /// Which store adapters the server will use.
    #[must_use]
    pub fn storage_backend(&self) -> StorageBackend {
        if self.db_pool.is_some() {
            StorageBackend::Postgres
        } else {
            StorageBackend::Memory
        }
    }
}
