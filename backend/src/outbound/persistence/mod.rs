//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories only translate between Diesel rows and domain types. Row
//! structs (`models.rs`) and table definitions (`schema.rs`) stay private to
//! this module. Connections come from a `bb8` pool through `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use obstacle_registry::outbound::persistence::{DbPool, DieselObstacleRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/obstacles")).await?;
//! let obstacles = DieselObstacleRepository::new(pool);
//! ```

mod diesel_archive_repository;
mod diesel_basic_error_mapping;
mod diesel_comment_repository;
mod diesel_obstacle_repository;
mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_archive_repository::DieselArchiveRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_obstacle_repository::DieselObstacleRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
