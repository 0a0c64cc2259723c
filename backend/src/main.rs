//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use obstacle_registry::inbound::http::health::HealthState;
use obstacle_registry::inbound::http::session_config::{BuildMode, session_settings_from_config};
use obstacle_registry::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use obstacle_registry::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Apply pending migrations and open a pool for `database_url`.
async fn connect_database(database_url: &str, max_size: u32) -> std::io::Result<DbPool> {
    let config = PoolConfig::new(database_url).with_max_size(max_size);
    info!(database = %config.redacted_url(), "applying migrations");

    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations complete");

    DbPool::new(config).await.map_err(std::io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    let session = session_settings_from_config(&settings, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let role_seeds = settings.role_seeds().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
    )
    .with_role_seeds(role_seeds);
    if let Some(url) = settings.database_url() {
        let pool = connect_database(url, settings.pool_max_size()).await?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new(config.storage_backend()));
    info!(
        bind_addr = %settings.bind_addr(),
        backend = ?config.storage_backend(),
        "starting obstacle registry"
    );
    create_server(health_state, config)?.await
}

#[cfg(test)]
mod tests;
