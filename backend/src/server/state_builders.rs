//! Builders wiring repositories into the domain services behind HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use obstacle_registry::domain::ports::{
    ArchiveRepository, CommentRepository, ObstacleRepository, UserDirectory,
};
use obstacle_registry::domain::{ArchivalService, NotificationService, ObstacleLifecycleService};
use obstacle_registry::inbound::http::state::HttpState;
use obstacle_registry::outbound::memory::MemoryRegistry;
use obstacle_registry::outbound::persistence::{
    DieselArchiveRepository, DieselCommentRepository, DieselObstacleRepository,
    DieselUserDirectory,
};

use super::ServerConfig;

/// Assemble the lifecycle, archival and notification services over one set
/// of stores.
fn build_services<O, C, A, D>(
    obstacles: Arc<O>,
    comments: Arc<C>,
    archive: Arc<A>,
    directory: Arc<D>,
) -> HttpState
where
    O: ObstacleRepository + 'static,
    C: CommentRepository + 'static,
    A: ArchiveRepository + 'static,
    D: UserDirectory + 'static,
{
    let archival = ArchivalService::new(
        Arc::clone(&obstacles),
        Arc::clone(&comments),
        archive,
        Arc::clone(&directory),
        Arc::new(DefaultClock),
    );
    let lifecycle = ObstacleLifecycleService::new(
        Arc::clone(&obstacles),
        Arc::clone(&comments),
        Arc::clone(&directory),
        archival.clone(),
    );
    let notifications = NotificationService::new(obstacles, comments, directory);
    HttpState::new(
        Arc::new(lifecycle),
        Arc::new(archival),
        Arc::new(notifications),
    )
}

/// Registry holding the configured role seeds.
fn seeded_registry(config: &ServerConfig) -> MemoryRegistry {
    let registry = MemoryRegistry::new();
    for (user, role) in &config.role_seeds {
        if registry.grant(user, *role) {
            info!(%user, %role, "role seeded");
        } else {
            warn!(%user, %role, "role seed not applied");
        }
    }
    registry
}

/// Build HTTP state over PostgreSQL when a pool is configured, otherwise over
/// an in-memory registry seeded from the configured roles.
pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => {
            if !config.role_seeds.is_empty() {
                warn!("role seeds ignored; roles come from the user_roles table");
            }
            build_services(
                Arc::new(DieselObstacleRepository::new(pool.clone())),
                Arc::new(DieselCommentRepository::new(pool.clone())),
                Arc::new(DieselArchiveRepository::new(pool.clone())),
                Arc::new(DieselUserDirectory::new(pool.clone())),
            )
        }
        None => {
            warn!("no database configured; obstacle data lives in memory only");
            let registry = Arc::new(seeded_registry(config));
            build_services(
                Arc::clone(&registry),
                Arc::clone(&registry),
                Arc::clone(&registry),
                registry,
            )
        }
    }
}
