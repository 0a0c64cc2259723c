//! Service wiring over the in-memory registry for integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use obstacle_registry::domain::{
    ArchivalService, NotificationService, ObstacleDraft, ObstacleLifecycleService, UserId,
    UserRole,
};
use obstacle_registry::outbound::memory::MemoryRegistry;

pub const POINT: &str = r#"{"type":"Point","coordinates":[10.39,63.43]}"#;

pub type Lifecycle =
    ObstacleLifecycleService<MemoryRegistry, MemoryRegistry, MemoryRegistry, MemoryRegistry>;
pub type Archival = ArchivalService<MemoryRegistry, MemoryRegistry, MemoryRegistry, MemoryRegistry>;
pub type Notifications = NotificationService<MemoryRegistry, MemoryRegistry, MemoryRegistry>;

/// All three services sharing one registry, plus a pilot and a registrar.
pub struct Services {
    pub registry: Arc<MemoryRegistry>,
    pub lifecycle: Lifecycle,
    pub archival: Archival,
    pub notifications: Notifications,
    pub pilot: UserId,
    pub registrar: UserId,
}

impl Services {
    pub fn new() -> Self {
        let registry = Arc::new(MemoryRegistry::new());
        let archival = ArchivalService::new(
            Arc::clone(&registry),
            Arc::clone(&registry),
            Arc::clone(&registry),
            Arc::clone(&registry),
            Arc::new(DefaultClock),
        );
        let lifecycle = ObstacleLifecycleService::new(
            Arc::clone(&registry),
            Arc::clone(&registry),
            Arc::clone(&registry),
            archival.clone(),
        );
        let notifications = NotificationService::new(
            Arc::clone(&registry),
            Arc::clone(&registry),
            Arc::clone(&registry),
        );
        let pilot = UserId::random();
        let registrar = UserId::random();
        assert!(registry.grant(&pilot, UserRole::Pilot), "grant pilot");
        assert!(registry.grant(&registrar, UserRole::Registrar), "grant registrar");
        Self {
            registry,
            lifecycle,
            archival,
            notifications,
            pilot,
            registrar,
        }
    }
}

/// The mast used throughout the lifecycle scenarios.
pub fn mast_draft() -> ObstacleDraft {
    ObstacleDraft {
        name: Some("Mast".to_owned()),
        height: 30,
        description: Some(String::new()),
        geometry: POINT.to_owned(),
    }
}
