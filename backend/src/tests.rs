//! Tests for the application bootstrap, covering readiness signalling and the
//! storage backend chosen at startup.

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use obstacle_registry::inbound::http::health::{HealthState, StorageBackend};
use rstest::{fixture, rstest};

use super::{ServerConfig, create_server};

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new(StorageBackend::Memory))
}

#[fixture]
fn config() -> ServerConfig {
    ServerConfig::new(
        Key::generate(),
        false,
        SameSite::Lax,
        "127.0.0.1:0".parse().expect("loopback address"),
    )
}

#[rstest]
fn config_without_pool_uses_memory(config: ServerConfig) {
    assert_eq!(config.storage_backend(), StorageBackend::Memory);
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(health_state: web::Data<HealthState>, config: ServerConfig) {
    assert!(!health_state.is_ready(), "state should start unready");

    let _server = create_server(health_state.clone(), config).expect("server should bind");

    assert!(health_state.is_ready(), "server creation marks readiness");
    assert!(health_state.is_alive());
}
