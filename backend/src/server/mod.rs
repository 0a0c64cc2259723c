//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use obstacle_registry::Trace;
#[cfg(debug_assertions)]
use obstacle_registry::doc::ApiDoc;
use obstacle_registry::inbound::http::archive::{
    archive_obstacle, delete_archived_report, get_archived_report, list_archived_reports,
    restore_archived_report,
};
use obstacle_registry::inbound::http::health::{HealthState, live, ready};
use obstacle_registry::inbound::http::notifications::{grouped_notifications, unread_count};
use obstacle_registry::inbound::http::obstacles::{
    add_comment, create_obstacle, delete_obstacle, edit_obstacle, get_obstacle,
    list_obstacles_by_status, list_owned_obstacles, quick_save_obstacle, set_obstacle_status,
};
use obstacle_registry::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    // `/obstacles/mine` must be registered ahead of `/obstacles/{id}`.
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(create_obstacle)
        .service(quick_save_obstacle)
        .service(list_owned_obstacles)
        .service(list_obstacles_by_status)
        .service(get_obstacle)
        .service(set_obstacle_status)
        .service(edit_obstacle)
        .service(add_comment)
        .service(delete_obstacle)
        .service(archive_obstacle)
        .service(list_archived_reports)
        .service(get_archived_report)
        .service(restore_archived_report)
        .service(delete_archived_report)
        .service(unread_count)
        .service(grouped_notifications);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        role_seeds: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
