//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{StorageBackend, build_bootstrapped_state, build_http_state};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::error::{json_error_handler, path_error_handler};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{admin, bookings, kundas, registration, stats};

/// Inputs to [`build_app`]; cloned into every worker.
#[derive(Clone)]
pub struct AppDependencies {
    /// Readiness and liveness flags.
    pub health_state: web::Data<HealthState>,
    /// Services shared by the handlers.
    pub http_state: web::Data<HttpState>,
    /// Cookie signing key.
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    /// Lifetime of the session cookie.
    pub session_ttl: chrono::Duration,
}

/// Assemble the application: API scope with sessions, health checks and, in debug
/// builds, Swagger UI.
pub fn build_app(
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
        session_ttl,
    } = deps;

    let cookie_ttl = actix_web::cookie::time::Duration::seconds(session_ttl.num_seconds());
    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(cookie_ttl))
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(registration::register)
        .service(registration::check_phone)
        .service(registration::user_bookings)
        .service(kundas::list_kundas)
        .service(kundas::get_kunda)
        .service(bookings::request_booking)
        .service(stats::public_stats)
        .service(admin::login)
        .service(admin::logout)
        .service(admin::booking_action)
        .service(admin::admin_stats)
        .service(admin::admin_bookings)
        .service(admin::admin_users);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and start serving.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        session_ttl,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            session_ttl,
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
