//! Backend entry point: loads settings, prepares storage and serves the API.

use std::ffi::OsString;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use kunda_backend::domain::{AdminAuthConfig, BootstrapSeed, PasswordDigest};
use kunda_backend::inbound::http::health::HealthState;
use kunda_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use kunda_backend::inbound::http::state::HttpStatePolicy;
use kunda_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use kunda_backend::server::{ServerConfig, StorageBackend, build_bootstrapped_state, create_server};
use kunda_backend::settings::AppSettings;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn prepare_storage(settings: &AppSettings) -> std::io::Result<StorageBackend> {
    let Some(url) = settings.database_url.clone() else {
        warn!("KUNDA_DATABASE_URL not set; bookings are kept in memory only");
        return Ok(StorageBackend::InMemory);
    };
    let migrate_url = url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migrate_url))
        .await
        .map_err(|err| startup_error("migration task failed", err))?
        .map_err(|err| startup_error("migrations failed", err))?;
    info!(applied, "database schema up to date");

    let mut config = PoolConfig::new(url);
    if let Some(max_size) = settings.pool_max_size {
        config = config.with_max_size(max_size);
    }
    let pool = DbPool::new(config)
        .await
        .map_err(|err| startup_error("database pool", err))?;
    Ok(StorageBackend::Postgres(pool))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter([OsString::from("kunda-backend")])
        .map_err(|err| startup_error("failed to load settings", err))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|err| startup_error("invalid session configuration", err))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| startup_error("invalid settings", err))?;
    let session_ttl = settings
        .admin_session_ttl()
        .map_err(|err| startup_error("invalid settings", err))?;
    let admin_password = settings
        .admin_password()
        .map_err(|err| startup_error("invalid settings", err))?;
    let policy = HttpStatePolicy {
        rebooking: settings
            .rebooking_policy()
            .map_err(|err| startup_error("invalid settings", err))?,
        auth: AdminAuthConfig {
            mode: settings
                .admin_auth_mode()
                .map_err(|err| startup_error("invalid settings", err))?,
            shared_secret: admin_password.clone(),
            session_ttl,
        },
    };
    let seed = BootstrapSeed {
        admin_username: settings.admin_username().to_owned(),
        admin_password: PasswordDigest::of(admin_password.as_str()),
    };

    let health_state = web::Data::new(HealthState::new());
    let storage = prepare_storage(&settings).await?;
    let (http_state, report) = build_bootstrapped_state(&storage, policy, &seed)
        .await
        .map_err(|err| startup_error("bootstrap failed", err))?;
    info!(
        storage = storage.name(),
        kundas_created = report.kundas_created,
        admin_seeded = report.admin_seeded,
        auth_mode = http_state.auth.mode().as_str(),
        rebooking_policy = http_state.allocator.policy().as_str(),
        %bind_addr,
        "registry ready"
    );

    let server = create_server(
        health_state.clone(),
        http_state,
        ServerConfig::new(session, bind_addr, session_ttl),
    )?;
    health_state.mark_ready();
    let result = server.await;
    health_state.mark_draining();
    result
}
