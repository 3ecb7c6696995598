//! Shared setup for integration tests.

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use chrono::Duration;
use zeroize::Zeroizing;

use kunda_backend::domain::{
    AdminAuthConfig, AdminAuthMode, BootstrapSeed, PasswordDigest, RebookingPolicy,
};
use kunda_backend::inbound::http::health::HealthState;
use kunda_backend::inbound::http::state::{HttpState, HttpStatePolicy};
use kunda_backend::server::{AppDependencies, StorageBackend, build_bootstrapped_state};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "integration-secret";

/// In-memory handler state, bootstrapped, with the given policies.
pub async fn memory_state(mode: AdminAuthMode, rebooking: RebookingPolicy) -> HttpState {
    let policy = HttpStatePolicy {
        rebooking,
        auth: AdminAuthConfig {
            mode,
            shared_secret: Zeroizing::new(ADMIN_PASSWORD.to_owned()),
            session_ttl: Duration::hours(2),
        },
    };
    let seed = BootstrapSeed {
        admin_username: ADMIN_USERNAME.to_owned(),
        admin_password: PasswordDigest::of(ADMIN_PASSWORD),
    };
    let (state, report) = build_bootstrapped_state(&StorageBackend::InMemory, policy, &seed)
        .await
        .expect("bootstrap");
    assert_eq!(report.kundas_created, 100);
    state
}

/// Dependencies for `build_app` over `state`, with a throwaway cookie key.
pub fn app_dependencies(state: HttpState) -> AppDependencies {
    let health = HealthState::new();
    health.mark_ready();
    AppDependencies {
        health_state: web::Data::new(health),
        http_state: web::Data::new(state),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
        session_ttl: Duration::hours(2),
    }
}
