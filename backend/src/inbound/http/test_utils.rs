//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use chrono::Duration;
use mockable::DefaultClock;
use zeroize::Zeroizing;

use crate::domain::{
    AdminAuthConfig, AdminAuthMode, AdminAuthService, BootstrapSeed, PasswordDigest,
    RebookingPolicy,
};
use crate::outbound::codes::RandomCodeGenerator;
use crate::outbound::memory::InMemoryRegistry;
use crate::outbound::sessions::InMemoryAdminSessionStore;

use super::state::{HttpState, HttpStatePolicy, HttpStatePorts};

pub const TEST_ADMIN_USERNAME: &str = "admin";
pub const TEST_ADMIN_PASSWORD: &str = "correct horse";

/// Session middleware with a fresh key, cookie `session` and `Secure` off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

fn auth_config() -> AdminAuthConfig {
    AdminAuthConfig {
        mode: AdminAuthMode::SharedSecret,
        shared_secret: Zeroizing::new(TEST_ADMIN_PASSWORD.to_owned()),
        session_ttl: Duration::hours(2),
    }
}

/// Shared-secret auth over empty in-memory stores.
pub fn admin_auth_service() -> AdminAuthService {
    AdminAuthService::new(
        auth_config(),
        Arc::new(InMemoryRegistry::new()),
        Arc::new(InMemoryAdminSessionStore::new()),
        Arc::new(DefaultClock),
    )
}

/// Handler state over a bootstrapped in-memory registry.
pub async fn bootstrapped_state() -> HttpState {
    let store = Arc::new(InMemoryRegistry::new());
    let ports = HttpStatePorts {
        registry: store.clone(),
        ledger: store.clone(),
        reports: store.clone(),
        credentials: store,
        sessions: Arc::new(InMemoryAdminSessionStore::new()),
        codes: Arc::new(RandomCodeGenerator),
        clock: Arc::new(DefaultClock),
    };
    let state = HttpState::new(
        ports,
        HttpStatePolicy {
            rebooking: RebookingPolicy::OneAttempt,
            auth: auth_config(),
        },
    );
    state
        .registry
        .bootstrap(&BootstrapSeed {
            admin_username: TEST_ADMIN_USERNAME.to_owned(),
            admin_password: PasswordDigest::of(TEST_ADMIN_PASSWORD),
        })
        .await
        .expect("bootstrap in-memory registry");
    state
}

/// The `session` cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
