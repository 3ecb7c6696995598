//! Builders wiring storage adapters into handler state.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::{BootstrapReport, BootstrapSeed, BookingError};
use crate::inbound::http::state::{HttpState, HttpStatePolicy, HttpStatePorts};
use crate::outbound::codes::RandomCodeGenerator;
use crate::outbound::memory::InMemoryRegistry;
use crate::outbound::persistence::{
    DbPool, DieselAdminCredentialRepository, DieselBookingLedger, DieselRegistryRepository,
    DieselReportingRepository,
};
use crate::outbound::sessions::InMemoryAdminSessionStore;

/// Where registry data lives.
pub enum StorageBackend {
    Postgres(DbPool),
    /// Single-process state, lost on restart.
    InMemory,
}

impl StorageBackend {
    /// Name used in startup logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory => "memory",
        }
    }
}

fn ports_for(storage: &StorageBackend) -> HttpStatePorts {
    let sessions = Arc::new(InMemoryAdminSessionStore::new());
    let codes = Arc::new(RandomCodeGenerator);
    let clock = Arc::new(DefaultClock);
    match storage {
        StorageBackend::Postgres(pool) => HttpStatePorts {
            registry: Arc::new(DieselRegistryRepository::new(pool.clone())),
            ledger: Arc::new(DieselBookingLedger::new(pool.clone())),
            reports: Arc::new(DieselReportingRepository::new(pool.clone())),
            credentials: Arc::new(DieselAdminCredentialRepository::new(pool.clone())),
            sessions,
            codes,
            clock,
        },
        StorageBackend::InMemory => {
            let store = Arc::new(InMemoryRegistry::new());
            HttpStatePorts {
                registry: store.clone(),
                ledger: store.clone(),
                reports: store.clone(),
                credentials: store,
                sessions,
                codes,
                clock,
            }
        }
    }
}

/// Build handler state over `storage`.
pub fn build_http_state(storage: &StorageBackend, policy: HttpStatePolicy) -> HttpState {
    HttpState::new(ports_for(storage), policy)
}

/// Build handler state and make sure the kunda pool and admin row exist.
pub async fn build_bootstrapped_state(
    storage: &StorageBackend,
    policy: HttpStatePolicy,
    seed: &BootstrapSeed,
) -> Result<(HttpState, BootstrapReport), BookingError> {
    let state = build_http_state(storage, policy);
    let report = state.registry.bootstrap(seed).await?;
    Ok((state, report))
}
