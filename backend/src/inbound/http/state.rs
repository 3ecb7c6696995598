//! Shared HTTP adapter state.
//!
//! Handlers receive [`HttpState`] through `actix_web::web::Data` and only
//! talk to domain services, so they stay testable against in-memory ports.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AdminCredentialRepository, AdminSessionStore, BookingLedger, CodeGenerator,
    RegistryRepository, ReportingRepository,
};
use crate::domain::{
    AdminAuthConfig, AdminAuthService, ApprovalService, BookingAllocator, RebookingPolicy,
    RegistryService, ReportingService,
};

/// Parameter object bundling the driven ports the services are built on.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registry: Arc<dyn RegistryRepository>,
    pub ledger: Arc<dyn BookingLedger>,
    pub reports: Arc<dyn ReportingRepository>,
    pub credentials: Arc<dyn AdminCredentialRepository>,
    pub sessions: Arc<dyn AdminSessionStore>,
    pub codes: Arc<dyn CodeGenerator>,
    pub clock: Arc<dyn Clock>,
}

/// Operator-selected behaviour.
pub struct HttpStatePolicy {
    /// Rule for users asking for another kunda.
    pub rebooking: RebookingPolicy,
    /// Admin authentication settings.
    pub auth: AdminAuthConfig,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registry: RegistryService,
    pub allocator: BookingAllocator,
    pub approval: ApprovalService,
    pub reporting: ReportingService,
    pub auth: AdminAuthService,
}

impl HttpState {
    /// Wire the domain services over `ports`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::Duration;
    /// use kunda_backend::domain::{AdminAuthConfig, AdminAuthMode, RebookingPolicy};
    /// use kunda_backend::inbound::http::state::{HttpState, HttpStatePolicy, HttpStatePorts};
    /// use kunda_backend::outbound::codes::RandomCodeGenerator;
    /// use kunda_backend::outbound::memory::InMemoryRegistry;
    /// use kunda_backend::outbound::sessions::InMemoryAdminSessionStore;
    /// use mockable::DefaultClock;
    /// use zeroize::Zeroizing;
    ///
    /// let store = Arc::new(InMemoryRegistry::new());
    /// let ports = HttpStatePorts {
    ///     registry: store.clone(),
    ///     ledger: store.clone(),
    ///     reports: store.clone(),
    ///     credentials: store,
    ///     sessions: Arc::new(InMemoryAdminSessionStore::new()),
    ///     codes: Arc::new(RandomCodeGenerator),
    ///     clock: Arc::new(DefaultClock),
    /// };
    /// let policy = HttpStatePolicy {
    ///     rebooking: RebookingPolicy::OneAttempt,
    ///     auth: AdminAuthConfig {
    ///         mode: AdminAuthMode::SharedSecret,
    ///         shared_secret: Zeroizing::new("s3cret".to_owned()),
    ///         session_ttl: Duration::hours(2),
    ///     },
    /// };
    /// let state = HttpState::new(ports, policy);
    /// assert_eq!(state.allocator.policy(), RebookingPolicy::OneAttempt);
    /// ```
    pub fn new(ports: HttpStatePorts, policy: HttpStatePolicy) -> Self {
        let HttpStatePorts {
            registry,
            ledger,
            reports,
            credentials,
            sessions,
            codes,
            clock,
        } = ports;
        Self {
            registry: RegistryService::new(registry.clone(), codes.clone(), clock.clone()),
            allocator: BookingAllocator::new(
                ledger.clone(),
                codes,
                clock.clone(),
                policy.rebooking,
            ),
            approval: ApprovalService::new(ledger, clock.clone()),
            reporting: ReportingService::new(reports, registry),
            auth: AdminAuthService::new(policy.auth, credentials, sessions, clock),
        }
    }
}
