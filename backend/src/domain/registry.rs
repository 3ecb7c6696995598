//! Registration and registry lookups.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::ports::{CodeGenerator, RegistryRepository, RegistryRepositoryError};
use super::{
    BookingError, KundaListing, KundaNumber, NewUser, PasswordDigest, PhoneNumber, User, UserId,
};

/// Attempts made before giving up on finding an unused registration code.
pub const MAX_REGISTRATION_ATTEMPTS: usize = 5;

/// What bootstrap must ensure exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSeed {
    /// Username of the seeded admin row.
    pub admin_username: String,
    /// Digest of the seeded admin password.
    pub admin_password: PasswordDigest,
}

/// What a bootstrap run actually created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Kundas inserted by this run; zero once seeded.
    pub kundas_created: usize,
    /// Whether the admin row was inserted by this run.
    pub admin_seeded: bool,
}

/// Registers attendees and answers point lookups.
#[derive(Clone)]
pub struct RegistryService {
    repo: Arc<dyn RegistryRepository>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
}

impl RegistryService {
    /// Registry over `repo`, drawing registration codes from `codes` and time from `clock`.
    pub fn new(
        repo: Arc<dyn RegistryRepository>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, codes, clock }
    }

    /// Register a new attendee under a fresh registration code.
    pub async fn register(&self, user: &NewUser) -> Result<User, BookingError> {
        for attempt in 1..=MAX_REGISTRATION_ATTEMPTS {
            let code = self.codes.registration_code();
            match self.repo.insert_user(user, &code, self.clock.utc()).await {
                Ok(created) => {
                    info!(
                        user_id = %created.id,
                        registration_id = %created.registration_id,
                        members = created.members_count.get(),
                        "user registered"
                    );
                    return Ok(created);
                }
                Err(RegistryRepositoryError::CodeCollision) => {
                    warn!(attempt, "registration code collision; retrying with a fresh code");
                }
                Err(other) => return Err(other.into()),
            }
        }
        Err(BookingError::storage_failure(
            "could not allocate an unused registration code",
        ))
    }

    /// Registered user with `phone`, if any.
    pub async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<User>, BookingError> {
        Ok(self.repo.find_user_by_phone(phone).await?)
    }

    /// User with `id`, or `UserNotFound`.
    pub async fn user_by_id(&self, id: UserId) -> Result<User, BookingError> {
        self.repo
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| BookingError::user_not_found(id.get()))
    }

    /// All kundas in number order, with occupants.
    pub async fn list_kundas(&self) -> Result<Vec<KundaListing>, BookingError> {
        Ok(self.repo.list_kundas().await?)
    }

    /// Kunda `number`, or `SlotNotFound` before bootstrap.
    pub async fn kunda_by_number(&self, number: KundaNumber) -> Result<KundaListing, BookingError> {
        self.repo
            .find_kunda(number)
            .await?
            .ok_or_else(|| BookingError::slot_not_found(i64::from(number.get())))
    }

    /// Ensure the kunda pool and admin seed row exist.
    pub async fn bootstrap(&self, seed: &BootstrapSeed) -> Result<BootstrapReport, BookingError> {
        let report = self.repo.bootstrap(seed).await?;
        info!(
            kundas_created = report.kundas_created,
            admin_seeded = report.admin_seeded,
            "registry bootstrapped"
        );
        Ok(report)
    }
}
