//! Port for the durable registry of users and kundas.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    BookingError, BootstrapReport, BootstrapSeed, KundaListing, KundaNumber, NewUser,
    PhoneNumber, RegistrationCode, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registry adapters.
    pub enum RegistryRepositoryError {
        /// The phone number is already registered.
        DuplicatePhone { phone: String } => "phone number {phone} is already registered",
        /// The generated registration code is already taken.
        CodeCollision => "registration code already issued",
        /// Storage could not be reached.
        Connection { message: String } => "registry connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } => "registry query failed: {message}",
    }
}

impl From<RegistryRepositoryError> for BookingError {
    fn from(value: RegistryRepositoryError) -> Self {
        match value {
            RegistryRepositoryError::DuplicatePhone { phone } => Self::duplicate_phone(phone),
            RegistryRepositoryError::CodeCollision => {
                Self::storage_failure("registration code already issued")
            }
            RegistryRepositoryError::Connection { message } => Self::storage_unavailable(message),
            RegistryRepositoryError::Query { message } => Self::storage_failure(message),
        }
    }
}

/// Storage for users, kundas and the admin seed row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Persist a new user under `code`.
    async fn insert_user(
        &self,
        user: &NewUser,
        code: &RegistrationCode,
        created_at: DateTime<Utc>,
    ) -> Result<User, RegistryRepositoryError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RegistryRepositoryError>;

    async fn find_user_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<User>, RegistryRepositoryError>;

    /// Every kunda ordered by number, annotated with its occupant.
    async fn list_kundas(&self) -> Result<Vec<KundaListing>, RegistryRepositoryError>;

    async fn find_kunda(
        &self,
        number: KundaNumber,
    ) -> Result<Option<KundaListing>, RegistryRepositoryError>;

    /// Create any missing kundas and the admin seed row. Idempotent.
    async fn bootstrap(&self, seed: &BootstrapSeed)
    -> Result<BootstrapReport, RegistryRepositoryError>;
}
