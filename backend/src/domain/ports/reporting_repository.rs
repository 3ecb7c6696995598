//! Read-only port backing statistics and listings.

use async_trait::async_trait;

use crate::domain::{BookingDetails, BookingError, PhoneNumber, RegistryStats, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Failures answering reporting queries.
    pub enum ReportingRepositoryError {
        Connection { message: String } => "reporting connection failed: {message}",
        Query { message: String } => "reporting query failed: {message}",
    }
}

impl From<ReportingRepositoryError> for BookingError {
    fn from(value: ReportingRepositoryError) -> Self {
        match value {
            ReportingRepositoryError::Connection { message } => Self::storage_unavailable(message),
            ReportingRepositoryError::Query { message } => Self::storage_failure(message),
        }
    }
}

/// Read-only aggregate and listing queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportingRepository: Send + Sync {
    /// Counts taken from one consistent snapshot.
    async fn stats(&self) -> Result<RegistryStats, ReportingRepositoryError>;

    /// Every booking, newest first.
    async fn list_bookings(&self) -> Result<Vec<BookingDetails>, ReportingRepositoryError>;

    /// Every user with booking summary, newest first.
    async fn list_users(&self) -> Result<Vec<UserSummary>, ReportingRepositoryError>;

    /// Bookings of the user registered under `phone`, newest first.
    async fn bookings_for_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Vec<BookingDetails>, ReportingRepositoryError>;
}
