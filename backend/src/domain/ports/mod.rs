//! Driven ports of the booking core.
//!
//! Each trait exposes a typed error generated by [`define_port_error!`]
//! so adapters report failures as predictable variants.

mod admin_credential_repository;
mod admin_session_store;
mod booking_ledger;
mod code_generator;
mod macros;
mod registry_repository;
mod reporting_repository;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use admin_credential_repository::MockAdminCredentialRepository;
pub use admin_credential_repository::{AdminCredentialError, AdminCredentialRepository};
#[cfg(test)]
pub use admin_session_store::MockAdminSessionStore;
pub use admin_session_store::{AdminSessionStore, AdminSessionStoreError};
#[cfg(test)]
pub use booking_ledger::MockBookingLedger;
pub use booking_ledger::{BookingLedger, BookingLedgerError, TransitionRequest};
pub use code_generator::CodeGenerator;
#[cfg(test)]
pub use code_generator::MockCodeGenerator;
#[cfg(test)]
pub use registry_repository::MockRegistryRepository;
pub use registry_repository::{RegistryRepository, RegistryRepositoryError};
#[cfg(test)]
pub use reporting_repository::MockReportingRepository;
pub use reporting_repository::{ReportingRepository, ReportingRepositoryError};
