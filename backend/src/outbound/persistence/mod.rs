//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Adapters translate between Diesel rows and domain types and keep the
//! transactional boundaries the ports promise. Row structs (`models.rs`) and
//! table definitions (`schema.rs`) stay private to this module. Connections
//! come from a `bb8` pool of `diesel-async` connections; every Diesel or pool
//! failure is mapped onto the owning port's error type.
//!
//! # Example
//!
//! ```no_run
//! use kunda_backend::outbound::persistence::{DbPool, DieselBookingLedger, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/kunda")).await?;
//! let ledger = DieselBookingLedger::new(pool);
//! # let _ = ledger;
//! # Ok(())
//! # }
//! ```

mod diesel_admin_credential_repository;
mod diesel_booking_ledger;
mod diesel_error_mapping;
mod diesel_registry_repository;
mod diesel_reporting_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_admin_credential_repository::DieselAdminCredentialRepository;
pub use diesel_booking_ledger::DieselBookingLedger;
pub use diesel_registry_repository::DieselRegistryRepository;
pub use diesel_reporting_repository::DieselReportingRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
