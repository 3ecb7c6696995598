//! Port for the transactional booking ledger.
//!
//! Implementations run each operation as one indivisible unit: the
//! allocation checks and writes of [`BookingLedger::reserve`], and the status
//! change plus kunda release of [`BookingLedger::transition`], either commit
//! together or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AdminAction, AdminNotes, BookingCode, BookingDetails, BookingError, ReservationRequest,
    TransitionOutcome,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger adapters.
    pub enum BookingLedgerError {
        /// A domain rule refused the operation.
        Rejected { reason: BookingError } => "{reason}",
        /// The generated booking code is already taken.
        CodeCollision => "booking code already issued",
        Connection { message: String } => "ledger connection failed: {message}",
        Query { message: String } => "ledger query failed: {message}",
    }
}

impl From<BookingError> for BookingLedgerError {
    fn from(value: BookingError) -> Self {
        Self::rejected(value)
    }
}

impl From<BookingLedgerError> for BookingError {
    fn from(value: BookingLedgerError) -> Self {
        match value {
            BookingLedgerError::Rejected { reason } => reason,
            BookingLedgerError::CodeCollision => Self::storage_failure("booking code already issued"),
            BookingLedgerError::Connection { message } => Self::storage_unavailable(message),
            BookingLedgerError::Query { message } => Self::storage_failure(message),
        }
    }
}

/// An admin decision ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    /// Public id of the booking to decide.
    pub booking_code: BookingCode,
    pub action: AdminAction,
    /// Notes to store with the decision.
    pub notes: Option<AdminNotes>,
    /// Decision timestamp.
    pub at: DateTime<Utc>,
}

/// Atomic writes that allocate kundas and decide bookings.
///
/// Implementations must run each call as one indivisible unit so that two
/// requests for the same kunda can never both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Atomically check the allocation rules and create a pending booking.
    async fn reserve(
        &self,
        request: &ReservationRequest,
    ) -> Result<BookingDetails, BookingLedgerError>;

    /// Atomically apply an admin action to a pending booking.
    async fn transition(
        &self,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, BookingLedgerError>;
}
