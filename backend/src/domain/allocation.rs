//! Allocation rules and the booking allocator service.
//!
//! [`evaluate_reservation`] is the pure decision both storage adapters run
//! inside their critical section; [`BookingAllocator`] drives the ledger
//! port and retries on booking code collisions.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ports::{BookingLedger, BookingLedgerError, CodeGenerator};
use super::{
    BookingCode, BookingDetails, BookingError, BookingStatus, Kunda, KundaId, KundaNumber, UserId,
};

/// Attempts made before giving up on finding an unused booking code.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Whether a user may book again after an earlier booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebookingPolicy {
    /// Any earlier booking, whatever its status, blocks another.
    #[default]
    OneAttempt,
    /// Only a pending or approved booking blocks; the same kunda can never be
    /// requested twice by one user.
    OneActive,
}

impl RebookingPolicy {
    /// Setting value naming this policy.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneAttempt => "one_attempt",
            Self::OneActive => "one_active",
        }
    }

    /// Whether `prior` bookings stop the user from booking `target`.
    pub fn blocks(self, prior: &[PriorBooking], target: KundaId) -> bool {
        match self {
            Self::OneAttempt => !prior.is_empty(),
            Self::OneActive => prior
                .iter()
                .any(|booking| booking.status.holds_kunda() || booking.kunda_id == target),
        }
    }
}

impl FromStr for RebookingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one_attempt" => Ok(Self::OneAttempt),
            "one_active" => Ok(Self::OneActive),
            other => Err(format!(
                "unknown rebooking policy '{other}'; expected one_attempt|one_active"
            )),
        }
    }
}

/// An existing booking of the requesting user, as far as allocation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorBooking {
    /// Kunda the earlier booking was for.
    pub kunda_id: KundaId,
    /// Its current status; rejected bookings no longer hold the kunda.
    pub status: BookingStatus,
}

/// Everything a ledger needs to attempt one reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    /// Registered user asking for the kunda.
    pub user_id: UserId,
    /// Kunda being requested.
    pub kunda_number: KundaNumber,
    /// Freshly generated public booking id.
    pub booking_code: BookingCode,
    /// Creation timestamp recorded on the booking.
    pub booked_at: DateTime<Utc>,
    /// Rule applied to the user's earlier bookings.
    pub policy: RebookingPolicy,
}

/// Decide whether a reservation may proceed, returning the kunda to occupy.
///
/// Checks run in a fixed order: user, kunda, availability, prior bookings.
pub fn evaluate_reservation(
    request: &ReservationRequest,
    user_exists: bool,
    kunda: Option<&Kunda>,
    prior: &[PriorBooking],
) -> Result<KundaId, BookingError> {
    if !user_exists {
        return Err(BookingError::user_not_found(request.user_id.get()));
    }
    let number = i64::from(request.kunda_number.get());
    let kunda = kunda.ok_or_else(|| BookingError::slot_not_found(number))?;
    if !kunda.is_available() {
        return Err(BookingError::slot_unavailable(number));
    }
    if request.policy.blocks(prior, kunda.id()) {
        return Err(BookingError::user_already_booked(request.user_id.get()));
    }
    Ok(kunda.id())
}

/// Grants kundas to registered users.
#[derive(Clone)]
pub struct BookingAllocator {
    ledger: Arc<dyn BookingLedger>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    policy: RebookingPolicy,
}

impl BookingAllocator {
    /// Allocator over `ledger`, drawing codes from `codes` and time from `clock`.
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
        policy: RebookingPolicy,
    ) -> Self {
        Self {
            ledger,
            codes,
            clock,
            policy,
        }
    }

    /// Rebooking policy applied to every request.
    pub fn policy(&self) -> RebookingPolicy {
        self.policy
    }

    /// Reserve `kunda_number` for `user_id` as a pending booking.
    ///
    /// Of several concurrent requests for one kunda exactly one succeeds; the
    /// rest fail with `SlotUnavailable` or `UserAlreadyBooked`.
    pub async fn request_booking(
        &self,
        user_id: UserId,
        kunda_number: KundaNumber,
    ) -> Result<BookingDetails, BookingError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let request = ReservationRequest {
                user_id,
                kunda_number,
                booking_code: self.codes.booking_code(),
                booked_at: self.clock.utc(),
                policy: self.policy,
            };
            match self.ledger.reserve(&request).await {
                Ok(details) => {
                    info!(
                        booking_id = %details.booking.code,
                        user_id = %user_id,
                        kunda_number = %kunda_number,
                        "kunda reserved"
                    );
                    return Ok(details);
                }
                Err(BookingLedgerError::CodeCollision) => {
                    warn!(attempt, "booking code collision; retrying with a fresh code");
                }
                Err(BookingLedgerError::Rejected { reason }) => {
                    info!(
                        user_id = %user_id,
                        kunda_number = %kunda_number,
                        reason = reason.kind(),
                        "reservation refused"
                    );
                    return Err(reason);
                }
                Err(other) => return Err(other.into()),
            }
        }
        Err(BookingError::storage_failure(
            "could not allocate an unused booking code",
        ))
    }
}
