//! Admin decisions on pending bookings.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{BookingLedger, TransitionRequest};
use super::{AdminAction, AdminCapability, AdminNotes, BookingCode, BookingError, TransitionOutcome};

/// Applies approve/reject decisions through the booking ledger.
#[derive(Clone)]
pub struct ApprovalService {
    ledger: Arc<dyn BookingLedger>,
    clock: Arc<dyn Clock>,
}

impl ApprovalService {
    /// Approval service over `ledger`, stamping decisions with `clock`.
    pub fn new(ledger: Arc<dyn BookingLedger>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// Approve or reject the pending booking `booking_code`.
    ///
    /// Rejection returns the kunda to the pool in the same unit of work.
    pub async fn apply_action(
        &self,
        admin: &AdminCapability,
        booking_code: BookingCode,
        action: AdminAction,
        notes: Option<AdminNotes>,
    ) -> Result<TransitionOutcome, BookingError> {
        let request = TransitionRequest {
            booking_code,
            action,
            notes,
            at: self.clock.utc(),
        };
        let outcome = self.ledger.transition(&request).await?;
        info!(
            admin = admin.identity().username(),
            booking_id = %outcome.booking_code,
            action = action.as_str(),
            status = outcome.status.as_str(),
            kunda_number = %outcome.kunda_number,
            kunda_released = outcome.kunda_released,
            "booking decided"
        );
        Ok(outcome)
    }
}
