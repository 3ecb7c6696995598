//! Port producing fresh registration and booking codes.

use crate::domain::{BookingCode, RegistrationCode};

/// Source of candidate codes. Uniqueness is enforced by storage; callers
/// retry when a candidate collides.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn registration_code(&self) -> RegistrationCode;

    fn booking_code(&self) -> BookingCode;
}
