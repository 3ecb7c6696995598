//! Classified failures of the registry, allocator, approval flow and access
//! gate.

use serde_json::json;
use tracing::error;

use super::ports::define_port_error;
use super::{Error, UserValidationError};

define_port_error! {
    /// Every failure the booking core can report.
    pub enum BookingError {
        InvalidInput { field: String, message: String } => "invalid {field}: {message}",
        DuplicatePhone { phone: String } => "phone number {phone} is already registered",
        UserNotFound { user_id: i64 } => "user {user_id} not found",
        SlotNotFound { kunda_number: i64 } => "kunda {kunda_number} not found",
        SlotUnavailable { kunda_number: i64 } => "kunda {kunda_number} is not available",
        UserAlreadyBooked { user_id: i64 } => "user {user_id} already has a booking",
        BookingNotFound { booking_id: String } => "booking {booking_id} not found",
        InvalidAction { action: String } => "invalid action: {action}",
        InvalidTransition { booking_id: String, status: String } =>
            "booking {booking_id} is already {status}",
        Unauthorized => "admin authentication required",
        StorageFailure { message: String } => "storage failure: {message}",
        StorageUnavailable { message: String } => "storage unavailable: {message}",
    }
}

impl From<UserValidationError> for BookingError {
    fn from(value: UserValidationError) -> Self {
        Self::invalid_input(value.field(), value.to_string())
    }
}

impl From<BookingError> for Error {
    fn from(value: BookingError) -> Self {
        let kind = value.kind();
        let message = value.to_string();
        let error = match &value {
            BookingError::InvalidInput { field, .. } => {
                return Error::invalid_request(message)
                    .with_details(json!({ "code": kind, "field": field }));
            }
            BookingError::InvalidAction { .. } => Error::invalid_request(message),
            BookingError::Unauthorized => Error::unauthorized(message),
            BookingError::UserNotFound { .. }
            | BookingError::SlotNotFound { .. }
            | BookingError::BookingNotFound { .. } => Error::not_found(message),
            BookingError::DuplicatePhone { .. }
            | BookingError::SlotUnavailable { .. }
            | BookingError::UserAlreadyBooked { .. }
            | BookingError::InvalidTransition { .. } => Error::conflict(message),
            BookingError::StorageFailure { .. } => {
                error!(error = %value, "storage failure");
                Error::internal(message)
            }
            BookingError::StorageUnavailable { .. } => {
                error!(error = %value, "storage unavailable");
                Error::service_unavailable("storage temporarily unavailable")
            }
        };
        error.with_details(json!({ "code": kind }))
    }
}
