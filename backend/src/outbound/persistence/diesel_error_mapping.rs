//! Shared mapping from pool and Diesel failures to port errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use super::pool::PoolError;

/// Unique constraints whose violation carries domain meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UniqueConstraint {
    UserPhone,
    RegistrationCode,
    BookingCode,
    ActiveKundaBooking,
    UserKundaPair,
}

impl UniqueConstraint {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "users_phone_key" => Some(Self::UserPhone),
            "users_registration_id_key" => Some(Self::RegistrationCode),
            "bookings_booking_id_key" => Some(Self::BookingCode),
            "bookings_active_kunda_idx" => Some(Self::ActiveKundaBooking),
            "bookings_user_id_kunda_id_key" => Some(Self::UserKundaPair),
            _ => None,
        }
    }
}

/// Which known unique constraint `error` violated, if any.
pub(crate) fn unique_violation(error: &DieselError) -> Option<UniqueConstraint> {
    let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = error else {
        return None;
    };
    let constraint = info.constraint_name();
    let known = constraint.and_then(UniqueConstraint::from_name);
    if known.is_none() {
        warn!(
            constraint_name = ?constraint,
            message = info.message(),
            "unrecognised unique violation"
        );
    }
    known
}

/// Map pool errors into a port's connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors into a port's query or connection constructor.
///
/// Closed connections and serialization failures are reported as connection
/// errors; everything else becomes a query error with a stable message.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            connection("database serialization failure")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violated")
        }
        _ => query("database error"),
    }
}
