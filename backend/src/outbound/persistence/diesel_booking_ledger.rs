//! PostgreSQL-backed `BookingLedger` implementation using Diesel ORM.
//!
//! Each operation runs in one transaction. `reserve` locks the requesting
//! user's row and then the kunda row (always in that order) with
//! `SELECT ... FOR UPDATE`, so competing requests for one kunda, or from one
//! user, queue behind each other and see each other's writes. The partial
//! unique index on active bookings backs the same guarantee at the schema
//! level.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{BookingLedger, BookingLedgerError, TransitionRequest};
use crate::domain::{
    AdminNotes, BookingDetails, BookingError, BookingStatus, KundaId, KundaNumber, KundaStatus,
    PriorBooking, ReservationRequest, TransitionOutcome, evaluate_reservation, plan_transition,
};

use super::diesel_error_mapping::{
    UniqueConstraint, map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{BookingRow, KundaRow, NewBookingRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, kundas, users};

/// Diesel-backed implementation of the booking ledger port.
#[derive(Clone)]
pub struct DieselBookingLedger {
    pool: DbPool,
}

impl DieselBookingLedger {
    /// Ledger over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a ledger transaction. Any variant rolls the transaction
/// back.
#[derive(Debug)]
enum LedgerTxError {
    Diesel(diesel::result::Error),
    Rejected(BookingError),
    Decode(String),
}

impl From<diesel::result::Error> for LedgerTxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn map_pool_error(error: PoolError) -> BookingLedgerError {
    map_basic_pool_error(error, BookingLedgerError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingLedgerError {
    map_basic_diesel_error(error, BookingLedgerError::query, BookingLedgerError::connection)
}

/// Classify a failed reservation. Constraint violations mean a concurrent
/// writer won a race the row locks did not cover.
fn map_reserve_error(error: LedgerTxError, request: &ReservationRequest) -> BookingLedgerError {
    match error {
        LedgerTxError::Rejected(reason) => BookingLedgerError::rejected(reason),
        LedgerTxError::Decode(message) => BookingLedgerError::query(message),
        LedgerTxError::Diesel(err) => match unique_violation(&err) {
            Some(UniqueConstraint::BookingCode) => BookingLedgerError::code_collision(),
            Some(UniqueConstraint::ActiveKundaBooking) => BookingLedgerError::rejected(
                BookingError::slot_unavailable(i64::from(request.kunda_number.get())),
            ),
            Some(UniqueConstraint::UserKundaPair) => BookingLedgerError::rejected(
                BookingError::user_already_booked(request.user_id.get()),
            ),
            _ => map_diesel_error(err),
        },
    }
}

fn map_transition_error(error: LedgerTxError) -> BookingLedgerError {
    match error {
        LedgerTxError::Rejected(reason) => BookingLedgerError::rejected(reason),
        LedgerTxError::Decode(message) => BookingLedgerError::query(message),
        LedgerTxError::Diesel(err) => map_diesel_error(err),
    }
}

fn decode_prior((kunda_id, status): (i64, String)) -> Result<PriorBooking, LedgerTxError> {
    Ok(PriorBooking {
        kunda_id: KundaId::new(kunda_id).map_err(|err| LedgerTxError::Decode(err.to_string()))?,
        status: status.parse::<BookingStatus>().map_err(LedgerTxError::Decode)?,
    })
}

#[async_trait]
impl BookingLedger for DieselBookingLedger {
    async fn reserve(
        &self,
        request: &ReservationRequest,
    ) -> Result<BookingDetails, BookingLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = request.user_id.get();
        let number = i32::from(request.kunda_number.get());

        conn.transaction(|conn| {
            async move {
                let user_row = users::table
                    .filter(users::id.eq(user_id))
                    .select(UserRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let kunda = kundas::table
                    .filter(kundas::number.eq(number))
                    .select(KundaRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .map(KundaRow::into_kunda)
                    .transpose()
                    .map_err(LedgerTxError::Decode)?;
                let prior = bookings::table
                    .filter(bookings::user_id.eq(user_id))
                    .select((bookings::kunda_id, bookings::status))
                    .load::<(i64, String)>(conn)
                    .await?
                    .into_iter()
                    .map(decode_prior)
                    .collect::<Result<Vec<_>, _>>()?;

                let kunda_id =
                    evaluate_reservation(request, user_row.is_some(), kunda.as_ref(), &prior)
                        .map_err(LedgerTxError::Rejected)?;

                let booking_row = diesel::insert_into(bookings::table)
                    .values(&NewBookingRow {
                        booking_id: request.booking_code.as_str(),
                        user_id,
                        kunda_id: kunda_id.get(),
                        status: BookingStatus::Pending.as_str(),
                        booked_at: request.booked_at,
                    })
                    .returning(BookingRow::as_returning())
                    .get_result(conn)
                    .await?;
                diesel::update(kundas::table.find(kunda_id.get()))
                    .set((
                        kundas::status.eq(KundaStatus::Booked.as_str()),
                        kundas::booked_by.eq(Some(user_id)),
                    ))
                    .execute(conn)
                    .await?;

                let user = user_row
                    .ok_or_else(|| LedgerTxError::Decode("locked user row vanished".to_owned()))?
                    .into_user()
                    .map_err(LedgerTxError::Decode)?;
                Ok(BookingDetails {
                    booking: booking_row.into_booking().map_err(LedgerTxError::Decode)?,
                    user,
                    kunda_number: request.kunda_number,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_reserve_error(err, request))
    }

    async fn transition(
        &self,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, BookingLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let code = request.booking_code.as_str();
                let booking = bookings::table
                    .filter(bookings::booking_id.eq(code))
                    .select(BookingRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| LedgerTxError::Rejected(BookingError::booking_not_found(code)))?
                    .into_booking()
                    .map_err(LedgerTxError::Decode)?;
                let plan = plan_transition(&booking, request.action, request.at)
                    .map_err(LedgerTxError::Rejected)?;

                let approved_at = plan.approved_at.or(booking.approved_at);
                let notes = request
                    .notes
                    .as_ref()
                    .or(booking.admin_notes.as_ref())
                    .map(AdminNotes::as_str);
                diesel::update(bookings::table.find(booking.id.get()))
                    .set((
                        bookings::status.eq(plan.next_status.as_str()),
                        bookings::approved_at.eq(approved_at),
                        bookings::admin_notes.eq(notes),
                    ))
                    .execute(conn)
                    .await?;
                if let Some(kunda_id) = plan.release {
                    diesel::update(kundas::table.find(kunda_id.get()))
                        .set((
                            kundas::status.eq(KundaStatus::Available.as_str()),
                            kundas::booked_by.eq(None::<i64>),
                        ))
                        .execute(conn)
                        .await?;
                }

                let number: i32 = kundas::table
                    .find(booking.kunda_id.get())
                    .select(kundas::number)
                    .first(conn)
                    .await?;
                Ok(TransitionOutcome {
                    booking_code: booking.code,
                    action: request.action,
                    status: plan.next_status,
                    kunda_number: KundaNumber::new(i64::from(number))
                        .map_err(|err| LedgerTxError::Decode(err.to_string()))?,
                    approved_at,
                    kunda_released: plan.release.is_some(),
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_transition_error)
    }
}
