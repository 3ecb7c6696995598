//! PostgreSQL-backed `ReportingRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::domain::ports::{ReportingRepository, ReportingRepositoryError};
use crate::domain::{
    BookingDetails, BookingStatus, BookingSummary, KundaNumber, KundaStatus, PhoneNumber,
    RegistryStats, UserId, UserSummary,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{BookingRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, kundas, users};

/// Diesel-backed implementation of the reporting port.
#[derive(Clone)]
pub struct DieselReportingRepository {
    pool: DbPool,
}

impl DieselReportingRepository {
    /// Repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReportingRepositoryError {
    map_basic_pool_error(error, ReportingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReportingRepositoryError {
    map_basic_diesel_error(
        error,
        ReportingRepositoryError::query,
        ReportingRepositoryError::connection,
    )
}

fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// Fold `(status, count)` rows into a lookup keyed by status.
fn by_status(rows: Vec<(String, i64)>) -> HashMap<String, u64> {
    rows.into_iter()
        .map(|(status, n)| (status, to_count(n)))
        .collect()
}

fn build_stats(
    total_users: i64,
    booking_counts: &HashMap<String, u64>,
    kunda_counts: &HashMap<String, u64>,
) -> RegistryStats {
    let bookings_in = |status: BookingStatus| booking_counts.get(status.as_str()).copied().unwrap_or(0);
    let kundas_in = |status: KundaStatus| kunda_counts.get(status.as_str()).copied().unwrap_or(0);
    let available_kundas = kundas_in(KundaStatus::Available);
    let booked_kundas = kundas_in(KundaStatus::Booked);
    RegistryStats {
        total_users: to_count(total_users),
        total_bookings: booking_counts.values().sum(),
        pending_bookings: bookings_in(BookingStatus::Pending),
        approved_bookings: bookings_in(BookingStatus::Approved),
        rejected_bookings: bookings_in(BookingStatus::Rejected),
        available_kundas,
        booked_kundas,
        total_kundas: available_kundas + booked_kundas,
    }
}

type DetailsRow = (BookingRow, UserRow, i32);

fn decode_details((booking, user, number): DetailsRow) -> Result<BookingDetails, ReportingRepositoryError> {
    Ok(BookingDetails {
        booking: booking.into_booking().map_err(ReportingRepositoryError::query)?,
        user: user.into_user().map_err(ReportingRepositoryError::query)?,
        kunda_number: KundaNumber::new(i64::from(number))
            .map_err(|err| ReportingRepositoryError::query(err.to_string()))?,
    })
}

/// Bookings joined with user and kunda number, newest first.
macro_rules! booking_details_query {
    () => {
        bookings::table
            .inner_join(users::table.on(bookings::user_id.eq(users::id)))
            .inner_join(kundas::table.on(bookings::kunda_id.eq(kundas::id)))
            .order((bookings::booked_at.desc(), bookings::id.desc()))
            .select((BookingRow::as_select(), UserRow::as_select(), kundas::number))
    };
}

/// Attach per-user booking counts and latest bookings to `users`.
fn summarise(users: Vec<UserRow>, details: &[BookingDetails]) -> Result<Vec<UserSummary>, ReportingRepositoryError> {
    let mut per_user: HashMap<UserId, Vec<&BookingDetails>> = HashMap::new();
    for detail in details {
        per_user.entry(detail.booking.user_id).or_default().push(detail);
    }
    users
        .into_iter()
        .map(|row| {
            let user = row.into_user().map_err(ReportingRepositoryError::query)?;
            let bookings = per_user.get(&user.id).map(Vec::as_slice).unwrap_or_default();
            Ok(UserSummary {
                booking_count: u64::try_from(bookings.len()).unwrap_or(u64::MAX),
                latest_booking: bookings.first().map(|d| BookingSummary::from(*d)),
                user,
            })
        })
        .collect()
}

#[async_trait]
impl ReportingRepository for DieselReportingRepository {
    async fn stats(&self) -> Result<RegistryStats, ReportingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let total_users: i64 = users::table.count().get_result(conn).await?;
                    let booking_rows: Vec<(String, i64)> = bookings::table
                        .group_by(bookings::status)
                        .select((bookings::status, count_star()))
                        .load(conn)
                        .await?;
                    let kunda_rows: Vec<(String, i64)> = kundas::table
                        .group_by(kundas::status)
                        .select((kundas::status, count_star()))
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(build_stats(
                        total_users,
                        &by_status(booking_rows),
                        &by_status(kunda_rows),
                    ))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)
    }

    async fn list_bookings(&self) -> Result<Vec<BookingDetails>, ReportingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DetailsRow> = booking_details_query!()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode_details).collect()
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, ReportingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_rows: Vec<UserRow> = users::table
            .order((users::created_at.desc(), users::id.desc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let detail_rows: Vec<DetailsRow> = booking_details_query!()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let details = detail_rows
            .into_iter()
            .map(decode_details)
            .collect::<Result<Vec<_>, _>>()?;
        summarise(user_rows, &details)
    }

    async fn bookings_for_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Vec<BookingDetails>, ReportingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DetailsRow> = booking_details_query!()
            .filter(users::phone.eq(phone.as_str()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode_details).collect()
    }
}
