//! PostgreSQL-backed `RegistryRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{RegistryRepository, RegistryRepositoryError};
use crate::domain::{
    BootstrapReport, BootstrapSeed, KundaListing, KundaNumber, KundaStatus, NewUser, PhoneNumber,
    RegistrationCode, User, UserId,
};

use super::diesel_error_mapping::{
    UniqueConstraint, map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{KundaRow, NewAdminUserRow, NewKundaRow, NewUserRow, OccupantRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{admin_users, kundas, users};

/// Diesel-backed implementation of the registry port.
#[derive(Clone)]
pub struct DieselRegistryRepository {
    pool: DbPool,
}

impl DieselRegistryRepository {
    /// Repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RegistryRepositoryError {
    map_basic_pool_error(error, RegistryRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RegistryRepositoryError {
    map_basic_diesel_error(
        error,
        RegistryRepositoryError::query,
        RegistryRepositoryError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error, phone: &PhoneNumber) -> RegistryRepositoryError {
    match unique_violation(&error) {
        Some(UniqueConstraint::UserPhone) => {
            RegistryRepositoryError::duplicate_phone(phone.as_str())
        }
        Some(UniqueConstraint::RegistrationCode) => RegistryRepositoryError::code_collision(),
        _ => map_diesel_error(error),
    }
}

fn decode_user(row: UserRow) -> Result<User, RegistryRepositoryError> {
    row.into_user().map_err(RegistryRepositoryError::query)
}

fn decode_listing(
    (kunda, occupant): (KundaRow, Option<OccupantRow>),
) -> Result<KundaListing, RegistryRepositoryError> {
    Ok(KundaListing {
        kunda: kunda.into_kunda().map_err(RegistryRepositoryError::query)?,
        occupant: occupant
            .map(OccupantRow::into_occupant)
            .transpose()
            .map_err(RegistryRepositoryError::query)?,
    })
}

/// Kundas left-joined with their occupant, ordered by number.
macro_rules! kunda_listing_query {
    () => {
        kundas::table
            .left_join(users::table.on(kundas::booked_by.eq(users::id.nullable())))
            .order(kundas::number.asc())
            .select((KundaRow::as_select(), Option::<OccupantRow>::as_select()))
    };
}

#[async_trait]
impl RegistryRepository for DieselRegistryRepository {
    async fn insert_user(
        &self,
        user: &NewUser,
        code: &RegistrationCode,
        created_at: DateTime<Utc>,
    ) -> Result<User, RegistryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            name: user.name.as_str(),
            phone: user.phone.as_str(),
            email: user.email.as_str(),
            members_count: i32::from(user.members.get()),
            registration_id: code.as_str(),
            created_at,
        };

        let stored = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, &user.phone))?;
        decode_user(stored)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RegistryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode_user).transpose()
    }

    async fn find_user_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<User>, RegistryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::phone.eq(phone.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode_user).transpose()
    }

    async fn list_kundas(&self) -> Result<Vec<KundaListing>, RegistryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(KundaRow, Option<OccupantRow>)> = kunda_listing_query!()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode_listing).collect()
    }

    async fn find_kunda(
        &self,
        number: KundaNumber,
    ) -> Result<Option<KundaListing>, RegistryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(KundaRow, Option<OccupantRow>)> = kunda_listing_query!()
            .filter(kundas::number.eq(i32::from(number.get())))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode_listing).transpose()
    }

    async fn bootstrap(
        &self,
        seed: &BootstrapSeed,
    ) -> Result<BootstrapReport, RegistryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let kunda_rows: Vec<NewKundaRow<'_>> = KundaNumber::all()
            .map(|number| NewKundaRow {
                number: i32::from(number.get()),
                status: KundaStatus::Available.as_str(),
            })
            .collect();
        let admin = NewAdminUserRow {
            username: seed.admin_username.as_str(),
            password_hash: seed.admin_password.as_hex(),
        };

        conn.transaction(|conn| {
            async move {
                let kundas_created = diesel::insert_into(kundas::table)
                    .values(&kunda_rows)
                    .on_conflict(kundas::number)
                    .do_nothing()
                    .execute(conn)
                    .await?;
                let admins_created = diesel::insert_into(admin_users::table)
                    .values(&admin)
                    .on_conflict(admin_users::username)
                    .do_nothing()
                    .execute(conn)
                    .await?;
                Ok(BootstrapReport {
                    kundas_created,
                    admin_seeded: admins_created > 0,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, RegistryRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, RegistryRepositoryError::Query { .. }));
    }

    #[rstest]
    fn unclassified_insert_errors_fall_back_to_query() {
        let phone = PhoneNumber::new("9876543210").expect("phone");
        let err = map_insert_error(diesel::result::Error::NotFound, &phone);
        assert!(matches!(err, RegistryRepositoryError::Query { .. }));
    }
}
