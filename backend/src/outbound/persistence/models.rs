//! Internal Diesel row structs and their decoding into domain types.
//!
//! Rows never leave the persistence layer. Decoding re-validates every
//! column through the domain constructors, so a row that violates a domain
//! invariant surfaces as a query error instead of a corrupt value.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    AdminNotes, Booking, BookingCode, BookingId, BookingStatus, EmailAddress, Kunda, KundaId,
    KundaNumber, KundaOccupant, KundaStatus, MembersCount, PersonName, PhoneNumber,
    RegistrationCode, User, UserId,
};

use super::schema::{admin_users, bookings, kundas, users};

fn column<T, E: Display>(name: &str, decoded: Result<T, E>) -> Result<T, String> {
    decoded.map_err(|err| format!("invalid stored {name}: {err}"))
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub members_count: i32,
    pub registration_id: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        Ok(User {
            id: column("user id", UserId::new(self.id))?,
            name: column("name", PersonName::new(&self.name))?,
            phone: column("phone", PhoneNumber::new(&self.phone))?,
            email: column("email", EmailAddress::new(&self.email))?,
            members_count: column("members_count", MembersCount::new(i64::from(self.members_count)))?,
            registration_id: column("registration_id", RegistrationCode::new(&self.registration_id))?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub members_count: i32,
    pub registration_id: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Public columns of whoever holds a kunda, read through a left join.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OccupantRow {
    pub name: String,
    pub registration_id: String,
}

impl OccupantRow {
    pub(crate) fn into_occupant(self) -> Result<KundaOccupant, String> {
        Ok(KundaOccupant {
            name: column("name", PersonName::new(&self.name))?,
            registration_id: column("registration_id", RegistrationCode::new(&self.registration_id))?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = kundas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct KundaRow {
    pub id: i64,
    pub number: i32,
    pub status: String,
    pub booked_by: Option<i64>,
}

impl KundaRow {
    pub(crate) fn into_kunda(self) -> Result<Kunda, String> {
        let booked_by = self
            .booked_by
            .map(UserId::new)
            .transpose()
            .map_err(|err| format!("invalid stored booked_by: {err}"))?;
        column(
            "kunda",
            Kunda::from_parts(
                column("kunda id", KundaId::new(self.id))?,
                column("kunda number", KundaNumber::new(i64::from(self.number)))?,
                column("kunda status", self.status.parse::<KundaStatus>())?,
                booked_by,
            ),
        )
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = kundas)]
pub(crate) struct NewKundaRow<'a> {
    pub number: i32,
    pub status: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: i64,
    pub booking_id: String,
    pub user_id: i64,
    pub kunda_id: i64,
    pub status: String,
    pub booked_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
}

impl BookingRow {
    pub(crate) fn into_booking(self) -> Result<Booking, String> {
        let admin_notes = match self.admin_notes.as_deref() {
            Some(raw) => column("admin_notes", AdminNotes::parse(raw))?,
            None => None,
        };
        Ok(Booking {
            id: BookingId::new(self.id).ok_or_else(|| format!("invalid stored booking id {}", self.id))?,
            code: column("booking_id", BookingCode::new(&self.booking_id))?,
            user_id: column("user_id", UserId::new(self.user_id))?,
            kunda_id: column("kunda_id", KundaId::new(self.kunda_id))?,
            status: column("booking status", self.status.parse::<BookingStatus>())?,
            booked_at: self.booked_at,
            approved_at: self.approved_at,
            admin_notes,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    pub booking_id: &'a str,
    pub user_id: i64,
    pub kunda_id: i64,
    pub status: &'a str,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admin_users)]
pub(crate) struct NewAdminUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}
