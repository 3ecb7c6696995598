//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered attendees. `phone` and `registration_id` are unique.
    users (id) {
        id -> Int8,
        name -> Varchar,
        phone -> Varchar,
        email -> Varchar,
        members_count -> Int4,
        registration_id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// The fixed kunda pool. `booked_by` is set exactly when `status` is
    /// `booked`.
    kundas (id) {
        id -> Int8,
        number -> Int4,
        status -> Varchar,
        booked_by -> Nullable<Int8>,
    }
}

diesel::table! {
    /// Booking requests and their admin decisions.
    bookings (id) {
        id -> Int8,
        booking_id -> Varchar,
        user_id -> Int8,
        kunda_id -> Int8,
        status -> Varchar,
        booked_at -> Timestamptz,
        approved_at -> Nullable<Timestamptz>,
        admin_notes -> Nullable<Varchar>,
    }
}

diesel::table! {
    admin_users (id) {
        id -> Int8,
        username -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, kundas, bookings, admin_users);
