//! Response views shared by several handler modules.
//!
//! Domain records hold validated newtypes; these views flatten them into the
//! camelCase JSON clients consume and carry the OpenAPI schema.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    BookingDetails, BookingStatus, KundaListing, KundaOccupant, KundaStatus, User, UserSummary,
};

/// Body of informational success responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logged out")]
    pub message: String,
}

impl MessageResponse {
    /// Message body with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A booking with its holder and kunda.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    /// Public booking id.
    #[schema(example = "BK7Q2M9X4D")]
    pub booking_id: String,
    pub status: BookingStatus,
    #[schema(example = 12)]
    pub kunda_number: u16,
    pub booked_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    /// User who made the booking.
    pub user: User,
}

impl From<BookingDetails> for BookingView {
    fn from(details: BookingDetails) -> Self {
        let BookingDetails {
            booking,
            user,
            kunda_number,
        } = details;
        Self {
            booking_id: booking.code.as_str().to_owned(),
            status: booking.status,
            kunda_number: kunda_number.get(),
            booked_at: booking.booked_at,
            approved_at: booking.approved_at,
            admin_notes: booking.admin_notes.map(|notes| notes.as_str().to_owned()),
            user,
        }
    }
}

/// List of bookings, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    /// Newest first.
    pub bookings: Vec<BookingView>,
}

impl BookingList {
    /// Views over `details`, keeping their order.
    pub fn from_details(details: Vec<BookingDetails>) -> Self {
        Self {
            bookings: details.into_iter().map(BookingView::from).collect(),
        }
    }
}

/// A kunda and, when booked, who holds it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KundaView {
    #[schema(example = 12)]
    pub kunda_number: u16,
    pub status: KundaStatus,
    /// Occupant, when booked.
    pub booked_by: Option<KundaOccupant>,
}

impl From<KundaListing> for KundaView {
    fn from(listing: KundaListing) -> Self {
        Self {
            kunda_number: listing.kunda.number().get(),
            status: listing.kunda.status(),
            booked_by: listing.occupant,
        }
    }
}

/// A user with a digest of their bookings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryView {
    pub user: User,
    pub booking_count: u64,
    /// Latest booking id, if any.
    pub booking_id: Option<String>,
    pub booking_status: Option<BookingStatus>,
    pub kunda_number: Option<u16>,
}

impl From<UserSummary> for UserSummaryView {
    fn from(summary: UserSummary) -> Self {
        let latest = summary.latest_booking;
        Self {
            user: summary.user,
            booking_count: summary.booking_count,
            booking_id: latest.as_ref().map(|b| b.booking_code.as_str().to_owned()),
            booking_status: latest.as_ref().map(|b| b.status),
            kunda_number: latest.map(|b| b.kunda_number.get()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Booking, BookingCode, BookingId, BookingSummary, Kunda, KundaId, KundaNumber, NewUser,
        RegistrationCode, UserId,
    };
    use rstest::rstest;
    use serde_json::Value;

    fn user() -> User {
        let new = NewUser::try_from_parts("Asha Rao", "9876543210", "asha@example.com", 3)
            .expect("valid user");
        User {
            id: UserId::new(1).expect("id"),
            name: new.name,
            phone: new.phone,
            email: new.email,
            members_count: new.members,
            registration_id: RegistrationCode::new("GHAAAA0001").expect("code"),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn booking_view_flattens_identifiers() {
        let details = BookingDetails {
            booking: Booking {
                id: BookingId::new(9).expect("id"),
                code: BookingCode::new("BKAAAA0009").expect("code"),
                user_id: UserId::new(1).expect("user"),
                kunda_id: KundaId::new(12).expect("kunda"),
                status: BookingStatus::Pending,
                booked_at: Utc::now(),
                approved_at: None,
                admin_notes: None,
            },
            user: user(),
            kunda_number: KundaNumber::new(12).expect("number"),
        };

        let json = serde_json::to_value(BookingView::from(details)).expect("serialise");
        assert_eq!(json["bookingId"], "BKAAAA0009");
        assert_eq!(json["kundaNumber"], 12);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["user"]["registrationId"], "GHAAAA0001");
        assert_eq!(json["approvedAt"], Value::Null);
    }

    #[rstest]
    fn free_kunda_has_no_occupant() {
        let listing = KundaListing {
            kunda: Kunda::available(
                KundaId::new(3).expect("id"),
                KundaNumber::new(3).expect("number"),
            ),
            occupant: None,
        };
        let json = serde_json::to_value(KundaView::from(listing)).expect("serialise");
        assert_eq!(json["status"], "available");
        assert_eq!(json["bookedBy"], Value::Null);
    }

    #[rstest]
    fn user_summary_surfaces_latest_booking() {
        let summary = UserSummary {
            user: user(),
            booking_count: 1,
            latest_booking: Some(BookingSummary {
                booking_code: BookingCode::new("BKAAAA0002").expect("code"),
                status: BookingStatus::Approved,
                kunda_number: KundaNumber::new(44).expect("number"),
            }),
        };
        let json = serde_json::to_value(UserSummaryView::from(summary)).expect("serialise");
        assert_eq!(json["bookingStatus"], "approved");
        assert_eq!(json["kundaNumber"], 44);
        assert_eq!(json["bookingCount"], 1);
    }
}
