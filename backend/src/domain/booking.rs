//! Bookings and their approval state machine.
//!
//! ```text
//! pending --approve--> approved
//! pending --reject---> rejected   (kunda released)
//! ```
//!
//! Both targets are terminal. Acting on a booking that is no longer pending
//! fails with `InvalidTransition`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BookingCode, BookingError, KundaId, KundaNumber, User, UserId};

/// Upper bound on admin notes, in characters.
pub const NOTES_MAX: usize = 500;

/// Storage-assigned booking identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookingId(i64);

impl BookingId {
    /// Wrap a storage identifier; `None` when not positive.
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Raw database identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Lifecycle of a booking. Only `Pending` can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting an admin decision; holds the kunda.
    Pending,
    /// Confirmed by an admin; keeps the kunda.
    Approved,
    /// Declined by an admin; the kunda was released.
    Rejected,
}

impl BookingStatus {
    /// Stored and wire form of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether a booking in this state holds its kunda.
    pub fn holds_kunda(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// Decision an admin may take on a pending booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    /// Confirm the booking.
    Approve,
    /// Decline the booking and free its kunda.
    Reject,
}

impl AdminAction {
    /// Path segment naming the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl FromStr for AdminAction {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(BookingError::invalid_action(s)),
        }
    }
}

/// Optional free-text note an admin attaches when deciding a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AdminNotes(String);

impl AdminNotes {
    /// Trim the note; blank notes become `None`.
    pub fn parse(raw: &str) -> Result<Option<Self>, BookingError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > NOTES_MAX {
            return Err(BookingError::invalid_input(
                "notes",
                format!("notes must be at most {NOTES_MAX} characters"),
            ));
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    /// Notes as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A booking row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Internal row identifier.
    pub id: BookingId,
    /// Public booking id shown to attendees and admins.
    pub code: BookingCode,
    pub user_id: UserId,
    pub kunda_id: KundaId,
    pub status: BookingStatus,
    /// When the booking was requested.
    pub booked_at: DateTime<Utc>,
    /// Set once, when an admin approves.
    pub approved_at: Option<DateTime<Utc>>,
    /// Free-text notes left by the deciding admin.
    pub admin_notes: Option<AdminNotes>,
}

/// A booking joined with its user and kunda number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub booking: Booking,
    /// User who made the booking.
    pub user: User,
    /// Number of the booked kunda.
    pub kunda_number: KundaNumber,
}

/// Writes required to apply an admin action to a pending booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Status after the action.
    pub next_status: BookingStatus,
    /// Approval timestamp to record, if approving.
    pub approved_at: Option<DateTime<Utc>>,
    /// Kunda to return to the available pool, if any.
    pub release: Option<KundaId>,
}

/// Decide the writes for `action` on `booking` at time `at`.
///
/// # Examples
/// ```
/// # use kunda_backend::domain::*;
/// # use chrono::Utc;
/// # let booking = Booking {
/// #     id: BookingId::new(1).unwrap(),
/// #     code: BookingCode::new("BKAAAA0001").unwrap(),
/// #     user_id: UserId::new(1).unwrap(),
/// #     kunda_id: KundaId::new(5).unwrap(),
/// #     status: BookingStatus::Pending,
/// #     booked_at: Utc::now(),
/// #     approved_at: None,
/// #     admin_notes: None,
/// # };
/// let plan = plan_transition(&booking, AdminAction::Reject, Utc::now()).unwrap();
/// assert_eq!(plan.next_status, BookingStatus::Rejected);
/// assert_eq!(plan.release, Some(booking.kunda_id));
/// ```
pub fn plan_transition(
    booking: &Booking,
    action: AdminAction,
    at: DateTime<Utc>,
) -> Result<TransitionPlan, BookingError> {
    if booking.status != BookingStatus::Pending {
        return Err(BookingError::invalid_transition(
            booking.code.as_str(),
            booking.status.as_str(),
        ));
    }
    Ok(match action {
        AdminAction::Approve => TransitionPlan {
            next_status: BookingStatus::Approved,
            approved_at: Some(at),
            release: None,
        },
        AdminAction::Reject => TransitionPlan {
            next_status: BookingStatus::Rejected,
            approved_at: None,
            release: Some(booking.kunda_id),
        },
    })
}

/// Result of an admin action, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub booking_code: BookingCode,
    pub action: AdminAction,
    /// Status after the action.
    pub status: BookingStatus,
    pub kunda_number: KundaNumber,
    pub approved_at: Option<DateTime<Utc>>,
    /// Whether the kunda went back to the pool.
    pub kunda_released: bool,
}
