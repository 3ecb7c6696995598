//! Read-only statistics and listings.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::ports::{RegistryRepository, ReportingRepository};
use super::{
    AdminCapability, BookingCode, BookingDetails, BookingError, BookingStatus, KUNDA_COUNT,
    KundaNumber, PhoneNumber, User,
};

/// Counts over the whole registry, taken from one consistent snapshot.
///
/// ## Invariants
/// - `available_kundas + booked_kundas == total_kundas`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_users: u64,
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub approved_bookings: u64,
    pub rejected_bookings: u64,
    pub available_kundas: u64,
    /// Kundas held by a pending or approved booking.
    pub booked_kundas: u64,
    /// Always `available_kundas + booked_kundas`.
    pub total_kundas: u64,
}

impl RegistryStats {
    /// The subset shown on the public landing page.
    pub fn public(&self) -> PublicStats {
        PublicStats {
            total_users: self.total_users,
            total_bookings: self.total_bookings,
            available_kundas: self.available_kundas,
            approved_bookings: self.approved_bookings,
            total_kundas: self.total_kundas,
        }
    }
}

/// Figures shown on the public landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicStats {
    pub total_users: u64,
    pub total_bookings: u64,
    pub available_kundas: u64,
    pub approved_bookings: u64,
    #[schema(example = 100)]
    pub total_kundas: u64,
}

/// Status and kunda of a user's most recent booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSummary {
    pub booking_code: BookingCode,
    pub status: BookingStatus,
    pub kunda_number: KundaNumber,
}

impl From<&BookingDetails> for BookingSummary {
    fn from(value: &BookingDetails) -> Self {
        Self {
            booking_code: value.booking.code.clone(),
            status: value.booking.status,
            kunda_number: value.kunda_number,
        }
    }
}

/// A user row in the admin listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub user: User,
    /// Bookings made by the user, any status.
    pub booking_count: u64,
    /// Most recent booking, if any.
    pub latest_booking: Option<BookingSummary>,
}

/// Result of looking up a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneSnapshot {
    pub user: User,
    pub latest_booking: Option<BookingSummary>,
}

/// Total kundas as a count.
pub fn total_kundas() -> u64 {
    u64::from(KUNDA_COUNT)
}

/// Statistics and listings for the public page and the admin console.
#[derive(Clone)]
pub struct ReportingService {
    reports: Arc<dyn ReportingRepository>,
    registry: Arc<dyn RegistryRepository>,
}

impl ReportingService {
    /// Reporting over the aggregate queries and the registry.
    pub fn new(reports: Arc<dyn ReportingRepository>, registry: Arc<dyn RegistryRepository>) -> Self {
        Self { reports, registry }
    }

    /// Public counts.
    pub async fn public_stats(&self) -> Result<PublicStats, BookingError> {
        Ok(self.reports.stats().await?.public())
    }

    /// Full counts, for admins.
    pub async fn admin_stats(&self, _admin: &AdminCapability) -> Result<RegistryStats, BookingError> {
        Ok(self.reports.stats().await?)
    }

    /// Every booking, newest first.
    pub async fn list_bookings(
        &self,
        _admin: &AdminCapability,
    ) -> Result<Vec<BookingDetails>, BookingError> {
        Ok(self.reports.list_bookings().await?)
    }

    /// Every user with their booking summary, newest first.
    pub async fn list_users(&self, _admin: &AdminCapability) -> Result<Vec<UserSummary>, BookingError> {
        Ok(self.reports.list_users().await?)
    }

    /// Bookings of the user registered under `phone`; empty when unknown.
    pub async fn bookings_for_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Vec<BookingDetails>, BookingError> {
        Ok(self.reports.bookings_for_phone(phone).await?)
    }

    /// The user behind `phone` and their latest booking, if registered.
    pub async fn phone_snapshot(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<PhoneSnapshot>, BookingError> {
        let Some(user) = self.registry.find_user_by_phone(phone).await? else {
            return Ok(None);
        };
        let bookings = self.reports.bookings_for_phone(phone).await?;
        Ok(Some(PhoneSnapshot {
            user,
            latest_booking: bookings.first().map(BookingSummary::from),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockRegistryRepository, MockReportingRepository};
    use crate::domain::{AdminIdentity, NewUser, RegistrationCode, UserId};
    use chrono::Utc;
    use rstest::rstest;

    fn stats() -> RegistryStats {
        RegistryStats {
            total_users: 4,
            total_bookings: 3,
            pending_bookings: 1,
            approved_bookings: 1,
            rejected_bookings: 1,
            available_kundas: 98,
            booked_kundas: 2,
            total_kundas: total_kundas(),
        }
    }

    fn user() -> User {
        let new_user =
            NewUser::try_from_parts("Asha", "9876543210", "asha@example.com", 2).expect("user");
        User {
            id: UserId::new(1).expect("id"),
            name: new_user.name,
            phone: new_user.phone,
            email: new_user.email,
            members_count: new_user.members,
            registration_id: RegistrationCode::new("GHAAAAAAAA").expect("code"),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn public_stats_hide_admin_counts() {
        let mut reports = MockReportingRepository::new();
        reports.expect_stats().returning(|| Ok(stats()));
        let service = ReportingService::new(Arc::new(reports), Arc::new(MockRegistryRepository::new()));

        let public = service.public_stats().await.expect("stats");
        assert_eq!(public.total_kundas, 100);
        assert_eq!(public.available_kundas, 98);
        assert_eq!(public.approved_bookings, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn admin_stats_keep_every_count() {
        let mut reports = MockReportingRepository::new();
        reports.expect_stats().returning(|| Ok(stats()));
        let service = ReportingService::new(Arc::new(reports), Arc::new(MockRegistryRepository::new()));
        let admin = AdminCapability::grant(AdminIdentity::new("admin"));

        let full = service.admin_stats(&admin).await.expect("stats");
        assert_eq!(full.available_kundas + full.booked_kundas, full.total_kundas);
        assert_eq!(full.pending_bookings, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_phone_has_no_snapshot() {
        let mut registry = MockRegistryRepository::new();
        registry.expect_find_user_by_phone().returning(|_| Ok(None));
        let mut reports = MockReportingRepository::new();
        reports.expect_bookings_for_phone().never();
        let service = ReportingService::new(Arc::new(reports), Arc::new(registry));
        let phone = PhoneNumber::new("0000000000").expect("phone");

        assert_eq!(service.phone_snapshot(&phone).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn registered_phone_without_bookings_has_empty_summary() {
        let mut registry = MockRegistryRepository::new();
        registry.expect_find_user_by_phone().returning(|_| Ok(Some(user())));
        let mut reports = MockReportingRepository::new();
        reports.expect_bookings_for_phone().returning(|_| Ok(Vec::new()));
        let service = ReportingService::new(Arc::new(reports), Arc::new(registry));
        let phone = PhoneNumber::new("9876543210").expect("phone");

        let snapshot = service
            .phone_snapshot(&phone)
            .await
            .expect("lookup")
            .expect("registered");
        assert_eq!(snapshot.user.phone, phone);
        assert!(snapshot.latest_booking.is_none());
    }
}
