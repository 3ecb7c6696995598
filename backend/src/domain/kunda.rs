//! The fixed pool of numbered kundas (slots).

use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;

use super::{PersonName, RegistrationCode, UserId};

/// Number of kundas created at bootstrap.
pub const KUNDA_COUNT: u16 = 100;

/// Reasons a kunda value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KundaValidationError {
    #[error("kunda number must be between 1 and 100")]
    OutOfRange,
    #[error("kunda id must be positive")]
    InvalidId,
    #[error("unknown kunda status: {0}")]
    UnknownStatus(String),
    #[error("kunda {number} is {status} but booked_by is {occupant}")]
    InconsistentOccupant {
        number: u16,
        status: &'static str,
        occupant: &'static str,
    },
}

/// Storage-assigned kunda identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KundaId(i64);

impl KundaId {
    /// Wrap a positive database identifier.
    pub fn new(raw: i64) -> Result<Self, KundaValidationError> {
        if raw < 1 {
            return Err(KundaValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// Kunda number in `1..=100`.
///
/// # Examples
/// ```
/// use kunda_backend::domain::KundaNumber;
///
/// assert_eq!(KundaNumber::new(12).unwrap().get(), 12);
/// assert!(KundaNumber::new(0).is_err());
/// assert!(KundaNumber::new(101).is_err());
/// assert_eq!(KundaNumber::all().count(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct KundaNumber(u16);

impl KundaNumber {
    /// Check that `raw` lies in `1..=100`.
    pub fn new(raw: i64) -> Result<Self, KundaValidationError> {
        u16::try_from(raw)
            .ok()
            .filter(|n| (1..=KUNDA_COUNT).contains(n))
            .map(Self)
            .ok_or(KundaValidationError::OutOfRange)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Every valid kunda number in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=KUNDA_COUNT).map(Self)
    }
}

impl std::fmt::Display for KundaNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupancy of a kunda. Approval lives on the booking, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KundaStatus {
    Available,
    Booked,
}

impl KundaStatus {
    /// Stored and wire form of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
        }
    }
}

impl FromStr for KundaStatus {
    type Err = KundaValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "booked" => Ok(Self::Booked),
            other => Err(KundaValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// A kunda and its occupancy.
///
/// ## Invariants
/// - `booked_by` is present exactly when `status` is [`KundaStatus::Booked`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kunda {
    id: KundaId,
    number: KundaNumber,
    booked_by: Option<UserId>,
}

impl Kunda {
    /// A kunda nobody holds.
    pub fn available(id: KundaId, number: KundaNumber) -> Self {
        Self {
            id,
            number,
            booked_by: None,
        }
    }

    /// A kunda held by `user`.
    pub fn booked(id: KundaId, number: KundaNumber, user: UserId) -> Self {
        Self {
            id,
            number,
            booked_by: Some(user),
        }
    }

    /// Rebuild a kunda from stored columns, checking the occupancy invariant.
    pub fn from_parts(
        id: KundaId,
        number: KundaNumber,
        status: KundaStatus,
        booked_by: Option<UserId>,
    ) -> Result<Self, KundaValidationError> {
        match (status, booked_by) {
            (KundaStatus::Available, None) => Ok(Self::available(id, number)),
            (KundaStatus::Booked, Some(user)) => Ok(Self::booked(id, number, user)),
            (status, occupant) => Err(KundaValidationError::InconsistentOccupant {
                number: number.get(),
                status: status.as_str(),
                occupant: if occupant.is_some() { "set" } else { "empty" },
            }),
        }
    }

    pub fn id(&self) -> KundaId {
        self.id
    }

    pub fn number(&self) -> KundaNumber {
        self.number
    }

    /// Derived from whether an occupant is set.
    pub fn status(&self) -> KundaStatus {
        if self.booked_by.is_some() {
            KundaStatus::Booked
        } else {
            KundaStatus::Available
        }
    }

    /// Occupying user, if any.
    pub fn booked_by(&self) -> Option<UserId> {
        self.booked_by
    }

    /// Whether nobody holds the kunda.
    pub fn is_available(&self) -> bool {
        self.booked_by.is_none()
    }

    /// Mark the kunda as held by `user`.
    pub fn occupy(&mut self, user: UserId) {
        self.booked_by = Some(user);
    }

    /// Return the kunda to the available pool.
    pub fn release(&mut self) {
        self.booked_by = None;
    }
}

/// Public details of whoever holds a booked kunda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KundaOccupant {
    /// Occupant's name.
    #[schema(value_type = String)]
    pub name: PersonName,
    /// Occupant's registration id.
    #[schema(value_type = String)]
    pub registration_id: RegistrationCode,
}

/// A kunda annotated with its occupant, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KundaListing {
    pub kunda: Kunda,
    /// Who holds the kunda, when booked.
    pub occupant: Option<KundaOccupant>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ids() -> (KundaId, KundaNumber, UserId) {
        (
            KundaId::new(7).expect("id"),
            KundaNumber::new(7).expect("number"),
            UserId::new(3).expect("user"),
        )
    }

    #[rstest]
    #[case(0)]
    #[case(101)]
    #[case(-1)]
    #[case(65_537)]
    fn numbers_outside_the_pool_are_rejected(#[case] raw: i64) {
        assert_eq!(KundaNumber::new(raw), Err(KundaValidationError::OutOfRange));
    }

    #[rstest]
    fn all_covers_one_to_one_hundred() {
        let numbers: Vec<u16> = KundaNumber::all().map(KundaNumber::get).collect();
        assert_eq!(numbers.first(), Some(&1));
        assert_eq!(numbers.last(), Some(&100));
        assert_eq!(numbers.len(), usize::from(KUNDA_COUNT));
    }

    #[rstest]
    fn occupy_and_release_toggle_status() {
        let (id, number, user) = ids();
        let mut kunda = Kunda::available(id, number);
        kunda.occupy(user);
        assert_eq!(kunda.status(), KundaStatus::Booked);
        assert_eq!(kunda.booked_by(), Some(user));
        kunda.release();
        assert_eq!(kunda.status(), KundaStatus::Available);
        assert!(kunda.booked_by().is_none());
    }

    #[rstest]
    #[case(KundaStatus::Available, true)]
    #[case(KundaStatus::Booked, false)]
    fn from_parts_rejects_inconsistent_rows(#[case] status: KundaStatus, #[case] with_user: bool) {
        let (id, number, user) = ids();
        let occupant = with_user.then_some(user);
        assert!(Kunda::from_parts(id, number, status, occupant).is_err());
    }

    #[rstest]
    fn status_parses_from_storage_text() {
        assert_eq!("booked".parse::<KundaStatus>(), Ok(KundaStatus::Booked));
        assert!("approved".parse::<KundaStatus>().is_err());
    }
}
