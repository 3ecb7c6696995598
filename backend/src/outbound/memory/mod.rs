//! In-process storage adapter.
//!
//! [`InMemoryRegistry`] keeps users, kundas, bookings and admin credentials
//! behind a single mutex. Every port operation runs as one critical section,
//! so allocation checks and writes never interleave. State is lost on
//! restart; the adapter backs local runs without Postgres and the HTTP
//! integration tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AdminCredentialError, AdminCredentialRepository, BookingLedger, BookingLedgerError,
    RegistryRepository, RegistryRepositoryError, ReportingRepository, ReportingRepositoryError,
    TransitionRequest,
};
use crate::domain::{
    Booking, BookingDetails, BookingError, BookingId, BookingStatus, BookingSummary,
    BootstrapReport, BootstrapSeed, Kunda, KundaId, KundaListing, KundaNumber, KundaOccupant,
    NewUser, PasswordDigest, PhoneNumber, PriorBooking, RegistrationCode, RegistryStats,
    ReservationRequest, TransitionOutcome, User, UserId, UserSummary, evaluate_reservation,
    plan_transition,
};


const POISONED: &str = "registry state lock poisoned";

#[derive(Debug, Default)]
struct RegistryState {
    users: Vec<User>,
    kundas: BTreeMap<KundaNumber, Kunda>,
    bookings: Vec<Booking>,
    admins: HashMap<String, PasswordDigest>,
}

/// Next sequential identifier for a collection currently holding `len` rows.
fn next_id(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |n| n.saturating_add(1))
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn newest_first(a: &Booking, b: &Booking) -> std::cmp::Ordering {
    b.booked_at
        .cmp(&a.booked_at)
        .then_with(|| b.id.get().cmp(&a.id.get()))
}

impl RegistryState {
    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    fn user_by_phone(&self, phone: &PhoneNumber) -> Option<&User> {
        self.users.iter().find(|user| &user.phone == phone)
    }

    fn kunda_by_id(&self, id: KundaId) -> Option<&Kunda> {
        self.kundas.values().find(|kunda| kunda.id() == id)
    }

    fn listing(&self, kunda: &Kunda) -> KundaListing {
        let occupant = kunda
            .booked_by()
            .and_then(|id| self.user(id))
            .map(|user| KundaOccupant {
                name: user.name.clone(),
                registration_id: user.registration_id.clone(),
            });
        KundaListing {
            kunda: kunda.clone(),
            occupant,
        }
    }

    fn details(&self, booking: &Booking) -> Option<BookingDetails> {
        let user = self.user(booking.user_id)?.clone();
        let kunda_number = self.kunda_by_id(booking.kunda_id)?.number();
        Some(BookingDetails {
            booking: booking.clone(),
            user,
            kunda_number,
        })
    }

    /// Bookings matching `keep`, newest first, joined with user and kunda.
    fn booking_details(&self, keep: impl Fn(&Booking) -> bool) -> Vec<BookingDetails> {
        let mut bookings: Vec<&Booking> = self.bookings.iter().filter(|b| keep(b)).collect();
        bookings.sort_by(|a, b| newest_first(a, b));
        bookings
            .into_iter()
            .filter_map(|booking| self.details(booking))
            .collect()
    }

    fn stats(&self) -> RegistryStats {
        let with_status =
            |status: BookingStatus| count(self.bookings.iter().filter(|b| b.status == status).count());
        let available = self.kundas.values().filter(|k| k.is_available()).count();
        RegistryStats {
            total_users: count(self.users.len()),
            total_bookings: count(self.bookings.len()),
            pending_bookings: with_status(BookingStatus::Pending),
            approved_bookings: with_status(BookingStatus::Approved),
            rejected_bookings: with_status(BookingStatus::Rejected),
            available_kundas: count(available),
            booked_kundas: count(self.kundas.len().saturating_sub(available)),
            total_kundas: count(self.kundas.len()),
        }
    }
}

/// Registry, ledger, reporting and credential store held in process memory.
///
/// # Examples
/// ```
/// use kunda_backend::outbound::memory::InMemoryRegistry;
///
/// let registry = InMemoryRegistry::new();
/// # let _ = registry;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }
}

#[async_trait]
impl RegistryRepository for InMemoryRegistry {
    async fn insert_user(
        &self,
        user: &NewUser,
        code: &RegistrationCode,
        created_at: DateTime<Utc>,
    ) -> Result<User, RegistryRepositoryError> {
        let mut state = self.lock().map_err(RegistryRepositoryError::query)?;
        if state.user_by_phone(&user.phone).is_some() {
            return Err(RegistryRepositoryError::duplicate_phone(user.phone.as_str()));
        }
        if state.users.iter().any(|u| &u.registration_id == code) {
            return Err(RegistryRepositoryError::code_collision());
        }
        let id = UserId::new(next_id(state.users.len()))
            .map_err(|err| RegistryRepositoryError::query(err.to_string()))?;
        let created = User {
            id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            members_count: user.members,
            registration_id: code.clone(),
            created_at,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RegistryRepositoryError> {
        let state = self.lock().map_err(RegistryRepositoryError::query)?;
        Ok(state.user(id).cloned())
    }

    async fn find_user_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<User>, RegistryRepositoryError> {
        let state = self.lock().map_err(RegistryRepositoryError::query)?;
        Ok(state.user_by_phone(phone).cloned())
    }

    async fn list_kundas(&self) -> Result<Vec<KundaListing>, RegistryRepositoryError> {
        let state = self.lock().map_err(RegistryRepositoryError::query)?;
        Ok(state.kundas.values().map(|k| state.listing(k)).collect())
    }

    async fn find_kunda(
        &self,
        number: KundaNumber,
    ) -> Result<Option<KundaListing>, RegistryRepositoryError> {
        let state = self.lock().map_err(RegistryRepositoryError::query)?;
        Ok(state.kundas.get(&number).map(|k| state.listing(k)))
    }

    async fn bootstrap(
        &self,
        seed: &BootstrapSeed,
    ) -> Result<BootstrapReport, RegistryRepositoryError> {
        let mut state = self.lock().map_err(RegistryRepositoryError::query)?;
        let mut report = BootstrapReport::default();
        for number in KundaNumber::all() {
            if state.kundas.contains_key(&number) {
                continue;
            }
            let id = KundaId::new(next_id(state.kundas.len()))
                .map_err(|err| RegistryRepositoryError::query(err.to_string()))?;
            state.kundas.insert(number, Kunda::available(id, number));
            report.kundas_created += 1;
        }
        if !state.admins.contains_key(&seed.admin_username) {
            state
                .admins
                .insert(seed.admin_username.clone(), seed.admin_password.clone());
            report.admin_seeded = true;
        }
        Ok(report)
    }
}

#[async_trait]
impl BookingLedger for InMemoryRegistry {
    async fn reserve(
        &self,
        request: &ReservationRequest,
    ) -> Result<BookingDetails, BookingLedgerError> {
        let mut state = self.lock().map_err(BookingLedgerError::query)?;
        let user_exists = state.user(request.user_id).is_some();
        let prior: Vec<PriorBooking> = state
            .bookings
            .iter()
            .filter(|b| b.user_id == request.user_id)
            .map(|b| PriorBooking {
                kunda_id: b.kunda_id,
                status: b.status,
            })
            .collect();
        let kunda_id = evaluate_reservation(
            request,
            user_exists,
            state.kundas.get(&request.kunda_number),
            &prior,
        )?;
        if state.bookings.iter().any(|b| b.code == request.booking_code) {
            return Err(BookingLedgerError::code_collision());
        }

        let id = BookingId::new(next_id(state.bookings.len()))
            .ok_or_else(|| BookingLedgerError::query("booking id overflow"))?;
        let booking = Booking {
            id,
            code: request.booking_code.clone(),
            user_id: request.user_id,
            kunda_id,
            status: BookingStatus::Pending,
            booked_at: request.booked_at,
            approved_at: None,
            admin_notes: None,
        };
        if let Some(kunda) = state.kundas.get_mut(&request.kunda_number) {
            kunda.occupy(request.user_id);
        }
        state.bookings.push(booking.clone());
        state
            .details(&booking)
            .ok_or_else(|| BookingLedgerError::query("reserved booking lost its user or kunda"))
    }

    async fn transition(
        &self,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, BookingLedgerError> {
        let mut state = self.lock().map_err(BookingLedgerError::query)?;
        let RegistryState {
            kundas, bookings, ..
        } = &mut *state;
        let booking = bookings
            .iter_mut()
            .find(|b| b.code == request.booking_code)
            .ok_or_else(|| BookingError::booking_not_found(request.booking_code.as_str()))?;
        let plan = plan_transition(booking, request.action, request.at)?;
        let kunda = kundas
            .values_mut()
            .find(|k| k.id() == booking.kunda_id)
            .ok_or_else(|| BookingLedgerError::query("booking references a missing kunda"))?;

        booking.status = plan.next_status;
        if plan.approved_at.is_some() {
            booking.approved_at = plan.approved_at;
        }
        if let Some(notes) = &request.notes {
            booking.admin_notes = Some(notes.clone());
        }
        let approved_at = booking.approved_at;
        let kunda_released = plan.release.is_some();
        if kunda_released {
            kunda.release();
        }
        Ok(TransitionOutcome {
            booking_code: request.booking_code.clone(),
            action: request.action,
            status: plan.next_status,
            kunda_number: kunda.number(),
            approved_at,
            kunda_released,
        })
    }
}

#[async_trait]
impl ReportingRepository for InMemoryRegistry {
    async fn stats(&self) -> Result<RegistryStats, ReportingRepositoryError> {
        let state = self.lock().map_err(ReportingRepositoryError::query)?;
        Ok(state.stats())
    }

    async fn list_bookings(&self) -> Result<Vec<BookingDetails>, ReportingRepositoryError> {
        let state = self.lock().map_err(ReportingRepositoryError::query)?;
        Ok(state.booking_details(|_| true))
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, ReportingRepositoryError> {
        let state = self.lock().map_err(ReportingRepositoryError::query)?;
        let mut users: Vec<&User> = state.users.iter().collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });
        Ok(users
            .into_iter()
            .map(|user| {
                let bookings = state.booking_details(|b| b.user_id == user.id);
                UserSummary {
                    user: user.clone(),
                    booking_count: count(bookings.len()),
                    latest_booking: bookings.first().map(BookingSummary::from),
                }
            })
            .collect())
    }

    async fn bookings_for_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Vec<BookingDetails>, ReportingRepositoryError> {
        let state = self.lock().map_err(ReportingRepositoryError::query)?;
        let Some(user_id) = state.user_by_phone(phone).map(|user| user.id) else {
            return Ok(Vec::new());
        };
        Ok(state.booking_details(|b| b.user_id == user_id))
    }
}

#[async_trait]
impl AdminCredentialRepository for InMemoryRegistry {
    async fn password_digest(
        &self,
        username: &str,
    ) -> Result<Option<PasswordDigest>, AdminCredentialError> {
        let state = self.lock().map_err(AdminCredentialError::query)?;
        Ok(state.admins.get(username).cloned())
    }
}
