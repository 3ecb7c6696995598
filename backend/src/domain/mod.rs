//! Domain primitives, rules and services of the kunda booking core.
//!
//! Public surface:
//! - Value types: [`User`], [`Kunda`], [`Booking`] and their identifiers.
//! - Rules: [`evaluate_reservation`] and [`plan_transition`], the pure
//!   decisions storage adapters run inside their critical sections.
//! - Services: [`RegistryService`], [`BookingAllocator`],
//!   [`ApprovalService`], [`ReportingService`], [`AdminAuthService`].
//! - Errors: [`BookingError`] for classified failures and the transport
//!   agnostic [`Error`] payload it converts into.

pub mod allocation;
pub mod approval;
pub mod auth;
pub mod booking;
pub mod booking_error;
pub mod codes;
pub mod error;
pub mod kunda;
pub mod ports;
pub mod registry;
pub mod reporting;
pub mod trace_id;
pub mod user;

pub use self::allocation::{
    BookingAllocator, MAX_CODE_ATTEMPTS, PriorBooking, RebookingPolicy, ReservationRequest,
    evaluate_reservation,
};
pub use self::approval::ApprovalService;
pub use self::auth::{
    AdminAuthConfig, AdminAuthMode, AdminAuthService, AdminCapability, AdminIdentity, AdminLogin,
    AdminSessionToken, LoginCredentials, LoginValidationError, PasswordDigest,
};
pub use self::booking::{
    AdminAction, AdminNotes, Booking, BookingDetails, BookingId, BookingStatus, TransitionOutcome,
    TransitionPlan, plan_transition,
};
pub use self::booking_error::BookingError;
pub use self::codes::{BookingCode, CODE_ALPHABET, CODE_SUFFIX_LEN, CodeValidationError, RegistrationCode};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::kunda::{
    KUNDA_COUNT, Kunda, KundaId, KundaListing, KundaNumber, KundaOccupant, KundaStatus,
    KundaValidationError,
};
pub use self::registry::{BootstrapReport, BootstrapSeed, RegistryService};
pub use self::reporting::{
    BookingSummary, PhoneSnapshot, PublicStats, RegistryStats, ReportingService, UserSummary,
    total_kundas,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, MembersCount, NewUser, PersonName, PhoneNumber, User, UserId,
    UserValidationError,
};
