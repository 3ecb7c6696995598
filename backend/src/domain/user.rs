//! Registered attendees.
//!
//! Incoming registration fields are normalised and validated here so the
//! rest of the domain only ever sees well-formed values.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::RegistrationCode;

/// Required length of a phone number, in ASCII digits.
pub const PHONE_DIGITS: usize = 10;
/// Upper bound on a display name, in characters.
pub const NAME_MAX: usize = 100;
/// Upper bound on an email address, in characters.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised while building registration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("phone must be exactly 10 digits")]
    InvalidPhone,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must look like name@domain")]
    InvalidEmail,
    #[error("members must be a positive integer")]
    InvalidMembers,
    #[error("user id must be positive")]
    InvalidUserId,
}

impl UserValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::InvalidPhone => "phone",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::InvalidMembers => "members",
            Self::InvalidUserId => "userId",
        }
    }
}

/// Storage-assigned numeric user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        if raw < 1 {
            return Err(UserValidationError::InvalidUserId);
        }
        Ok(Self(raw))
    }

    /// Raw numeric value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phone number: exactly ten ASCII digits, the natural lookup key.
///
/// # Examples
/// ```
/// use kunda_backend::domain::PhoneNumber;
///
/// let phone = PhoneNumber::new(" 9876543210 ").unwrap();
/// assert_eq!(phone.as_str(), "9876543210");
/// assert!(PhoneNumber::new("12345").is_err());
/// assert!(PhoneNumber::new("abcdefghij").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Trim and validate a raw phone number.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() != PHONE_DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UserValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name shown to admins and on occupied kundas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Trim and require a non-blank name.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contact email, stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trim, lower-case and require an `@` with text on both sides.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let well_formed = normalised.chars().count() <= EMAIL_MAX
            && !normalised.chars().any(char::is_whitespace)
            && matches!(
                normalised.split_once('@'),
                Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            );
        if !well_formed {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Party size attending with the registrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MembersCount(u16);

impl MembersCount {
    /// Accept any value in `1..=u16::MAX`.
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        u16::try_from(raw)
            .ok()
            .filter(|value| *value >= 1)
            .map(Self)
            .ok_or(UserValidationError::InvalidMembers)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: PersonName,
    pub phone: PhoneNumber,
    pub email: EmailAddress,
    /// Party size, at least one.
    pub members: MembersCount,
}

impl NewUser {
    /// Validate raw registration fields, reporting the first failure.
    ///
    /// # Examples
    /// ```
    /// use kunda_backend::domain::NewUser;
    ///
    /// let user = NewUser::try_from_parts(" Asha ", "9876543210", " Asha@Example.COM ", 4).unwrap();
    /// assert_eq!(user.name.as_str(), "Asha");
    /// assert_eq!(user.email.as_str(), "asha@example.com");
    /// ```
    pub fn try_from_parts(
        name: &str,
        phone: &str,
        email: &str,
        members: i64,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: PersonName::new(name)?,
            phone: PhoneNumber::new(phone)?,
            email: EmailAddress::new(email)?,
            members: MembersCount::new(members)?,
        })
    }
}

/// A registered attendee. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = i64, example = 1)]
    pub id: UserId,
    #[schema(value_type = String, example = "Asha Rao")]
    pub name: PersonName,
    #[schema(value_type = String, example = "9876543210")]
    pub phone: PhoneNumber,
    #[schema(value_type = String, example = "asha@example.com")]
    pub email: EmailAddress,
    /// Number of people attending.
    #[schema(value_type = u16, example = 4)]
    pub members_count: MembersCount,
    /// Public registration id.
    #[schema(value_type = String, example = "GH7K2M9Q4D")]
    pub registration_id: RegistrationCode,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}
