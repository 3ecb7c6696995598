//! Externally visible registration and booking codes.
//!
//! Both codes are a two-letter prefix followed by eight characters from
//! `A-Z0-9`: `GH` for registrations, `BK` for bookings.

use serde::Serialize;

/// Characters a code suffix may contain.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Number of characters after the prefix.
pub const CODE_SUFFIX_LEN: usize = 8;

/// Validation errors for externally supplied codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeValidationError {
    #[error("code must start with {expected}")]
    WrongPrefix { expected: &'static str },
    #[error("code must have 8 characters after the prefix")]
    WrongLength,
    #[error("code may only contain A-Z and 0-9")]
    InvalidCharacter,
}

fn validate_code(raw: &str, prefix: &'static str) -> Result<String, CodeValidationError> {
    let candidate = raw.trim().to_ascii_uppercase();
    let suffix = candidate
        .strip_prefix(prefix)
        .ok_or(CodeValidationError::WrongPrefix { expected: prefix })?;
    if suffix.len() != CODE_SUFFIX_LEN {
        return Err(CodeValidationError::WrongLength);
    }
    if !suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
        return Err(CodeValidationError::InvalidCharacter);
    }
    Ok(candidate)
}

macro_rules! define_code {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix every code of this kind starts with.
            pub const PREFIX: &'static str = $prefix;

            /// Validate a code supplied from outside, accepting any letter case.
            pub fn new(raw: &str) -> Result<Self, CodeValidationError> {
                validate_code(raw, Self::PREFIX).map(Self)
            }

            /// Build a code from a generated suffix.
            pub fn from_suffix(suffix: &str) -> Result<Self, CodeValidationError> {
                Self::new(&format!("{}{suffix}", Self::PREFIX))
            }

            /// Canonical upper-case form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_code!(
    /// Code handed to a user on registration, e.g. `GH7K2M9Q4D`.
    RegistrationCode,
    "GH"
);

define_code!(
    /// Code identifying a booking to users and admins, e.g. `BK0A1B2C3D`.
    BookingCode,
    "BK"
);
