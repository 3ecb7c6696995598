//! Port for stored admin credentials.

use async_trait::async_trait;

use crate::domain::{BookingError, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Failures reading admin credentials.
    pub enum AdminCredentialError {
        Connection { message: String } => "credential store connection failed: {message}",
        Query { message: String } => "credential store query failed: {message}",
    }
}

impl From<AdminCredentialError> for BookingError {
    fn from(value: AdminCredentialError) -> Self {
        match value {
            AdminCredentialError::Connection { message } => Self::storage_unavailable(message),
            AdminCredentialError::Query { message } => Self::storage_failure(message),
        }
    }
}

/// Read access to seeded admin credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminCredentialRepository: Send + Sync {
    /// Stored password digest for `username`, if the admin exists.
    async fn password_digest(
        &self,
        username: &str,
    ) -> Result<Option<PasswordDigest>, AdminCredentialError>;
}
