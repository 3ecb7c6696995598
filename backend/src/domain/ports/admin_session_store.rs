//! Port for server-side admin sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AdminIdentity, AdminSessionToken, BookingError};

use super::define_port_error;

define_port_error! {
    /// Failures of the admin session store.
    pub enum AdminSessionStoreError {
        Unavailable { message: String } => "admin session store unavailable: {message}",
    }
}

impl From<AdminSessionStoreError> for BookingError {
    fn from(value: AdminSessionStoreError) -> Self {
        match value {
            AdminSessionStoreError::Unavailable { message } => Self::storage_failure(message),
        }
    }
}

/// Server-side storage for admin session tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminSessionStore: Send + Sync {
    /// Store a new session for `identity` valid until `expires_at`, dropping
    /// sessions already expired at `now`.
    async fn issue(
        &self,
        identity: &AdminIdentity,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<AdminSessionToken, AdminSessionStoreError>;

    /// Identity behind `token`, or `None` when unknown or expired at `now`.
    async fn resolve(
        &self,
        token: &AdminSessionToken,
        now: DateTime<Utc>,
    ) -> Result<Option<AdminIdentity>, AdminSessionStoreError>;

    /// Forget `token`. Revoking an unknown token is not an error.
    async fn revoke(&self, token: &AdminSessionToken) -> Result<(), AdminSessionStoreError>;
}
