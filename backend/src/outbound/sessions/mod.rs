//! Server-side admin session store.
//!
//! The cookie only carries an opaque [`AdminSessionToken`]; identity and
//! expiry live here so revocation takes effect immediately.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{AdminSessionStore, AdminSessionStoreError};
use crate::domain::{AdminIdentity, AdminSessionToken};

const POISONED: &str = "admin session lock poisoned";

#[derive(Debug, Clone)]
struct StoredSession {
    identity: AdminIdentity,
    expires_at: DateTime<Utc>,
}

/// Admin sessions held in process memory. Restarting the server logs every
/// admin out.
#[derive(Debug, Default)]
pub struct InMemoryAdminSessionStore {
    sessions: RwLock<HashMap<AdminSessionToken, StoredSession>>,
}

impl InMemoryAdminSessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminSessionStore for InMemoryAdminSessionStore {
    async fn issue(
        &self,
        identity: &AdminIdentity,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<AdminSessionToken, AdminSessionStoreError> {
        let token = AdminSessionToken::generate();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AdminSessionStoreError::unavailable(POISONED))?;
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            token,
            StoredSession {
                identity: identity.clone(),
                expires_at,
            },
        );
        Ok(token)
    }

    async fn resolve(
        &self,
        token: &AdminSessionToken,
        now: DateTime<Utc>,
    ) -> Result<Option<AdminIdentity>, AdminSessionStoreError> {
        let found = {
            let sessions = self
                .sessions
                .read()
                .map_err(|_| AdminSessionStoreError::unavailable(POISONED))?;
            sessions.get(token).cloned()
        };
        match found {
            Some(session) if session.expires_at > now => Ok(Some(session.identity)),
            Some(_) => {
                self.revoke(token).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &AdminSessionToken) -> Result<(), AdminSessionStoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AdminSessionStoreError::unavailable(POISONED))?;
        sessions.remove(token);
        Ok(())
    }
}
