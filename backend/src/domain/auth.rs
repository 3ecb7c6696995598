//! Admin access gate.
//!
//! Login checks credentials against the configured [`AdminAuthMode`] and
//! issues an opaque server-side session token. Each admin request resolves
//! its token back into an [`AdminCapability`], which the approval and
//! admin-reporting services demand as a parameter.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::BookingError;
use super::ports::{AdminCredentialRepository, AdminSessionStore};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

impl From<LoginValidationError> for BookingError {
    fn from(value: LoginValidationError) -> Self {
        let field = match value {
            LoginValidationError::EmptyUsername => "username",
            LoginValidationError::EmptyPassword => "password",
        };
        Self::invalid_input(field, value.to_string())
    }
}

/// Validated admin login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and kept verbatim; it is zeroed on drop.
///
/// # Examples
/// ```
/// use kunda_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "secret").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Trim and check a login payload.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password exactly as submitted.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// How admin credentials are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAuthMode {
    /// Any non-blank username with the configured admin password.
    #[default]
    SharedSecret,
    /// Username must exist in `admin_users` and the password digest match.
    StoredCredentials,
}

impl AdminAuthMode {
    /// Setting value naming this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SharedSecret => "shared_secret",
            Self::StoredCredentials => "stored_credentials",
        }
    }
}

impl FromStr for AdminAuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared_secret" => Ok(Self::SharedSecret),
            "stored_credentials" => Ok(Self::StoredCredentials),
            other => Err(format!(
                "unknown admin auth mode '{other}'; expected shared_secret|stored_credentials"
            )),
        }
    }
}

/// Lower-case hex SHA-256 digest of an admin password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Digest a plaintext password.
    ///
    /// # Examples
    /// ```
    /// use kunda_backend::domain::PasswordDigest;
    ///
    /// let digest = PasswordDigest::of("secret");
    /// assert!(digest.matches("secret"));
    /// assert!(!digest.matches("Secret"));
    /// ```
    pub fn of(password: &str) -> Self {
        Self(hex::encode(Sha256::digest(password.as_bytes())))
    }

    /// Wrap a digest read from storage.
    pub fn from_hex(stored: impl Into<String>) -> Self {
        Self(stored.into().trim().to_ascii_lowercase())
    }

    /// Lower-case hex form stored in `admin_users`.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Whether `password` hashes to this digest.
    pub fn matches(&self, password: &str) -> bool {
        let candidate = Self::of(password);
        // Compare every byte regardless of where the first mismatch is.
        self.0.len() == candidate.0.len()
            && self
                .0
                .bytes()
                .zip(candidate.0.bytes())
                .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminIdentity {
    username: String,
}

impl AdminIdentity {
    /// Identity for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Opaque token naming a server-side admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdminSessionToken(Uuid);

impl AdminSessionToken {
    /// Fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token read back from a cookie; `None` when malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for AdminSessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that the caller holds a live admin session.
///
/// Only [`AdminAuthService::authorize`] can mint one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCapability {
    identity: AdminIdentity,
}

impl AdminCapability {
    pub(crate) fn grant(identity: AdminIdentity) -> Self {
        Self { identity }
    }

    /// Admin the capability was granted to.
    pub fn identity(&self) -> &AdminIdentity {
        &self.identity
    }
}

/// Successful login: who logged in and the session token to hand back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminLogin {
    /// Who logged in.
    pub identity: AdminIdentity,
    /// Token to store in the session cookie.
    pub token: AdminSessionToken,
}

/// Checks admin credentials and manages admin sessions.
#[derive(Clone)]
pub struct AdminAuthService {
    mode: AdminAuthMode,
    shared_secret: Arc<Zeroizing<String>>,
    credentials: Arc<dyn AdminCredentialRepository>,
    sessions: Arc<dyn AdminSessionStore>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

/// Construction parameters for [`AdminAuthService`].
pub struct AdminAuthConfig {
    /// How credentials are checked.
    pub mode: AdminAuthMode,
    /// Password accepted in `shared_secret` mode.
    pub shared_secret: Zeroizing<String>,
    /// Lifetime of an issued session.
    pub session_ttl: Duration,
}

impl AdminAuthService {
    /// Access gate over the credential repository and session store.
    pub fn new(
        config: AdminAuthConfig,
        credentials: Arc<dyn AdminCredentialRepository>,
        sessions: Arc<dyn AdminSessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            mode: config.mode,
            shared_secret: Arc::new(config.shared_secret),
            credentials,
            sessions,
            clock,
            session_ttl: config.session_ttl,
        }
    }

    /// Configured authentication mode.
    pub fn mode(&self) -> AdminAuthMode {
        self.mode
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AdminLogin, BookingError> {
        if !self.verify(credentials).await? {
            warn!(
                username = credentials.username(),
                mode = self.mode.as_str(),
                "admin login rejected"
            );
            return Err(BookingError::unauthorized());
        }
        let identity = AdminIdentity::new(credentials.username());
        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| BookingError::storage_failure("admin session expiry out of range"))?;
        let token = self.sessions.issue(&identity, now, expires_at).await?;
        info!(username = identity.username(), %expires_at, "admin logged in");
        Ok(AdminLogin { identity, token })
    }

    async fn verify(&self, credentials: &LoginCredentials) -> Result<bool, BookingError> {
        match self.mode {
            AdminAuthMode::SharedSecret => {
                Ok(PasswordDigest::of(self.shared_secret.as_str()).matches(credentials.password()))
            }
            AdminAuthMode::StoredCredentials => Ok(self
                .credentials
                .password_digest(credentials.username())
                .await?
                .is_some_and(|digest| digest.matches(credentials.password()))),
        }
    }

    /// Resolve a session token into an admin capability.
    pub async fn authorize(&self, token: &AdminSessionToken) -> Result<AdminCapability, BookingError> {
        self.sessions
            .resolve(token, self.clock.utc())
            .await?
            .map(AdminCapability::grant)
            .ok_or_else(BookingError::unauthorized)
    }

    /// Revoke a session token.
    pub async fn logout(&self, token: &AdminSessionToken) -> Result<(), BookingError> {
        self.sessions.revoke(token).await?;
        info!("admin session revoked");
        Ok(())
    }
}
