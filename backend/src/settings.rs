//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through a `KUNDA_`-prefixed environment variable,
//! a config file or the command line. Accessors supply the defaults.

use std::net::SocketAddr;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{AdminAuthMode, RebookingPolicy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Invalid values in [`AppSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid {field} '{value}'")]
    InvalidChoice { field: &'static str, value: String },
    #[error("admin_session_ttl_minutes must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {0}")]
    SessionTtl(i64),
    #[error("admin_password must be set")]
    MissingAdminPassword,
}

/// Runtime configuration for the booking server.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KUNDA")]
pub struct AppSettings {
    /// PostgreSQL URL; the in-memory registry is used when absent.
    pub database_url: Option<String>,
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// Shared secret in `shared_secret` mode, seed password otherwise.
    pub admin_password: Option<String>,
    /// Username of the seeded admin row.
    pub admin_username: Option<String>,
    /// `shared_secret` or `stored_credentials`.
    pub admin_auth_mode: Option<String>,
    /// `one_attempt` or `one_active`.
    pub rebooking_policy: Option<String>,
    /// Lifetime of an admin session in minutes.
    #[ortho_config(default = 120)]
    pub admin_session_ttl_minutes: i64,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("bind_addr", &self.bind_addr)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("admin_username", &self.admin_username)
            .field("admin_auth_mode", &self.admin_auth_mode)
            .field("rebooking_policy", &self.rebooking_policy)
            .field("admin_session_ttl_minutes", &self.admin_session_ttl_minutes)
            .field("pool_max_size", &self.pool_max_size)
            .finish()
    }
}

impl AppSettings {
    /// Parsed listen address; `0.0.0.0:8080` by default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Seed admin username; `admin` when blank or unset.
    pub fn admin_username(&self) -> &str {
        self.admin_username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
    }

    /// Admin password; required.
    pub fn admin_password(&self) -> Result<Zeroizing<String>, SettingsError> {
        self.admin_password
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .map(|secret| Zeroizing::new(secret.to_owned()))
            .ok_or(SettingsError::MissingAdminPassword)
    }

    /// Configured auth mode; `shared_secret` by default.
    pub fn admin_auth_mode(&self) -> Result<AdminAuthMode, SettingsError> {
        parse_choice(self.admin_auth_mode.as_deref(), "admin_auth_mode")
    }

    /// Configured rebooking policy; `one_attempt` by default.
    pub fn rebooking_policy(&self) -> Result<RebookingPolicy, SettingsError> {
        parse_choice(self.rebooking_policy.as_deref(), "rebooking_policy")
    }

    /// Admin session lifetime, between one minute and a year.
    pub fn admin_session_ttl(&self) -> Result<Duration, SettingsError> {
        let minutes = self.admin_session_ttl_minutes;
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) {
            return Err(SettingsError::SessionTtl(minutes));
        }
        Duration::try_minutes(minutes).ok_or(SettingsError::SessionTtl(minutes))
    }
}

fn parse_choice<T>(raw: Option<&str>, field: &'static str) -> Result<T, SettingsError>
where
    T: std::str::FromStr + Default,
{
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(T::default()),
        Some(value) => value.parse().map_err(|_| SettingsError::InvalidChoice {
            field,
            value: value.to_owned(),
        }),
    }
}
