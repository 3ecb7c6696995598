//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use chrono::Duration;

use crate::inbound::http::session_config::SessionSettings;

/// Everything the listener and session middleware need.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) session_ttl: Duration,
}

impl ServerConfig {
    /// Combine validated session settings with the listen address and session lifetime.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, session_ttl: Duration) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            session_ttl,
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
