//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie only ever carries the opaque admin session token; identity and
//! expiry live in the server-side session store behind [`AdminAuthService`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AdminAuthService, AdminCapability, AdminSessionToken, BookingError, Error};

pub(crate) const ADMIN_TOKEN_KEY: &str = "admin_token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the admin session token in the cookie.
    pub fn persist_admin(&self, token: &AdminSessionToken) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ADMIN_TOKEN_KEY, token.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The admin token carried by the cookie, if any.
    ///
    /// A value that does not parse as a token is treated as absent.
    pub fn admin_token(&self) -> Result<Option<AdminSessionToken>, Error> {
        let raw = self
            .0
            .get::<String>(ADMIN_TOKEN_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|value| {
            let token = AdminSessionToken::parse(&value);
            if token.is_none() {
                warn!("invalid admin token in session cookie");
            }
            token
        }))
    }

    /// Resolve the cookie into an admin capability or fail with `401`.
    pub async fn require_admin(&self, auth: &AdminAuthService) -> Result<AdminCapability, Error> {
        let token = self.admin_token()?.ok_or_else(BookingError::unauthorized)?;
        Ok(auth.authorize(&token).await?)
    }

    /// Drop every value from the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
