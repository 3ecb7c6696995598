//! Admin session and moderation endpoints.
//!
//! ```text
//! POST /api/v1/admin/login {"username":"admin","password":"..."}
//! POST /api/v1/admin/bookings/approve {"bookingId":"BK7Q2M9X4D","notes":"paid"}
//! GET  /api/v1/admin/stats
//! ```
//!
//! Everything except login requires the session cookie issued by login.

use std::str::FromStr;

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AdminAction, AdminNotes, BookingCode, BookingError, BookingStatus, Error, LoginCredentials,
    RegistryStats,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{BookingList, MessageResponse, UserSummaryView};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/admin/login`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct AdminLoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminLoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminLoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Response body after a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminLoginResponse {
    /// Username the session was opened for.
    #[schema(example = "admin")]
    pub username: String,
}

/// Open an admin session.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AdminLoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank username or password", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogin"
)]
#[post("/admin/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AdminLoginRequest>,
) -> ApiResult<web::Json<AdminLoginResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(BookingError::from)?;
    let admin = state.auth.login(&credentials).await?;
    session.persist_admin(&admin.token)?;
    Ok(web::Json(AdminLoginResponse {
        username: admin.identity.username().to_owned(),
    }))
}

/// Close the admin session. Succeeds when no session is open.
#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogout"
)]
#[post("/admin/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MessageResponse>> {
    if let Some(token) = session.admin_token()? {
        state.auth.logout(&token).await?;
    }
    session.clear();
    Ok(web::Json(MessageResponse::new("Logged out")))
}

/// Request body for `POST /api/v1/admin/bookings/{action}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingActionRequest {
    /// Public booking id, e.g. `BK7F3K9Q2M`.
    #[schema(example = "BK7Q2M9X4D")]
    pub booking_id: String,
    /// Optional notes stored with the decision.
    #[schema(max_length = 500)]
    pub notes: Option<String>,
}

/// Result of an approve or reject action.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingActionResponse {
    /// Human-readable summary.
    pub message: String,
    pub booking_id: String,
    pub status: BookingStatus,
    pub kunda_number: u16,
    pub approved_at: Option<DateTime<Utc>>,
    /// Whether the kunda returned to the pool.
    pub kunda_released: bool,
}

/// Approve or reject a pending booking.
#[utoipa::path(
    post,
    path = "/api/v1/admin/bookings/{action}",
    params(("action" = AdminAction, Path, description = "approve or reject")),
    request_body = BookingActionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = BookingActionResponse),
        (status = 400, description = "Unknown action or invalid notes", body = Error),
        (status = 401, description = "Admin session required", body = Error),
        (status = 404, description = "No such booking", body = Error),
        (status = 409, description = "Booking already decided", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "decideBooking",
    security(("SessionCookie" = []))
)]
#[post("/admin/bookings/{action}")]
pub async fn booking_action(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<BookingActionRequest>,
) -> ApiResult<web::Json<BookingActionResponse>> {
    let admin = session.require_admin(&state.auth).await?;
    let action = AdminAction::from_str(&path.into_inner())?;
    let BookingActionRequest { booking_id, notes } = payload.into_inner();
    let code = BookingCode::new(booking_id.trim())
        .map_err(|_| BookingError::booking_not_found(booking_id.as_str()))?;
    let notes = AdminNotes::parse(notes.as_deref().unwrap_or_default())?;
    let outcome = state
        .approval
        .apply_action(&admin, code, action, notes)
        .await?;
    Ok(web::Json(BookingActionResponse {
        message: format!(
            "Booking {} {}",
            outcome.booking_code.as_str(),
            outcome.status.as_str()
        ),
        booking_id: outcome.booking_code.as_str().to_owned(),
        status: outcome.status,
        kunda_number: outcome.kunda_number.get(),
        approved_at: outcome.approved_at,
        kunda_released: outcome.kunda_released,
    }))
}

/// Full registry statistics.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Registry statistics", body = RegistryStats),
        (status = 401, description = "Admin session required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminStats",
    security(("SessionCookie" = []))
)]
#[get("/admin/stats")]
pub async fn admin_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RegistryStats>> {
    let admin = session.require_admin(&state.auth).await?;
    Ok(web::Json(state.reporting.admin_stats(&admin).await?))
}

/// Every booking, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings",
    responses(
        (status = 200, description = "All bookings", body = BookingList),
        (status = 401, description = "Admin session required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminBookings",
    security(("SessionCookie" = []))
)]
#[get("/admin/bookings")]
pub async fn admin_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<BookingList>> {
    let admin = session.require_admin(&state.auth).await?;
    let bookings = state.reporting.list_bookings(&admin).await?;
    Ok(web::Json(BookingList::from_details(bookings)))
}

/// Response body for `GET /api/v1/admin/users`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<UserSummaryView>,
}

/// Every user, newest first, with booking digests.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "All users", body = UserList),
        (status = 401, description = "Admin session required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUsers",
    security(("SessionCookie" = []))
)]
#[get("/admin/users")]
pub async fn admin_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserList>> {
    let admin = session.require_admin(&state.auth).await?;
    let users = state.reporting.list_users(&admin).await?;
    Ok(web::Json(UserList {
        users: users.into_iter().map(UserSummaryView::from).collect(),
    }))
}
