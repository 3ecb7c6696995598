//! Booking requests.
//!
//! ```text
//! POST /api/v1/bookings {"userId":1,"kundaNumber":12}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BookingError, Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::kundas::parse_kunda_number;
use crate::inbound::http::schemas::BookingView;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/bookings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Identifier returned by registration.
    #[schema(example = 1)]
    pub user_id: i64,
    /// Kunda to reserve, 1 to 100.
    #[schema(example = 12, minimum = 1, maximum = 100)]
    pub kunda_number: i64,
}

/// Response body for a created booking.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    /// The new pending booking.
    pub booking: BookingView,
}

/// Reserve a kunda; the booking waits for admin approval.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking pending approval", body = BookingResponse),
        (status = 400, description = "Invalid user id or kunda number", body = Error),
        (status = 404, description = "Unknown user or kunda", body = Error),
        (status = 409, description = "Kunda taken or user already booked", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "requestBooking"
)]
#[post("/bookings")]
pub async fn request_booking(
    state: web::Data<HttpState>,
    payload: web::Json<BookingRequest>,
) -> ApiResult<HttpResponse> {
    let BookingRequest {
        user_id,
        kunda_number,
    } = payload.into_inner();
    let user_id = UserId::new(user_id).map_err(BookingError::from)?;
    let kunda_number = parse_kunda_number(kunda_number, "kundaNumber")?;
    let details = state.allocator.request_booking(user_id, kunda_number).await?;
    Ok(HttpResponse::Created().json(BookingResponse {
        booking: BookingView::from(details),
    }))
}
