//! Kunda listings.
//!
//! ```text
//! GET /api/v1/kundas
//! GET /api/v1/kundas/12
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BookingError, Error, KundaNumber};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::KundaView;
use crate::inbound::http::state::HttpState;

/// Response body for `GET /api/v1/kundas`.
#[derive(Debug, Serialize, ToSchema)]
pub struct KundaList {
    /// All kundas in number order.
    pub kundas: Vec<KundaView>,
}

/// Parse a kunda number from a request, reporting `field` on failure.
pub(crate) fn parse_kunda_number(raw: i64, field: &str) -> Result<KundaNumber, Error> {
    let number = KundaNumber::new(raw)
        .map_err(|err| BookingError::invalid_input(field, err.to_string()))?;
    Ok(number)
}

/// Every kunda in number order, with occupants.
#[utoipa::path(
    get,
    path = "/api/v1/kundas",
    responses(
        (status = 200, description = "All kundas", body = KundaList),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["kundas"],
    operation_id = "listKundas"
)]
#[get("/kundas")]
pub async fn list_kundas(state: web::Data<HttpState>) -> ApiResult<web::Json<KundaList>> {
    let kundas = state.registry.list_kundas().await?;
    Ok(web::Json(KundaList {
        kundas: kundas.into_iter().map(KundaView::from).collect(),
    }))
}

/// A single kunda.
#[utoipa::path(
    get,
    path = "/api/v1/kundas/{number}",
    params(("number" = i64, Path, description = "Kunda number, 1 to 100")),
    responses(
        (status = 200, description = "The kunda", body = KundaView),
        (status = 400, description = "Number out of range", body = Error),
        (status = 404, description = "No such kunda", body = Error)
    ),
    tags = ["kundas"],
    operation_id = "getKunda"
)]
#[get("/kundas/{number}")]
pub async fn get_kunda(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<KundaView>> {
    let number = parse_kunda_number(path.into_inner(), "number")?;
    let listing = state.registry.kunda_by_number(number).await?;
    Ok(web::Json(KundaView::from(listing)))
}
