//! Public registry statistics.

use actix_web::{get, web};

use crate::domain::{Error, PublicStats};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Headline figures for the landing page.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Registry statistics", body = PublicStats),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["stats"],
    operation_id = "publicStats"
)]
#[get("/stats")]
pub async fn public_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<PublicStats>> {
    Ok(web::Json(state.reporting.public_stats().await?))
}
