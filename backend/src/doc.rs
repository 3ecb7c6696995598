//! OpenAPI documentation for the booking API.
//!
//! [`ApiDoc`] registers every handler under `inbound::http` plus the
//! session cookie scheme admin endpoints require. Swagger UI serves it at
//! `/docs` in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, KundaOccupant, PublicStats, RegistryStats, User};
use crate::inbound::http::{admin, bookings, health, kundas, registration, schemas, stats};

/// Adds the admin session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/admin/login.",
            ))),
        );
    }
}

/// OpenAPI document for the booking API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Kunda booking API",
        description = "Registration, kunda booking and admin moderation for a homa event."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        registration::register,
        registration::check_phone,
        registration::user_bookings,
        kundas::list_kundas,
        kundas::get_kunda,
        bookings::request_booking,
        stats::public_stats,
        admin::login,
        admin::logout,
        admin::booking_action,
        admin::admin_stats,
        admin::admin_bookings,
        admin::admin_users,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        KundaOccupant,
        PublicStats,
        RegistryStats,
        schemas::BookingView,
        schemas::KundaView,
        schemas::UserSummaryView,
        schemas::MessageResponse,
    )),
    tags(
        (name = "registration", description = "Attendee registration and lookups"),
        (name = "kundas", description = "Kunda availability"),
        (name = "bookings", description = "Kunda reservations"),
        (name = "stats", description = "Public statistics"),
        (name = "admin", description = "Admin session and moderation"),
        (name = "health", description = "Health checks for orchestrators")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/register",
            "/api/v1/check-phone/{phone}",
            "/api/v1/users/{phone}/bookings",
            "/api/v1/kundas",
            "/api/v1/kundas/{number}",
            "/api/v1/bookings",
            "/api/v1/stats",
            "/api/v1/admin/login",
            "/api/v1/admin/logout",
            "/api/v1/admin/bookings/{action}",
            "/api/v1/admin/stats",
            "/api/v1/admin/bookings",
            "/api/v1/admin/users",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[rstest]
    fn admin_reads_declare_the_cookie_scheme() {
        let json = serde_json::to_value(ApiDoc::openapi()).expect("serialise openapi");
        let security = &json["paths"]["/api/v1/admin/stats"]["get"]["security"];
        assert!(security[0].get("SessionCookie").is_some());
        assert!(json["components"]["securitySchemes"]["SessionCookie"].is_object());
    }

    #[rstest]
    fn error_schema_is_registered() {
        let json = serde_json::to_value(ApiDoc::openapi()).expect("serialise openapi");
        assert!(json["components"]["schemas"]["Error"].is_object());
    }
}
