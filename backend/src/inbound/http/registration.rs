//! Attendee registration and phone lookups.
//!
//! ```text
//! POST /api/v1/register {"name":"Asha Rao","phone":"9876543210","email":"asha@example.com","members":4}
//! GET  /api/v1/check-phone/9876543210
//! GET  /api/v1/users/9876543210/bookings
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BookingError, BookingStatus, Error, NewUser, PhoneNumber, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::BookingList;
use crate::inbound::http::state::HttpState;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Full name.
    #[schema(example = "Asha Rao")]
    pub name: String,
    /// Ten-digit mobile number.
    #[schema(example = "9876543210")]
    pub phone: String,
    #[schema(example = "asha@example.com")]
    pub email: String,
    /// Party size.
    #[schema(example = 4)]
    pub members: i64,
}

impl TryFrom<RegisterRequest> for NewUser {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let user = NewUser::try_from_parts(&value.name, &value.phone, &value.email, value.members)
            .map_err(BookingError::from)?;
        Ok(user)
    }
}

/// Response body for a new registration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Public registration id, repeated for convenience.
    #[schema(example = "GH7K2M9Q4D")]
    pub registration_id: String,
    pub user: User,
}

/// Register an attendee.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid field", body = Error),
        (status = 409, description = "Phone already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["registration"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let new_user = NewUser::try_from(payload.into_inner())?;
    let user = state.registry.register(&new_user).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        registration_id: user.registration_id.as_str().to_owned(),
        user,
    }))
}

fn parse_phone(raw: &str) -> Result<PhoneNumber, Error> {
    let phone = PhoneNumber::new(raw).map_err(BookingError::from)?;
    Ok(phone)
}

/// Whether a phone number is registered and what it has booked.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCheckResponse {
    /// Whether the phone is registered.
    pub exists: bool,
    pub user: Option<User>,
    /// Public id of the user's latest booking.
    pub booking_id: Option<String>,
    pub booking_status: Option<BookingStatus>,
    pub kunda_number: Option<u16>,
}

impl PhoneCheckResponse {
    fn absent() -> Self {
        Self {
            exists: false,
            user: None,
            booking_id: None,
            booking_status: None,
            kunda_number: None,
        }
    }
}

/// Look up a phone number.
#[utoipa::path(
    get,
    path = "/api/v1/check-phone/{phone}",
    params(("phone" = String, Path, description = "Ten-digit phone number")),
    responses(
        (status = 200, description = "Lookup result", body = PhoneCheckResponse),
        (status = 400, description = "Malformed phone number", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["registration"],
    operation_id = "checkPhone"
)]
#[get("/check-phone/{phone}")]
pub async fn check_phone(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PhoneCheckResponse>> {
    let phone = parse_phone(&path.into_inner())?;
    let Some(snapshot) = state.reporting.phone_snapshot(&phone).await? else {
        return Ok(web::Json(PhoneCheckResponse::absent()));
    };
    let latest = snapshot.latest_booking;
    Ok(web::Json(PhoneCheckResponse {
        exists: true,
        user: Some(snapshot.user),
        booking_id: latest.as_ref().map(|b| b.booking_code.as_str().to_owned()),
        booking_status: latest.as_ref().map(|b| b.status),
        kunda_number: latest.map(|b| b.kunda_number.get()),
    }))
}

/// Bookings held by the user registered under a phone number.
#[utoipa::path(
    get,
    path = "/api/v1/users/{phone}/bookings",
    params(("phone" = String, Path, description = "Ten-digit phone number")),
    responses(
        (status = 200, description = "Bookings, newest first", body = BookingList),
        (status = 400, description = "Malformed phone number", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["registration"],
    operation_id = "userBookings"
)]
#[get("/users/{phone}/bookings")]
pub async fn user_bookings(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingList>> {
    let phone = parse_phone(&path.into_inner())?;
    let bookings = state.reporting.bookings_for_phone(&phone).await?;
    Ok(web::Json(BookingList::from_details(bookings)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{KundaNumber, UserId};
    use crate::inbound::http::test_utils::bootstrapped_state;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api/v1")
                .service(register)
                .service(check_phone)
                .service(user_bookings),
        )
    }

    fn registration(phone: &str) -> Value {
        json!({
            "name": "Asha Rao",
            "phone": phone,
            "email": "Asha@Example.com",
            "members": 4
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn register_returns_created_user() {
        let app = actix_test::init_service(test_app(bootstrapped_state().await)).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(registration("9876543210"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: Value = actix_test::read_body_json(res).await;
        let code = body["registrationId"].as_str().expect("registration id");
        assert!(code.starts_with("GH"));
        assert_eq!(body["user"]["registrationId"], code);
        assert_eq!(body["user"]["phone"], "9876543210");
        assert_eq!(body["user"]["email"], "asha@example.com");
        assert_eq!(body["user"]["membersCount"], 4);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_phone_conflicts() {
        let app = actix_test::init_service(test_app(bootstrapped_state().await)).await;
        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(registration("9876543210"))
                .to_request();
            assert_eq!(actix_test::call_service(&app, req).await.status(), expected);
        }
    }

    #[rstest]
    #[case("12345", "phone")]
    #[case("abcdefghij", "phone")]
    #[actix_web::test]
    async fn invalid_fields_are_rejected(#[case] phone: &str, #[case] field: &str) {
        let app = actix_test::init_service(test_app(bootstrapped_state().await)).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(registration(phone))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn zero_members_is_rejected() {
        let app = actix_test::init_service(test_app(bootstrapped_state().await)).await;
        let mut body = registration("9876543210");
        body["members"] = json!(0);
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(body)
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn check_phone_reports_absent_numbers() {
        let app = actix_test::init_service(test_app(bootstrapped_state().await)).await;
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/check-phone/9000000000")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["exists"], false);
        assert_eq!(body["user"], Value::Null);
    }

    #[rstest]
    #[actix_web::test]
    async fn check_phone_includes_booking_state() {
        let state = bootstrapped_state().await;
        let new_user = NewUser::try_from_parts("Ravi", "9123456780", "ravi@example.com", 2)
            .expect("valid user");
        let user = state.registry.register(&new_user).await.expect("register");
        state
            .allocator
            .request_booking(user.id, KundaNumber::new(5).expect("number"))
            .await
            .expect("book");
        let app = actix_test::init_service(test_app(state)).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/check-phone/9123456780")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["exists"], true);
        assert_eq!(body["user"]["name"], "Ravi");
        assert_eq!(body["bookingStatus"], "pending");
        assert_eq!(body["kundaNumber"], 5);

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/users/9123456780/bookings")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        let bookings = body["bookings"].as_array().expect("bookings array");
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0]["kundaNumber"], 5);
        assert_eq!(bookings[0]["user"]["id"], UserId::get(user.id));
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_phone_in_path_is_rejected() {
        let app = actix_test::init_service(test_app(bootstrapped_state().await)).await;
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/users/12ab/bookings")
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}
