//! Tests for the domain error payload.

use super::*;
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = Error::new(ErrorCode::Conflict, "");
    assert_eq!(error.message(), FALLBACK_MESSAGE);
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let trace_id = TraceId::from_uuid(Uuid::nil());
    let error = TraceId::scope(trace_id, async { Error::conflict("taken") }).await;
    assert_eq!(error.trace_id(), Some(Uuid::nil().to_string().as_str()));
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let error = Error::not_found("missing");
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));
}

#[rstest]
fn serialises_trace_id_and_details() {
    let error = Error::conflict("taken")
        .with_trace_id("abc")
        .with_details(json!({ "code": "slot_unavailable" }));
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value["traceId"], "abc");
    assert_eq!(value["details"]["code"], "slot_unavailable");
}

#[rstest]
fn deserialising_blank_message_fails() {
    let result = serde_json::from_value::<Error>(json!({ "code": "conflict", "message": " " }));
    assert!(result.is_err());
}
