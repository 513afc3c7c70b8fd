//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case::invalid(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::forbidden(Error::forbidden("admin disabled"), ErrorCode::Forbidden)]
#[case::conflict(Error::conflict("duplicate"), ErrorCode::Conflict)]
#[case::unavailable(Error::service_unavailable("store down"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn new_substitutes_a_message_when_blank() {
    let error = Error::new(ErrorCode::ServiceUnavailable, "");
    assert_eq!(error.message(), "service unavailable");
}

#[rstest]
fn try_with_trace_id_rejects_blank_values() {
    let result = Error::internal("boom").try_with_trace_id(" ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[tokio::test]
async fn captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_and_omits_empty_fields() {
    let error = Error::invalid_request("bad").with_trace_id(TRACE_ID);
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "invalid_request",
            "message": "bad",
            "traceId": TRACE_ID,
        })
    );
}

#[rstest]
fn deserialisation_enforces_message_invariant() {
    let payload = json!({ "code": "not_found", "message": "  " });
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err(), "blank messages must be rejected");
}

#[rstest]
fn details_round_trip_through_json() {
    let error = Error::invalid_request("bad").with_details(json!({ "field": "center" }));
    let text = serde_json::to_string(&error).expect("serialise");
    let back: Error = serde_json::from_str(&text).expect("deserialise");
    assert_eq!(back.details(), Some(&json!({ "field": "center" })));
}
