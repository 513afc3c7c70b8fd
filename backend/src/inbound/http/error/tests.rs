//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error() -> Error {
    Error::internal("connection refused by 10.0.0.5")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"dsn": "postgres://secret"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("admin mode is disabled"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("no key"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn render(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, header, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error: Error) {
    let (status, header, payload) = render(&internal_error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn validation_details_reach_the_client() {
    let error = Error::invalid_request("import request has 1 invalid field(s)")
        .with_details(json!({"issues": [{"field": "radiusMeters"}]}));

    let (status, header, payload) = render(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none(), "no trace id outside a request scope");
    assert_eq!(payload.details(), error.details());
}

#[test]
fn invalid_body_keeps_the_extractor_reason() {
    let err = actix_web::error::ErrorBadRequest("missing field `center`");

    let mapped = invalid_body(&err);

    assert_eq!(mapped.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        mapped.details(),
        Some(&json!({"reason": "missing field `center`"}))
    );
}
