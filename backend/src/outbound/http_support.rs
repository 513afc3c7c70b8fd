//! Response handling shared by the reqwest discovery adapters.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::domain::ports::PoiDiscoverySourceError;

pub(crate) fn map_transport_error(error: reqwest::Error) -> PoiDiscoverySourceError {
    if error.is_timeout() {
        PoiDiscoverySourceError::timeout(error.to_string())
    } else {
        PoiDiscoverySourceError::transport(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> PoiDiscoverySourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => PoiDiscoverySourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PoiDiscoverySourceError::timeout(message)
        }
        _ => PoiDiscoverySourceError::rejected(message),
    }
}

/// Decode a JSON body from `response`, failing on non-success statuses.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, PoiDiscoverySourceError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    decode_json(provider, body.as_ref())
}

pub(crate) fn decode_json<T: DeserializeOwned>(
    provider: &str,
    body: &[u8],
) -> Result<T, PoiDiscoverySourceError> {
    serde_json::from_slice(body).map_err(|error| {
        PoiDiscoverySourceError::decode(format!("invalid {provider} JSON payload: {error}"))
    })
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
