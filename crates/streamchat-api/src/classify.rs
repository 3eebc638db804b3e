// ── Network error classification ──
//
// Maps a completed transport attempt onto `Result<T, NetworkError>`.
// Transport failures are classified before any status handling; a
// response is then classified by status and, for 2xx, by body decode.
//
// Cancellation is not modelled here: dropping the future is how a caller
// cancels, and the supervising scope in `streamchat-core` discards any
// failure that completes after its token fired.

use std::future::Future;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::NetworkError;

/// Classify a transport-level failure (no usable response).
pub fn classify_transport(err: &reqwest::Error) -> NetworkError {
    if err.is_connect() {
        NetworkError::NoInternet
    } else if err.is_decode() {
        NetworkError::Serialization
    } else if err.is_timeout() {
        NetworkError::RequestTimeout
    } else {
        NetworkError::Unknown
    }
}

/// Classify a non-success status. Returns `None` for 2xx.
pub fn classify_status(status: StatusCode) -> Option<NetworkError> {
    match status.as_u16() {
        200..=299 => None,
        408 => Some(NetworkError::RequestTimeout),
        429 => Some(NetworkError::TooManyRequests),
        500..=599 => Some(NetworkError::ServerError),
        _ => Some(NetworkError::Unknown),
    }
}

/// Decode the body of a 2xx response.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, NetworkError> {
    serde_json::from_slice(body).map_err(|e| {
        let preview = String::from_utf8_lossy(&body[..body.len().min(200)]).into_owned();
        warn!(error = %e, body_preview = %preview, "response body did not match expected shape");
        NetworkError::Serialization
    })
}

/// Convert a received response into a typed result.
pub async fn response_to_result<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, NetworkError> {
    let status = response.status();
    if let Some(err) = classify_status(status) {
        debug!(status = status.as_u16(), kind = err.as_str(), "request failed");
        return Err(err);
    }

    let body = response.bytes().await.map_err(|e| {
        let kind = classify_transport(&e);
        debug!(error = %e, kind = kind.as_str(), "failed to read response body");
        kind
    })?;

    decode_body(&body)
}

/// Await a request and classify its outcome.
pub async fn safe_call<T, F>(execute: F) -> Result<T, NetworkError>
where
    T: DeserializeOwned,
    F: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let response = match execute.await {
        Ok(resp) => resp,
        Err(e) => {
            let kind = classify_transport(&e);
            debug!(error = %e, kind = kind.as_str(), "transport failure");
            return Err(kind);
        }
    };

    response_to_result(response).await
}
