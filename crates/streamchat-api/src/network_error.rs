// ── Network error kinds ──
//
// Closed set of failure kinds produced at the network boundary.
// Classified exactly once (see `classify`) and never re-mapped upstream.

use strum::IntoStaticStr;
use thiserror::Error;

/// Failure kind of a request against the auth backend.
///
/// Carries no payload; the raw transport error is logged at the point of
/// classification and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkError {
    /// HTTP 408, or the client-side request timeout elapsed.
    #[error("request timed out")]
    RequestTimeout,

    /// HTTP 429.
    #[error("too many requests")]
    TooManyRequests,

    /// Host unresolvable or unreachable before any response arrived.
    #[error("no internet connection")]
    NoInternet,

    /// HTTP 5xx.
    #[error("server error")]
    ServerError,

    /// Request body could not be encoded, or the response body did not
    /// match the expected shape.
    #[error("unexpected payload shape")]
    Serialization,

    /// Any other status code or unclassified transport failure.
    #[error("unknown network error")]
    Unknown,
}

impl NetworkError {
    /// Stable identifier, e.g. `"NO_INTERNET"`.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
