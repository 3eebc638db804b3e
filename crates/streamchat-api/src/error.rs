use thiserror::Error;

/// Errors raised while building an API client.
///
/// Request-time failures never surface here: every call on the auth
/// boundary is classified into a [`NetworkError`](crate::NetworkError)
/// instead, so this type only covers setup mistakes.
#[derive(Debug, Error)]
pub enum Error {
    /// Base URL could not be parsed or cannot carry a path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base URL parsed but is unusable as an API root (e.g. `mailto:`).
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// TLS material could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),

    /// `reqwest::Client` construction failed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}
