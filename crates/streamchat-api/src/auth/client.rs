// Auth backend HTTP client
//
// Wraps `reqwest::Client` with base-URL resolution, JSON encoding and
// the shared error classifier. Every endpoint method returns a
// `Result<_, NetworkError>`; nothing escapes as a transport error.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::dto::{SignUpRequest, SignUpResponseDto, TokenDto, TokenRequest};
use super::{AuthDataSource, SessionToken, SignUpRecord};
use crate::NetworkError;
use crate::classify::safe_call;
use crate::error::Error;
use crate::transport::TransportConfig;

const SIGN_UP_PATH: &str = "/signup/";
const TOKEN_PATH: &str = "/token/";

/// HTTP client for the sign-up / token backend.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// The base URL is treated as a directory: a missing trailing `/` is
    /// added so relative endpoint paths append instead of replacing the
    /// last segment.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// The backend base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint against the base URL.
    ///
    /// Absolute URLs that already point at the backend are returned as-is;
    /// otherwise a leading `/` is dropped and the path is joined onto the base.
    pub fn construct_url(&self, url: &str) -> Result<Url, url::ParseError> {
        if url.contains(self.base_url.as_str()) {
            return Url::parse(url);
        }
        self.base_url.join(url.strip_prefix('/').unwrap_or(url))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, NetworkError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.construct_url(path).map_err(|e| {
            warn!(error = %e, path, "could not resolve endpoint URL");
            NetworkError::Unknown
        })?;
        let payload = serde_json::to_vec(body).map_err(|e| {
            warn!(error = %e, "failed to encode request body");
            NetworkError::Serialization
        })?;

        debug!("POST {}", url);

        safe_call(
            self.http
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(payload)
                .send(),
        )
        .await
    }
}

#[async_trait]
impl AuthDataSource for AuthClient {
    async fn register(
        &self,
        user_id: &str,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<SignUpRecord, NetworkError> {
        let body = SignUpRequest {
            user_id,
            email,
            password: password.expose_secret(),
            confirm_password: confirm_password.expose_secret(),
        };
        self.post::<_, SignUpResponseDto>(SIGN_UP_PATH, &body)
            .await
            .map(SignUpRecord::from)
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SessionToken, NetworkError> {
        let body = TokenRequest {
            email,
            password: password.expose_secret(),
        };
        self.post::<_, TokenDto>(TOKEN_PATH, &body)
            .await
            .map(SessionToken::from)
    }
}
