// ── Auth data source ──
//
// Two request/response operations against the custom auth backend:
// account registration and sign-in for an SDK token. No caching, no
// retries, no idempotency key; callers own the retry policy.

pub mod client;
pub(crate) mod dto;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::NetworkError;

/// Record returned by a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRecord {
    pub id: i64,
    pub email: String,
    pub message: String,
}

/// Credentials issued by a successful sign-in.
///
/// `user_id` is the stable identifier assigned to the account; the chat
/// SDK token is what the client presents when connecting the user.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub user_id: String,
    pub sdk_token: SecretString,
    pub access: SecretString,
    pub refresh: SecretString,
}

/// The auth backend as seen by screen controllers.
#[async_trait]
pub trait AuthDataSource: Send + Sync {
    /// `POST /signup/`. One outbound call, no retry.
    async fn register(
        &self,
        user_id: &str,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<SignUpRecord, NetworkError>;

    /// `POST /token/`. One outbound call, no retry.
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SessionToken, NetworkError>;
}
