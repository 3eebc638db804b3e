// ── Chat SDK boundary ──
//
// The screens talk to the hosted chat service only through `ChatClient`.
// A concrete binding wraps the vendor SDK; tests substitute an in-memory
// fake.

pub mod model;
pub mod requests;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use secrecy::SecretString;
use thiserror::Error;

pub use model::{Channel, ConnectionData, Message, User, cid};
pub use requests::{
    CreateChannelRequest, Filter, QueryChannelsRequest, QuerySort, QueryUsersRequest,
};

/// Channel type used for every channel the app creates.
pub const MESSAGING: &str = "messaging";

/// Failure reported by the chat SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The backend rejected the call.
    #[error("chat API error (status {status:?}): {message}")]
    Api { status: Option<u16>, message: String },

    /// No user is connected.
    #[error("not connected")]
    NotConnected,

    /// The SDK call was cancelled.
    #[error("cancelled")]
    Cancelled,
}

impl ChatError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }
}

/// Operations the screens need from the chat SDK.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Connect as a registered user with an SDK token from the auth backend.
    async fn connect_user(
        &self,
        user: User,
        token: SecretString,
    ) -> Result<ConnectionData, ChatError>;

    /// Connect as a guest; the backend issues the token.
    async fn connect_guest(&self, user_id: &str, name: &str) -> Result<ConnectionData, ChatError>;

    /// Drop the connection. With `flush_persistence` the local cache is cleared.
    async fn disconnect(&self, flush_persistence: bool) -> Result<(), ChatError>;

    async fn create_channel(&self, request: CreateChannelRequest) -> Result<Channel, ChatError>;

    async fn query_channels(
        &self,
        request: QueryChannelsRequest,
    ) -> Result<Vec<Channel>, ChatError>;

    async fn query_users(&self, request: QueryUsersRequest) -> Result<Vec<User>, ChatError>;

    /// The connected user, if any.
    fn current_user(&self) -> Option<User>;

    /// Live message feed for `cid`: backlog first, then new messages.
    fn watch_messages(&self, cid: &str) -> BoxStream<'static, Result<Message, ChatError>>;
}
