// ── Core error types ──
//
// The cause carried by `UiState::Error`. Screens never see reqwest or
// SDK internals: network failures arrive pre-classified, SDK failures
// arrive as their message text.

use streamchat_api::NetworkError;
use thiserror::Error;

use crate::chat::ChatError;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Classified failure from the auth backend.
    #[error("{}", .0.as_str())]
    Network(NetworkError),

    /// Failure reported by the chat SDK.
    #[error("{message}")]
    Chat { message: String },

    /// An operation needed a connected chat user and there was none.
    #[error("No user is connected to the chat client")]
    NotConnected,

    /// A supervised task panicked or failed outside the modelled paths.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The owning scope was cancelled. Never rendered.
    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<NetworkError> for CoreError {
    fn from(err: NetworkError) -> Self {
        Self::Network(err)
    }
}

impl From<ChatError> for CoreError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Api { message, .. } if message.trim().is_empty() => Self::Chat {
                message: "Unknown error".into(),
            },
            ChatError::Api { message, .. } => Self::Chat { message },
            ChatError::NotConnected => Self::NotConnected,
            ChatError::Cancelled => Self::Cancelled,
        }
    }
}
