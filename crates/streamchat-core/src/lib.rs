// streamchat-core: MVI state containers and screen controllers over the
// auth backend and the chat SDK boundary.

pub mod chat;
pub mod error;
pub mod mvi;
pub mod screens;
pub mod settings;
pub mod store;
pub mod stream;
pub mod supervisor;
pub mod ui_state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use chat::{ChatClient, ChatError};
pub use error::CoreError;
pub use mvi::ViewModel;
pub use settings::ScreenSettings;
pub use store::Store;
pub use stream::{EffectStream, StateStream};
pub use supervisor::{Job, LaunchHooks, NoHooks, Supervisor};
pub use ui_state::UiState;

pub use screens::{
    ChannelListScreenEffect, ChannelListScreenEvent, ChannelListScreenUiState,
    ChannelMessageScreenEffect, ChannelMessageScreenEvent, ChannelMessageUiState,
    ChannelMessageViewModel, ChannelViewModel, LoginScreenEffect, LoginScreenEvent,
    LoginScreenUiState, LoginViewModel, SignupScreenEffect, SignupScreenEvent,
    SignupScreenUiState, SignupViewModel,
};
