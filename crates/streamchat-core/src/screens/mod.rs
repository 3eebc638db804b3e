// Screen controllers. Each pairs a `Store` with the screen's event,
// effect and state types and implements `ViewModel`.

pub mod channels;
pub mod login;
pub mod message;
pub mod signup;

pub use channels::{
    ChannelListScreenEffect, ChannelListScreenEvent, ChannelListScreenUiState, ChannelViewModel,
};
pub use login::{LoginScreenEffect, LoginScreenEvent, LoginScreenUiState, LoginViewModel};
pub use message::{
    ChannelMessageScreenEffect, ChannelMessageScreenEvent, ChannelMessageUiState,
    ChannelMessageViewModel,
};
pub use signup::{SignupScreenEffect, SignupScreenEvent, SignupScreenUiState, SignupViewModel};
