// ── Login screen ──
//
// Echoes field edits into state and connects either a registered user
// (auth backend token, then chat connect) or a guest.

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use streamchat_api::AuthDataSource;
use tokio_util::sync::DropGuard;
use tracing::{debug, info};

use crate::chat::{ChatClient, User};
use crate::error::CoreError;
use crate::mvi::ViewModel;
use crate::store::Store;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginScreenUiState {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub is_logged_in: bool,
    pub error_message: String,
}

impl fmt::Debug for LoginScreenUiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginScreenUiState")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("is_logged_in", &self.is_logged_in)
            .field("error_message", &self.error_message)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginScreenEvent {
    UserNameChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    LoginButtonClicked,
    LoginAsGuestClicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginScreenEffect {
    NavigateToChannelScreen { user_name: String },
}

pub struct LoginViewModel {
    store: Store<LoginScreenUiState, LoginScreenEffect>,
    auth: Arc<dyn AuthDataSource>,
    chat: Arc<dyn ChatClient>,
    _scope: DropGuard,
}

impl LoginViewModel {
    pub fn new(auth: Arc<dyn AuthDataSource>, chat: Arc<dyn ChatClient>) -> Self {
        let store = Store::empty(LoginScreenUiState::default());
        let scope = store.supervisor().cancellation_token().clone().drop_guard();
        Self {
            store,
            auth,
            chat,
            _scope: scope,
        }
    }

    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }

    fn login_as_user(&self) {
        let form = self.store.snapshot();
        let store = self.store.clone();
        let auth = Arc::clone(&self.auth);
        let chat = Arc::clone(&self.chat);

        self.store.supervisor().safe_launch(false, async move {
            let outcome = async {
                let password = SecretString::from(form.password);
                let token = auth.sign_in(&form.email, &password).await?;
                let user = User::new(token.user_id.clone(), token.user_id.clone());
                let connected = chat.connect_user(user, token.sdk_token).await?;
                Ok::<_, CoreError>(connected.user)
            }
            .await;
            finish(&store, outcome)
        });
    }

    fn login_as_guest(&self) {
        let user_name = self.store.snapshot().user_name;
        let store = self.store.clone();
        let chat = Arc::clone(&self.chat);

        self.store.supervisor().safe_launch(false, async move {
            let outcome = chat
                .connect_guest(&user_name, &user_name)
                .await
                .map(|connected| connected.user)
                .map_err(CoreError::from);
            finish(&store, outcome)
        });
    }
}

/// Publish the outcome of a connect attempt. On failure the message is
/// kept in the mirror and the error is returned for the supervisor to
/// surface as `Error`.
fn finish(
    store: &Store<LoginScreenUiState, LoginScreenEffect>,
    outcome: Result<User, CoreError>,
) -> Result<(), CoreError> {
    match outcome {
        Ok(user) => {
            info!(user_id = %user.id, "connected to chat");
            store.reduce(|s| {
                s.is_logged_in = true;
                s.user_name.clone_from(&user.id);
                s.error_message.clear();
            });
            store.set_effect(LoginScreenEffect::NavigateToChannelScreen { user_name: user.name });
            Ok(())
        }
        Err(err) => {
            debug!(error = %err, "login failed");
            store.mutate(|s| s.error_message = err.to_string());
            Err(err)
        }
    }
}

impl ViewModel for LoginViewModel {
    type State = LoginScreenUiState;
    type Event = LoginScreenEvent;
    type Effect = LoginScreenEffect;

    fn store(&self) -> &Store<Self::State, Self::Effect> {
        &self.store
    }

    fn init_ui_state(&self) -> Self::State {
        LoginScreenUiState::default()
    }

    fn on_trigger_event(&self, event: LoginScreenEvent) {
        match event {
            LoginScreenEvent::UserNameChanged(user_name) => {
                self.store.reduce(|s| s.user_name = user_name);
            }
            LoginScreenEvent::EmailChanged(email) => {
                self.store.reduce(|s| s.email = email);
            }
            LoginScreenEvent::PasswordChanged(password) => {
                self.store.reduce(|s| s.password = password);
            }
            LoginScreenEvent::LoginButtonClicked => self.login_as_user(),
            LoginScreenEvent::LoginAsGuestClicked => self.login_as_guest(),
        }
    }
}
