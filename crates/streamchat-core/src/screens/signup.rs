// ── Sign-up screen ──
//
// Local validation produces field errors and never touches the network.
// A valid form runs register, sign-in and chat connect strictly in
// sequence; any failure ends the chain and the screen enters `Error`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use secrecy::SecretString;
use streamchat_api::AuthDataSource;
use tokio_util::sync::DropGuard;
use tracing::{debug, info, warn};

use crate::chat::{ChatClient, User};
use crate::error::CoreError;
use crate::mvi::ViewModel;
use crate::store::Store;

/// Letters, digits, `_` and `@`; at least three characters.
static USER_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_@]{3,}$").expect("user name pattern is valid")
});

pub const USER_NAME_INVALID: &str = "Username is not valid";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

const CHAT_ROLE: &str = "user";

pub fn is_valid_user_name(user_name: &str) -> bool {
    USER_NAME_RE.is_match(user_name)
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignupScreenUiState {
    pub user_name: String,
    pub user_name_error: Option<String>,
    pub email: String,
    pub email_error: Option<String>,
    pub password: String,
    pub password_error: Option<String>,
    pub confirm_password: String,
    pub confirm_password_error: Option<String>,
    pub is_password_visible: bool,
    pub is_confirm_password_visible: bool,
    pub user_id: String,
}

impl fmt::Debug for SignupScreenUiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupScreenUiState")
            .field("user_name", &self.user_name)
            .field("user_name_error", &self.user_name_error)
            .field("email", &self.email)
            .field("email_error", &self.email_error)
            .field("password_error", &self.password_error)
            .field("confirm_password_error", &self.confirm_password_error)
            .field("is_password_visible", &self.is_password_visible)
            .field("is_confirm_password_visible", &self.is_confirm_password_visible)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupScreenEvent {
    UserSignUp {
        user_name: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    UserNameChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    ConfirmPasswordChanged(String),
    TogglePasswordVisibility,
    ToggleConfirmPasswordVisibility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupScreenEffect {
    NavigateToChannelScreen { user_id: String },
}

pub struct SignupViewModel {
    store: Store<SignupScreenUiState, SignupScreenEffect>,
    auth: Arc<dyn AuthDataSource>,
    chat: Arc<dyn ChatClient>,
    in_flight: Arc<AtomicBool>,
    _scope: DropGuard,
}

/// Clears the in-flight flag when the sign-up task ends, however it ends.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SignupViewModel {
    pub fn new(auth: Arc<dyn AuthDataSource>, chat: Arc<dyn ChatClient>) -> Self {
        let store = Store::empty(SignupScreenUiState::default());
        let scope = store.supervisor().cancellation_token().clone().drop_guard();
        Self {
            store,
            auth,
            chat,
            in_flight: Arc::new(AtomicBool::new(false)),
            _scope: scope,
        }
    }

    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }

    /// Whether a sign-up chain is currently running.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn user_sign_up(
        &self,
        user_name: String,
        email: String,
        password: String,
        confirm_password: String,
    ) {
        let user_name_error =
            (!is_valid_user_name(&user_name)).then(|| USER_NAME_INVALID.to_owned());
        let confirm_password_error =
            (password != confirm_password).then(|| PASSWORD_MISMATCH.to_owned());

        if user_name_error.is_some() || confirm_password_error.is_some() {
            debug!("sign-up form rejected locally");
            self.store.reduce(|s| {
                s.user_name_error = user_name_error;
                s.confirm_password_error = confirm_password_error;
            });
            return;
        }

        if self.in_flight.swap(true, Ordering::AcqRel) {
            warn!(user_name = %user_name, "sign-up already in progress; ignoring duplicate submit");
            return;
        }
        let guard = InFlight(Arc::clone(&self.in_flight));

        self.store.mutate(|s| {
            s.user_name_error = None;
            s.confirm_password_error = None;
        });

        let store = self.store.clone();
        let auth = Arc::clone(&self.auth);
        let chat = Arc::clone(&self.chat);
        let password = SecretString::from(password);
        let confirm_password = SecretString::from(confirm_password);

        self.store.supervisor().safe_launch(false, async move {
            let _guard = guard;

            let record = auth
                .register(&user_name, &email, &password, &confirm_password)
                .await?;
            debug!(id = record.id, "registered");

            let token = auth.sign_in(&email, &password).await?;

            let user = User::new(user_name.clone(), user_name).with_role(CHAT_ROLE);
            let connected = chat.connect_user(user, token.sdk_token).await?;
            info!(user_id = %connected.user.id, "signed up and connected");

            let user_id = connected.user.id;
            store.reduce(|s| s.user_id.clone_from(&user_id));
            store.set_effect(SignupScreenEffect::NavigateToChannelScreen { user_id });
            Ok::<_, CoreError>(())
        });
    }
}

impl ViewModel for SignupViewModel {
    type State = SignupScreenUiState;
    type Event = SignupScreenEvent;
    type Effect = SignupScreenEffect;

    fn store(&self) -> &Store<Self::State, Self::Effect> {
        &self.store
    }

    fn init_ui_state(&self) -> Self::State {
        SignupScreenUiState::default()
    }

    fn on_trigger_event(&self, event: SignupScreenEvent) {
        match event {
            SignupScreenEvent::UserSignUp {
                user_name,
                email,
                password,
                confirm_password,
            } => self.user_sign_up(user_name, email, password, confirm_password),
            SignupScreenEvent::UserNameChanged(user_name) => {
                self.store.reduce(|s| s.user_name = user_name);
            }
            SignupScreenEvent::EmailChanged(email) => {
                self.store.reduce(|s| s.email = email);
            }
            SignupScreenEvent::PasswordChanged(password) => {
                self.store.reduce(|s| s.password = password);
            }
            SignupScreenEvent::ConfirmPasswordChanged(confirm_password) => {
                self.store.reduce(|s| s.confirm_password = confirm_password);
            }
            SignupScreenEvent::TogglePasswordVisibility => {
                self.store.reduce(|s| s.is_password_visible = !s.is_password_visible);
            }
            SignupScreenEvent::ToggleConfirmPasswordVisibility => {
                self.store
                    .reduce(|s| s.is_confirm_password_visible = !s.is_confirm_password_visible);
            }
        }
    }
}
