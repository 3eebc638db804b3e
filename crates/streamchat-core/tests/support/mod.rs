#![allow(dead_code, clippy::unwrap_used)]
// In-memory auth backend and chat SDK shared by the screen tests. Both
// record every call into one journal so tests can assert ordering across
// the two boundaries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use secrecy::SecretString;

use streamchat_api::{AuthDataSource, NetworkError, SessionToken, SignUpRecord};
use streamchat_core::chat::{
    Channel, ChatClient, ChatError, ConnectionData, CreateChannelRequest, Message,
    QueryChannelsRequest, QueryUsersRequest, User, cid,
};
use streamchat_core::{EffectStream, StateStream, UiState};

// ── Journal ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register { user_id: String, email: String },
    SignIn { email: String },
    ConnectUser(User),
    ConnectGuest { user_id: String, name: String },
    Disconnect { flush: bool },
    CreateChannel(CreateChannelRequest),
    QueryChannels(QueryChannelsRequest),
    QueryUsers(QueryUsersRequest),
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    pub fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

// ── Auth ────────────────────────────────────────────────────────────

pub struct FakeAuth {
    journal: Journal,
    latency: Duration,
    register: Mutex<Result<SignUpRecord, NetworkError>>,
    sign_in: Mutex<Result<(), NetworkError>>,
    user_id: Mutex<String>,
}

impl FakeAuth {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            latency: Duration::from_millis(50),
            register: Mutex::new(Ok(SignUpRecord {
                id: 1,
                email: String::new(),
                message: "User created".into(),
            })),
            sign_in: Mutex::new(Ok(())),
            user_id: Mutex::new("ada_l".into()),
        }
    }

    pub fn fail_register(&self, err: NetworkError) {
        *self.register.lock().unwrap() = Err(err);
    }

    pub fn fail_sign_in(&self, err: NetworkError) {
        *self.sign_in.lock().unwrap() = Err(err);
    }

    pub fn issue_user_id(&self, user_id: &str) {
        *self.user_id.lock().unwrap() = user_id.to_owned();
    }
}

#[async_trait]
impl AuthDataSource for FakeAuth {
    async fn register(
        &self,
        user_id: &str,
        email: &str,
        _password: &SecretString,
        _confirm_password: &SecretString,
    ) -> Result<SignUpRecord, NetworkError> {
        self.journal.record(Call::Register {
            user_id: user_id.to_owned(),
            email: email.to_owned(),
        });
        tokio::time::sleep(self.latency).await;
        self.register.lock().unwrap().clone()
    }

    async fn sign_in(
        &self,
        email: &str,
        _password: &SecretString,
    ) -> Result<SessionToken, NetworkError> {
        self.journal.record(Call::SignIn {
            email: email.to_owned(),
        });
        tokio::time::sleep(self.latency).await;
        (*self.sign_in.lock().unwrap())?;
        Ok(SessionToken {
            user_id: self.user_id.lock().unwrap().clone(),
            sdk_token: SecretString::from("sdk-token".to_owned()),
            access: SecretString::from("access".to_owned()),
            refresh: SecretString::from("refresh".to_owned()),
        })
    }
}

// ── Chat ────────────────────────────────────────────────────────────

/// Runs inside `query_users` just before it replies.
pub type ReplyHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct Script {
    pub connect_error: Option<ChatError>,
    pub disconnect_error: Option<ChatError>,
    pub create_error: Option<ChatError>,
    pub query_users_error: Option<ChatError>,
    pub users: Vec<User>,
    pub before_users_reply: Option<ReplyHook>,
    pub channels: Vec<Channel>,
    pub feeds: HashMap<String, Vec<Result<Message, ChatError>>>,
}

pub struct FakeChat {
    journal: Journal,
    current: Mutex<Option<User>>,
    script: Mutex<Script>,
}

impl FakeChat {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            current: Mutex::new(None),
            script: Mutex::new(Script::default()),
        }
    }

    /// Pretend `user` is already connected.
    pub fn sign_in_as(&self, user: User) {
        *self.current.lock().unwrap() = Some(user);
    }

    pub fn script(&self, edit: impl FnOnce(&mut Script)) {
        edit(&mut self.script.lock().unwrap());
    }

    fn connect(&self, user: User) -> Result<ConnectionData, ChatError> {
        if let Some(err) = self.script.lock().unwrap().connect_error.clone() {
            return Err(err);
        }
        *self.current.lock().unwrap() = Some(user.clone());
        Ok(ConnectionData {
            user,
            connection_id: "conn-1".into(),
        })
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn connect_user(
        &self,
        user: User,
        _token: SecretString,
    ) -> Result<ConnectionData, ChatError> {
        self.journal.record(Call::ConnectUser(user.clone()));
        tokio::task::yield_now().await;
        self.connect(user)
    }

    async fn connect_guest(&self, user_id: &str, name: &str) -> Result<ConnectionData, ChatError> {
        self.journal.record(Call::ConnectGuest {
            user_id: user_id.to_owned(),
            name: name.to_owned(),
        });
        tokio::task::yield_now().await;
        self.connect(User::new(user_id, name).with_role("guest"))
    }

    async fn disconnect(&self, flush_persistence: bool) -> Result<(), ChatError> {
        self.journal.record(Call::Disconnect {
            flush: flush_persistence,
        });
        *self.current.lock().unwrap() = None;
        match self.script.lock().unwrap().disconnect_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn create_channel(&self, request: CreateChannelRequest) -> Result<Channel, ChatError> {
        self.journal.record(Call::CreateChannel(request.clone()));
        tokio::task::yield_now().await;
        if let Some(err) = self.script.lock().unwrap().create_error.clone() {
            return Err(err);
        }
        let id = request
            .channel_id
            .clone()
            .unwrap_or_else(|| format!("!members-{}", request.member_ids.join("-")));
        Ok(Channel {
            cid: cid(&request.channel_type, &id),
            channel_type: request.channel_type.clone(),
            id,
            name: request
                .extra_data
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_owned),
            member_count: u32::try_from(request.member_ids.len()).unwrap(),
            last_message_at: None,
        })
    }

    async fn query_channels(
        &self,
        request: QueryChannelsRequest,
    ) -> Result<Vec<Channel>, ChatError> {
        self.journal.record(Call::QueryChannels(request));
        tokio::task::yield_now().await;
        Ok(self.script.lock().unwrap().channels.clone())
    }

    async fn query_users(&self, request: QueryUsersRequest) -> Result<Vec<User>, ChatError> {
        self.journal.record(Call::QueryUsers(request));
        tokio::task::yield_now().await;
        let (reply, hook) = {
            let script = self.script.lock().unwrap();
            let reply = match script.query_users_error.clone() {
                Some(err) => Err(err),
                None => Ok(script.users.clone()),
            };
            (reply, script.before_users_reply.clone())
        };
        if let Some(hook) = hook {
            hook();
        }
        reply
    }

    fn current_user(&self) -> Option<User> {
        self.current.lock().unwrap().clone()
    }

    fn watch_messages(&self, cid: &str) -> BoxStream<'static, Result<Message, ChatError>> {
        let backlog = self
            .script
            .lock()
            .unwrap()
            .feeds
            .get(cid)
            .cloned()
            .unwrap_or_default();
        // A live feed never completes on its own.
        stream::iter(backlog).chain(stream::pending()).boxed()
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn fakes() -> (Journal, Arc<FakeAuth>, Arc<FakeChat>) {
    let journal = Journal::default();
    let auth = Arc::new(FakeAuth::new(journal.clone()));
    let chat = Arc::new(FakeChat::new(journal.clone()));
    (journal, auth, chat)
}

pub fn message(cid: &str, id: &str, text: &str) -> Message {
    Message {
        id: id.to_owned(),
        cid: cid.to_owned(),
        text: text.to_owned(),
        user: User::new("grace", "Grace"),
        created_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
    }
}

/// Pull states until one matches `pred`, returning every state seen.
pub async fn collect_until<S: Clone>(
    states: &mut StateStream<S>,
    mut pred: impl FnMut(&UiState<S>) -> bool,
) -> Vec<UiState<S>> {
    let mut seen = Vec::new();
    let found = tokio::time::timeout(Duration::from_secs(30), async {
        while let Some(state) = states.next().await {
            let done = pred(&state);
            seen.push(state);
            if done {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);
    assert!(found, "no matching state; saw {} states", seen.len());
    seen
}

/// Wait for the next effect; `None` if nothing arrives.
pub async fn next_effect<E>(effects: &mut EffectStream<E>) -> Option<E> {
    tokio::time::timeout(Duration::from_secs(30), effects.next())
        .await
        .ok()
        .flatten()
}

/// Let every runnable task make progress without advancing the clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
