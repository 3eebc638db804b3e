// ── Channel list screen ──
//
// User search with debounce-and-supersede, channel creation behind a
// confirmation dialog, direct-message lookup for a searched user, and
// logout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::DropGuard;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::{
    ChatClient, ChatError, CreateChannelRequest, Filter, MESSAGING, QueryChannelsRequest,
    QuerySort, QueryUsersRequest, User,
};
use crate::error::CoreError;
use crate::mvi::ViewModel;
use crate::settings::ScreenSettings;
use crate::store::{Store, lock};
use crate::supervisor::Job;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelListScreenUiState {
    pub current_username: String,
    pub query: String,
    pub users: Vec<User>,
    pub show_dialog: bool,
    /// Searched user with no existing conversation, awaiting confirmation.
    pub should_show_user_information: Option<User>,
    pub is_logged_in: bool,
}

impl Default for ChannelListScreenUiState {
    fn default() -> Self {
        Self {
            current_username: String::new(),
            query: String::new(),
            users: Vec::new(),
            show_dialog: false,
            should_show_user_information: None,
            is_logged_in: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelListScreenEvent {
    DismissDialog,
    SetCurrentUser(String),
    OnCreateNewChannel(String),
    OnClickCreateNewChannel,
    OnClickLogout,
    OnQueryChange(String),
    OnSearch(String),
    OnClickSearchedUser(User),
    StartConversation(User),
    StopShowingUserInformation,
    NavigateToChannel {
        channel_id: String,
        channel_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelListScreenEffect {
    NavigateToChannel {
        channel_id: String,
        channel_name: String,
    },
    OnLogOut,
}

type ChannelStore = Store<ChannelListScreenUiState, ChannelListScreenEffect>;

pub struct ChannelViewModel {
    store: ChannelStore,
    chat: Arc<dyn ChatClient>,
    settings: ScreenSettings,
    search_job: Mutex<Option<Job>>,
    /// Bumped whenever the pending search is superseded or dropped. A
    /// search only applies its results while its generation is current.
    search_generation: Arc<AtomicU64>,
    _scope: DropGuard,
}

impl ChannelViewModel {
    pub fn new(chat: Arc<dyn ChatClient>, settings: ScreenSettings) -> Self {
        let store = Store::new(ChannelListScreenUiState::default());
        let scope = store.supervisor().cancellation_token().clone().drop_guard();
        Self {
            store,
            chat,
            settings,
            search_job: Mutex::new(None),
            search_generation: Arc::new(AtomicU64::new(0)),
            _scope: scope,
        }
    }

    pub async fn shutdown(&self) {
        self.cancel_search();
        self.store.shutdown().await;
    }

    // ── Search ───────────────────────────────────────────────────

    fn cancel_search(&self) {
        let mut pending = lock(&self.search_job);
        self.search_generation.fetch_add(1, Ordering::AcqRel);
        if let Some(job) = pending.take() {
            job.cancel();
        }
    }

    /// Supersede any pending search with one for `query`. A blank query
    /// clears the results right away.
    fn on_search(&self, query: String) {
        let mut pending = lock(&self.search_job);
        let generation = self.search_generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(job) = pending.take() {
            job.cancel();
        }

        if query.trim().is_empty() {
            self.store.reduce(|s| s.users.clear());
            return;
        }

        let store = self.store.clone();
        let chat = Arc::clone(&self.chat);
        let current = Arc::clone(&self.search_generation);
        let debounce = self.settings.search_debounce;
        let limit = self.settings.user_search_limit;

        let job = self.store.supervisor().safe_launch(true, async move {
            tokio::time::sleep(debounce).await;
            debug!(query = %query, "searching users");

            let filter = Filter::and([Filter::autocomplete("name", query)]);
            let request = QueryUsersRequest::new(filter, 0, limit);
            match chat.query_users(request).await {
                Ok(users) => {
                    let applied = store.reduce_if(|s| {
                        if current.load(Ordering::Acquire) != generation {
                            return false;
                        }
                        s.users = users;
                        true
                    });
                    if applied.is_none() {
                        debug!("stale search results dropped");
                    }
                }
                Err(err) => non_fatal(&store, "user search failed", err),
            }
            Ok(())
        });
        *pending = Some(job);
    }

    // ── Conversations ────────────────────────────────────────────

    fn query_channel(&self, user: User) {
        let store = self.store.clone();
        let chat = Arc::clone(&self.chat);

        self.store.supervisor().safe_launch(true, async move {
            let Some(me) = chat.current_user() else {
                non_fatal(&store, "channel lookup skipped", ChatError::NotConnected);
                return Ok(());
            };

            let request = QueryChannelsRequest {
                filter: Filter::and([
                    Filter::eq("type", MESSAGING),
                    Filter::is_in("members", [me.id]),
                    Filter::is_in("members", [user.id.clone()]),
                ]),
                sort: vec![QuerySort::desc("last_message_at")],
                offset: 0,
                limit: 1,
                member_limit: 2,
                watch: true,
                state: true,
            };

            match chat.query_channels(request).await {
                Ok(channels) => match channels.into_iter().next() {
                    Some(channel) => {
                        let name = channel.display_name().to_owned();
                        navigate(&store, channel.cid, name);
                    }
                    None => {
                        store.reduce(|s| s.should_show_user_information = Some(user));
                    }
                },
                Err(err) => non_fatal(&store, "channel lookup failed", err),
            }
            Ok(())
        });
    }

    fn start_conversation(&self, user: User) {
        self.store.mutate(|s| s.should_show_user_information = None);
        let store = self.store.clone();
        let chat = Arc::clone(&self.chat);

        self.store.supervisor().safe_launch(false, async move {
            let me = chat.current_user().ok_or(CoreError::NotConnected)?;
            let request = CreateChannelRequest::new(MESSAGING, None).members([me.id, user.id]);
            let channel = chat.create_channel(request).await?;

            let name = channel.display_name().to_owned();
            store.publish();
            store.set_effect(ChannelListScreenEffect::NavigateToChannel {
                channel_id: channel.cid,
                channel_name: name,
            });
            Ok(())
        });
    }

    fn create_new_channel(&self, name: String) {
        self.store.mutate(|s| s.show_dialog = false);
        let owner = self.store.snapshot().current_username;
        let store = self.store.clone();
        let chat = Arc::clone(&self.chat);

        self.store.supervisor().safe_launch(false, async move {
            let request = CreateChannelRequest::new(MESSAGING, Some(Uuid::new_v4().to_string()))
                .members([owner])
                .extra("name", name);
            let channel = chat.create_channel(request).await?;
            info!(cid = %channel.cid, "channel created");
            store.publish();
            Ok(())
        });
    }

    // ── Session ──────────────────────────────────────────────────

    fn log_out(&self) {
        self.cancel_search();
        let store = self.store.clone();
        let chat = Arc::clone(&self.chat);

        self.store.supervisor().safe_launch(true, async move {
            if let Err(err) = chat.disconnect(false).await {
                warn!(error = %err, "disconnect failed; logging out anyway");
            }
            store.reduce(|s| {
                s.is_logged_in = false;
                s.query.clear();
                s.users.clear();
                s.should_show_user_information = None;
            });
            store.set_effect(ChannelListScreenEffect::OnLogOut);
            Ok(())
        });
    }
}

fn navigate(store: &ChannelStore, channel_id: String, channel_name: String) {
    store.reduce(|s| {
        s.query.clear();
        s.users.clear();
        s.should_show_user_information = None;
    });
    store.set_effect(ChannelListScreenEffect::NavigateToChannel {
        channel_id,
        channel_name,
    });
}

/// Log a failure that should not replace the screen, and tell the user.
fn non_fatal(store: &ChannelStore, context: &str, err: ChatError) {
    let err = CoreError::from(err);
    warn!(error = %err, "{context}");
    store.supervisor().show_toast(err.to_string());
}

impl ViewModel for ChannelViewModel {
    type State = ChannelListScreenUiState;
    type Event = ChannelListScreenEvent;
    type Effect = ChannelListScreenEffect;

    fn store(&self) -> &Store<Self::State, Self::Effect> {
        &self.store
    }

    fn init_ui_state(&self) -> Self::State {
        ChannelListScreenUiState::default()
    }

    fn reset(&self) {
        self.cancel_search();
        self.store.reset(self.init_ui_state());
    }

    fn on_trigger_event(&self, event: ChannelListScreenEvent) {
        match event {
            ChannelListScreenEvent::DismissDialog => {
                self.store.reduce(|s| s.show_dialog = false);
            }
            ChannelListScreenEvent::OnClickCreateNewChannel => {
                self.store.reduce(|s| s.show_dialog = true);
            }
            ChannelListScreenEvent::SetCurrentUser(username) => {
                self.store.reduce(|s| s.current_username = username);
            }
            ChannelListScreenEvent::OnCreateNewChannel(name) => self.create_new_channel(name),
            ChannelListScreenEvent::OnClickLogout => self.log_out(),
            ChannelListScreenEvent::OnQueryChange(query) => {
                self.store.mutate(|s| s.query.clone_from(&query));
                if !query.trim().is_empty() {
                    self.store.publish();
                }
                self.on_search(query);
            }
            ChannelListScreenEvent::OnSearch(query) => self.on_search(query),
            ChannelListScreenEvent::OnClickSearchedUser(user) => self.query_channel(user),
            ChannelListScreenEvent::StartConversation(user) => self.start_conversation(user),
            ChannelListScreenEvent::StopShowingUserInformation => {
                self.store.reduce(|s| s.should_show_user_information = None);
            }
            ChannelListScreenEvent::NavigateToChannel {
                channel_id,
                channel_name,
            } => navigate(&self.store, channel_id, channel_name),
        }
    }
}
