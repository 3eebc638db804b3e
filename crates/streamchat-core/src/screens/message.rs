// ── Channel message screen ──
//
// Holds the active channel and mirrors the SDK's message feed for it.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio_util::sync::DropGuard;
use tracing::debug;

use crate::chat::{ChatClient, Message};
use crate::error::CoreError;
use crate::mvi::ViewModel;
use crate::store::{Store, lock};
use crate::supervisor::Job;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMessageUiState {
    pub channel_id: String,
    /// Feed for `channel_id`, in arrival order.
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessageScreenEvent {
    SetChannelId(String),
}

/// This screen emits no effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessageScreenEffect {}

pub struct ChannelMessageViewModel {
    store: Store<ChannelMessageUiState, ChannelMessageScreenEffect>,
    chat: Arc<dyn ChatClient>,
    feed: Mutex<Option<Job>>,
    _scope: DropGuard,
}

impl ChannelMessageViewModel {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        let store = Store::new(ChannelMessageUiState::default());
        let scope = store.supervisor().cancellation_token().clone().drop_guard();
        Self {
            store,
            chat,
            feed: Mutex::new(None),
            _scope: scope,
        }
    }

    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }

    fn set_channel_id(&self, cid: String) {
        let mut feed = lock(&self.feed);
        if let Some(previous) = feed.take() {
            previous.cancel();
        }

        self.store.reduce(|s| {
            s.channel_id.clone_from(&cid);
            s.messages.clear();
        });

        let store = self.store.clone();
        let chat = Arc::clone(&self.chat);
        let job = self.store.supervisor().safe_launch(true, async move {
            debug!(cid = %cid, "watching channel");
            let source = chat
                .watch_messages(&cid)
                .map(|item| item.map_err(CoreError::from));
            let supervisor = store.supervisor().clone();
            supervisor
                .call(source, |message| {
                    store.reduce(|s| s.messages.push(message));
                })
                .await;
            Ok(())
        });
        *feed = Some(job);
    }
}

impl ViewModel for ChannelMessageViewModel {
    type State = ChannelMessageUiState;
    type Event = ChannelMessageScreenEvent;
    type Effect = ChannelMessageScreenEffect;

    fn store(&self) -> &Store<Self::State, Self::Effect> {
        &self.store
    }

    fn init_ui_state(&self) -> Self::State {
        ChannelMessageUiState::default()
    }

    fn reset(&self) {
        if let Some(previous) = lock(&self.feed).take() {
            previous.cancel();
        }
        self.store.reset(self.init_ui_state());
    }

    fn on_trigger_event(&self, event: ChannelMessageScreenEvent) {
        match event {
            ChannelMessageScreenEvent::SetChannelId(cid) => self.set_channel_id(cid),
        }
    }
}
