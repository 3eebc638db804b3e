#![allow(clippy::unwrap_used)]
// Channel list screen: debounced user search, channel creation, direct
// message lookup and logout.

mod support;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use streamchat_core::chat::{
    Channel, ChatError, CreateChannelRequest, Filter, QueryChannelsRequest, QuerySort,
    QueryUsersRequest, User,
};
use streamchat_core::{
    ChannelListScreenEffect, ChannelListScreenEvent, ChannelListScreenUiState, ChannelViewModel, CoreError, ScreenSettings,
    UiState, ViewModel,
};
use support::{Call, collect_until, fakes, next_effect, settle};

fn ada() -> User {
    User::new("ada", "Ada")
}

fn grace() -> User {
    User::new("grace", "Grace")
}

fn user_queries(calls: &[Call]) -> Vec<QueryUsersRequest> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::QueryUsers(req) => Some(req.clone()),
            _ => None,
        })
        .collect()
}

fn search_for(query: &str) -> QueryUsersRequest {
    QueryUsersRequest::new(Filter::and([Filter::autocomplete("name", query)]), 0, 10)
}

// ── Search ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_typing_supersedes_pending_search() {
    let (journal, _, chat) = fakes();
    chat.script(|s| s.users = vec![grace()]);
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut states = vm.ui_state();

    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("a".into()));
    tokio::time::advance(Duration::from_millis(300)).await;
    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("ab".into()));

    let seen = collect_until(&mut states, |s| {
        s.data().is_some_and(|d| !d.users.is_empty())
    })
    .await;
    let last = seen.last().and_then(UiState::data).unwrap();
    assert_eq!(last.query, "ab");
    assert_eq!(last.users, vec![grace()]);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(user_queries(&journal.calls()), vec![search_for("ab")]);
}

#[tokio::test(start_paused = true)]
async fn test_search_waits_out_the_debounce() {
    let (journal, _, chat) = fakes();
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());

    vm.on_trigger_event(ChannelListScreenEvent::OnSearch("gr".into()));
    settle().await;
    tokio::time::advance(Duration::from_millis(700)).await;
    settle().await;
    assert!(user_queries(&journal.calls()).is_empty());

    tokio::time::advance(Duration::from_millis(100)).await;
    settle().await;
    assert_eq!(user_queries(&journal.calls()), vec![search_for("gr")]);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_query_cancels_and_empties_results() {
    let (journal, _, chat) = fakes();
    chat.script(|s| s.users = vec![grace()]);
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut states = vm.ui_state();

    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("gr".into()));
    collect_until(&mut states, |s| {
        s.data().is_some_and(|d| !d.users.is_empty())
    })
    .await;

    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("gra".into()));
    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange(String::new()));

    let state = vm.current_state().into_data().unwrap();
    assert!(state.users.is_empty());
    assert_eq!(state.query, "");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(user_queries(&journal.calls()), vec![search_for("gr")]);
    assert!(vm.current_state().into_data().unwrap().users.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_search_failure_is_a_toast_not_an_error() {
    let (_, _, chat) = fakes();
    chat.script(|s| s.query_users_error = Some(ChatError::api("rate limited")));
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut toasts = vm.toasts();

    vm.on_trigger_event(ChannelListScreenEvent::OnSearch("gr".into()));

    let toast = tokio::time::timeout(Duration::from_secs(5), toasts.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(toast, "rate limited");
    assert!(vm.current_state().data().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_reset_drops_pending_search() {
    let (journal, _, chat) = fakes();
    chat.script(|s| s.users = vec![grace()]);
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());

    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("gr".into()));
    vm.reset();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(user_queries(&journal.calls()).is_empty());
    assert_eq!(
        vm.current_state(),
        UiState::Data(ChannelListScreenUiState::default())
    );
}

#[tokio::test(start_paused = true)]
async fn test_results_arriving_after_clear_are_dropped() {
    let (journal, _, chat) = fakes();
    let vm = Arc::new(ChannelViewModel::new(chat.clone(), ScreenSettings::default()));

    // The query is cleared while the search request is already answering.
    let screen = Arc::downgrade(&vm);
    chat.script(|s| {
        s.users = vec![grace()];
        s.before_users_reply = Some(Arc::new(move || {
            if let Some(vm) = screen.upgrade() {
                vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange(String::new()));
            }
        }));
    });

    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("gr".into()));
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(user_queries(&journal.calls()), vec![search_for("gr")]);
    let state = vm.current_state().into_data().unwrap();
    assert_eq!(state.query, "");
    assert!(state.users.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_screen_cancels_pending_search() {
    let (journal, _, chat) = fakes();
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());

    vm.on_trigger_event(ChannelListScreenEvent::OnSearch("gr".into()));
    drop(vm);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(user_queries(&journal.calls()).is_empty());
}

// ── Channels ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_create_channel_closes_dialog_and_loads() {
    let (journal, _, chat) = fakes();
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());

    vm.on_trigger_event(ChannelListScreenEvent::SetCurrentUser("ada".into()));
    vm.on_trigger_event(ChannelListScreenEvent::OnClickCreateNewChannel);
    assert!(vm.current_state().data().unwrap().show_dialog);
    let mut states = vm.ui_state();

    vm.on_trigger_event(ChannelListScreenEvent::OnCreateNewChannel("general".into()));
    assert_eq!(vm.current_state(), UiState::Loading);

    let seen = collect_until(&mut states, |s| {
        s.data().is_some_and(|d| !d.show_dialog && d.current_username == "ada")
    })
    .await;
    assert_eq!(seen.iter().filter(|s| s.is_loading()).count(), 1);

    let calls = journal.calls();
    let [Call::CreateChannel(request)] = calls.as_slice() else {
        panic!("expected one create call, got {calls:?}");
    };
    assert_eq!(request.channel_type, "messaging");
    assert_eq!(request.member_ids, vec!["ada"]);
    assert_eq!(request.extra_data.get("name"), Some(&serde_json::json!("general")));
    let id = request.channel_id.as_deref().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok(), "{id} is not a uuid");
}

#[tokio::test(start_paused = true)]
async fn test_create_channel_failure_enters_error() {
    let (_, _, chat) = fakes();
    chat.script(|s| s.create_error = Some(ChatError::api("")));
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut states = vm.ui_state();

    vm.on_trigger_event(ChannelListScreenEvent::OnCreateNewChannel("general".into()));

    let seen = collect_until(&mut states, |s| s.error().is_some()).await;
    assert_eq!(
        seen.last(),
        Some(&UiState::Error(CoreError::Chat {
            message: "Unknown error".into()
        }))
    );
    assert!(!vm.store().snapshot().show_dialog);
}

#[tokio::test(start_paused = true)]
async fn test_searched_user_with_existing_channel_navigates() {
    let (journal, _, chat) = fakes();
    chat.sign_in_as(ada());
    chat.script(|s| {
        s.channels = vec![Channel {
            cid: "messaging:dm".into(),
            channel_type: "messaging".into(),
            id: "dm".into(),
            name: Some("Ada & Grace".into()),
            member_count: 2,
            last_message_at: None,
        }];
    });
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut effects = vm.effects();

    vm.on_trigger_event(ChannelListScreenEvent::OnClickSearchedUser(grace()));

    assert_eq!(
        next_effect(&mut effects).await,
        Some(ChannelListScreenEffect::NavigateToChannel {
            channel_id: "messaging:dm".into(),
            channel_name: "Ada & Grace".into(),
        })
    );
    assert_eq!(
        journal.calls(),
        vec![Call::QueryChannels(QueryChannelsRequest {
            filter: Filter::and([
                Filter::eq("type", "messaging"),
                Filter::is_in("members", ["ada"]),
                Filter::is_in("members", ["grace"]),
            ]),
            sort: vec![QuerySort::desc("last_message_at")],
            offset: 0,
            limit: 1,
            member_limit: 2,
            watch: true,
            state: true,
        })]
    );
}

#[tokio::test(start_paused = true)]
async fn test_searched_user_without_channel_starts_conversation() {
    let (journal, _, chat) = fakes();
    chat.sign_in_as(ada());
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut effects = vm.effects();
    let mut states = vm.ui_state();

    vm.on_trigger_event(ChannelListScreenEvent::OnClickSearchedUser(grace()));
    collect_until(&mut states, |s| {
        s.data()
            .is_some_and(|d| d.should_show_user_information == Some(grace()))
    })
    .await;

    vm.on_trigger_event(ChannelListScreenEvent::StartConversation(grace()));

    assert_eq!(
        next_effect(&mut effects).await,
        Some(ChannelListScreenEffect::NavigateToChannel {
            channel_id: "messaging:!members-ada-grace".into(),
            channel_name: "!members-ada-grace".into(),
        })
    );
    assert_eq!(
        journal.calls().last(),
        Some(&Call::CreateChannel(
            CreateChannelRequest::new("messaging", None)
                .members(["ada".to_owned(), "grace".to_owned()])
        ))
    );
    assert_eq!(vm.store().snapshot().should_show_user_information, None);
}

#[tokio::test(start_paused = true)]
async fn test_navigate_clears_search() {
    let (_, _, chat) = fakes();
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut effects = vm.effects();

    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("gr".into()));
    vm.on_trigger_event(ChannelListScreenEvent::NavigateToChannel {
        channel_id: "messaging:general".into(),
        channel_name: "general".into(),
    });

    assert_eq!(vm.current_state().into_data().unwrap().query, "");
    assert_eq!(
        effects.try_next(),
        Some(ChannelListScreenEffect::NavigateToChannel {
            channel_id: "messaging:general".into(),
            channel_name: "general".into(),
        })
    );
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_logout_disconnects_once_from_any_state() {
    let (journal, _, chat) = fakes();
    chat.sign_in_as(ada());
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut effects = vm.effects();

    vm.store().set_state(UiState::Error(CoreError::NotConnected));
    vm.on_trigger_event(ChannelListScreenEvent::OnClickLogout);

    assert_eq!(
        next_effect(&mut effects).await,
        Some(ChannelListScreenEffect::OnLogOut)
    );
    assert_eq!(journal.calls(), vec![Call::Disconnect { flush: false }]);
    assert!(!vm.current_state().into_data().unwrap().is_logged_in);
}

#[tokio::test(start_paused = true)]
async fn test_logout_completes_even_if_disconnect_fails() {
    let (journal, _, chat) = fakes();
    chat.script(|s| s.disconnect_error = Some(ChatError::api("socket already closed")));
    let vm = ChannelViewModel::new(chat, ScreenSettings::default());
    let mut effects = vm.effects();

    vm.on_trigger_event(ChannelListScreenEvent::OnQueryChange("gr".into()));
    vm.on_trigger_event(ChannelListScreenEvent::OnClickLogout);

    assert_eq!(
        next_effect(&mut effects).await,
        Some(ChannelListScreenEffect::OnLogOut)
    );
    settle().await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(journal.calls(), vec![Call::Disconnect { flush: false }]);
}
