// ── MVI store ──
//
// Single owner of a screen's `UiState` and its effect channel. Every
// transition goes through one lock, so subscribers observe the exact
// order in which transitions were issued. The supervisor's hooks are
// wired back into the store: `start_loading` publishes `Loading` and
// `handle_error` publishes `Error`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tracing::{trace, warn};

use crate::error::CoreError;
use crate::stream::{EffectStream, StateStream};
use crate::supervisor::{LaunchHooks, Supervisor};
use crate::ui_state::UiState;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Channels ────────────────────────────────────────────────────────

struct Fanout<S, E> {
    subscribers: Vec<mpsc::UnboundedSender<UiState<S>>>,
    effect_tx: Option<mpsc::UnboundedSender<E>>,
    pending_effect: Option<E>,
}

/// Outbound side of a store, shared with the supervisor hooks.
struct Channels<S, E> {
    state_tx: watch::Sender<UiState<S>>,
    fanout: Mutex<Fanout<S, E>>,
}

impl<S: Clone, E> Channels<S, E> {
    fn new(initial: UiState<S>) -> Self {
        let (state_tx, _) = watch::channel(initial);
        Self {
            state_tx,
            fanout: Mutex::new(Fanout {
                subscribers: Vec::new(),
                effect_tx: None,
                pending_effect: None,
            }),
        }
    }

    fn emit_state(&self, state: UiState<S>) {
        let mut fanout = lock(&self.fanout);
        trace!(state = state.label(), "state transition");
        fanout.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
        self.state_tx.send_replace(state);
    }

    fn subscribe(&self) -> StateStream<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut fanout = lock(&self.fanout);
        if tx.send(self.state_tx.borrow().clone()).is_ok() {
            fanout.subscribers.push(tx);
        }
        StateStream::new(rx, self.state_tx.subscribe())
    }

    /// Deliver to the attached consumer, or hold the effect until one
    /// attaches. Only the most recent undelivered effect is held.
    fn emit_effect(&self, effect: E) {
        let mut fanout = lock(&self.fanout);
        let effect = match &fanout.effect_tx {
            Some(tx) => match tx.send(effect) {
                Ok(()) => return,
                Err(mpsc::error::SendError(effect)) => effect,
            },
            None => effect,
        };
        fanout.effect_tx = None;
        if fanout.pending_effect.replace(effect).is_some() {
            warn!("undelivered effect replaced by a newer one");
        }
    }

    /// Drop every subscriber queue and the effect consumer so their
    /// streams end.
    fn close(&self) {
        let mut fanout = lock(&self.fanout);
        fanout.subscribers.clear();
        fanout.effect_tx = None;
    }

    fn attach_effects(&self) -> EffectStream<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut fanout = lock(&self.fanout);
        let tx = match fanout.pending_effect.take() {
            Some(effect) => match tx.send(effect) {
                Ok(()) => Some(tx),
                Err(mpsc::error::SendError(effect)) => {
                    fanout.pending_effect = Some(effect);
                    None
                }
            },
            None => Some(tx),
        };
        fanout.effect_tx = tx;
        EffectStream::new(rx)
    }
}

impl<S, E> LaunchHooks for Channels<S, E>
where
    S: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    fn start_loading(&self) {
        self.emit_state(UiState::Loading);
    }

    fn handle_error(&self, cause: CoreError) {
        self.emit_state(UiState::Error(cause));
    }
}

// ── Store ───────────────────────────────────────────────────────────

/// Reactive state container for one screen.
///
/// Cheaply cloneable via `Arc`; clones share the same state, effect
/// channel and task scope.
///
/// Besides the published `UiState`, the store keeps a mirror of the
/// screen's data record. Screens edit the mirror with [`Store::reduce`]
/// (edit and publish) or [`Store::mutate`] (edit only), so the record
/// survives the screen passing through `Loading` or `Error`.
pub struct Store<S, E> {
    inner: Arc<StoreInner<S, E>>,
}

struct StoreInner<S, E> {
    channels: Arc<Channels<S, E>>,
    snapshot: Mutex<S>,
    supervisor: Supervisor,
}

impl<S, E> Clone for Store<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, E> Store<S, E>
where
    S: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    /// Store whose first published state is `Data(initial)`.
    pub fn new(initial: S) -> Self {
        Self::build(UiState::Data(initial.clone()), initial)
    }

    /// Store that starts `Empty`; `initial` seeds the mirror only.
    pub fn empty(initial: S) -> Self {
        Self::build(UiState::Empty, initial)
    }

    fn build(state: UiState<S>, snapshot: S) -> Self {
        let channels = Arc::new(Channels::new(state));
        let hooks: Arc<dyn LaunchHooks> = Arc::clone(&channels) as Arc<dyn LaunchHooks>;
        Self {
            inner: Arc::new(StoreInner {
                channels,
                snapshot: Mutex::new(snapshot),
                supervisor: Supervisor::new(hooks),
            }),
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    /// The most recently published state.
    pub fn current(&self) -> UiState<S> {
        self.inner.channels.state_tx.borrow().clone()
    }

    /// The data mirror, whatever state is currently published.
    pub fn snapshot(&self) -> S {
        lock(&self.inner.snapshot).clone()
    }

    // ── Subscriptions ────────────────────────────────────────────

    /// Subscribe to state: current state first, then every transition.
    pub fn state(&self) -> StateStream<S> {
        self.inner.channels.subscribe()
    }

    /// Attach the effect consumer, replacing any previous one. A held
    /// effect is delivered immediately.
    pub fn effects(&self) -> EffectStream<E> {
        self.inner.channels.attach_effects()
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Publish `state` as-is. The mirror is untouched.
    pub fn set_state(&self, state: UiState<S>) {
        self.inner.channels.emit_state(state);
    }

    pub fn set_effect(&self, effect: E) {
        self.inner.channels.emit_effect(effect);
    }

    /// Edit the mirror and publish the result as `Data`. Returns the new
    /// record.
    pub fn reduce(&self, edit: impl FnOnce(&mut S)) -> S {
        let mut snapshot = lock(&self.inner.snapshot);
        edit(&mut snapshot);
        let next = snapshot.clone();
        self.inner.channels.emit_state(UiState::Data(next.clone()));
        next
    }

    /// Like [`Store::reduce`], but publishes only when `edit` returns
    /// `true`. The check and the edit happen under the same lock.
    pub fn reduce_if(&self, edit: impl FnOnce(&mut S) -> bool) -> Option<S> {
        let mut snapshot = lock(&self.inner.snapshot);
        if !edit(&mut snapshot) {
            return None;
        }
        let next = snapshot.clone();
        self.inner.channels.emit_state(UiState::Data(next.clone()));
        Some(next)
    }

    /// Edit the mirror without publishing.
    pub fn mutate(&self, edit: impl FnOnce(&mut S)) {
        edit(&mut lock(&self.inner.snapshot));
    }

    /// Publish the mirror as `Data`.
    pub fn publish(&self) {
        let snapshot = lock(&self.inner.snapshot);
        self.inner.channels.emit_state(UiState::Data(snapshot.clone()));
    }

    /// Replace the mirror with `initial` and publish it.
    pub fn reset(&self, initial: S) {
        let mut snapshot = lock(&self.inner.snapshot);
        *snapshot = initial.clone();
        self.inner.channels.emit_state(UiState::Data(initial));
    }

    // ── Lifecycle ────────────────────────────────────────────────

    pub fn supervisor(&self) -> &Supervisor {
        &self.inner.supervisor
    }

    /// Cancel and join every task launched through this store, then end
    /// every open state and effect stream.
    pub async fn shutdown(&self) {
        self.inner.supervisor.shutdown().await;
        self.inner.channels.close();
    }
}
