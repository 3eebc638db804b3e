// ── Screen streams ──
//
// Subscription types handed to the view layer: a state stream that
// replays the current state then every transition in order, and an
// effect stream that delivers one-shot effects to a single consumer.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::ui_state::UiState;

// ── State ───────────────────────────────────────────────────────────

/// A subscription to a screen's state.
///
/// The first item is the state current at subscription time; after that
/// every transition is delivered exactly once and in order, including
/// intermediate `Loading` states a watch-style snapshot would coalesce.
pub struct StateStream<S> {
    receiver: mpsc::UnboundedReceiver<UiState<S>>,
    latest: watch::Receiver<UiState<S>>,
}

impl<S: Clone> StateStream<S> {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<UiState<S>>,
        latest: watch::Receiver<UiState<S>>,
    ) -> Self {
        Self { receiver, latest }
    }

    /// Wait for the next state. `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<UiState<S>> {
        self.receiver.recv().await
    }

    /// Take the next state if one is queued, without waiting.
    pub fn try_next(&mut self) -> Option<UiState<S>> {
        self.receiver.try_recv().ok()
    }

    /// Most recently published state, regardless of what this
    /// subscriber has consumed so far.
    pub fn latest(&self) -> UiState<S> {
        self.latest.borrow().clone()
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateEvents<S> {
        StateEvents {
            inner: UnboundedReceiverStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter over a [`StateStream`].
pub struct StateEvents<S> {
    inner: UnboundedReceiverStream<UiState<S>>,
}

impl<S> Stream for StateEvents<S> {
    type Item = UiState<S>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Effects ─────────────────────────────────────────────────────────

/// The effect consumer for one screen.
///
/// Attaching a new consumer detaches the previous one.
pub struct EffectStream<E> {
    receiver: mpsc::UnboundedReceiver<E>,
}

impl<E> EffectStream<E> {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<E>) -> Self {
        Self { receiver }
    }

    /// Wait for the next effect. `None` once detached or shut down.
    pub async fn next(&mut self) -> Option<E> {
        self.receiver.recv().await
    }

    /// Take an effect if one is ready, without waiting.
    pub fn try_next(&mut self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    pub fn into_stream(self) -> UnboundedReceiverStream<E> {
        UnboundedReceiverStream::new(self.receiver)
    }
}
