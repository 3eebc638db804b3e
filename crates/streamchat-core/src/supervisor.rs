// ── Supervised task launcher ──
//
// Cross-cutting plumbing shared by every screen: a toast broadcast,
// loading / error hooks, and spawn helpers that route failures to the
// hooks instead of letting them escape. All tasks belong to one
// cancellation scope and one tracker, so teardown cancels and joins
// everything a screen started.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::future::join_all;
use futures_util::{FutureExt, StreamExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace, warn};

use crate::error::CoreError;

const TOAST_CHANNEL_SIZE: usize = 16;

/// Overridable hooks invoked around supervised work.
///
/// Both default to no-ops; the MVI store overrides them to move the
/// screen into `Loading` and `Error`.
pub trait LaunchHooks: Send + Sync + 'static {
    /// Called before a supervised block starts, unless skipped.
    fn start_loading(&self) {}

    /// Called with every failure a supervised block did not handle itself.
    fn handle_error(&self, _cause: CoreError) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl LaunchHooks for NoHooks {}

// ── Job ──────────────────────────────────────────────────────────

/// Handle to one supervised task.
///
/// Cancelling a job only affects that task; the owning scope is untouched.
#[derive(Debug)]
pub struct Job {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Job {
    /// Request cancellation. A job still waiting on a timer or a request
    /// is dropped at its next suspension point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the task to end, whatever the outcome.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            debug!(error = %e, "supervised task did not complete");
        }
    }
}

// ── Supervisor ───────────────────────────────────────────────────

/// Spawns work under a shared exception handler and cancellation scope.
///
/// Cheaply cloneable; clones share the scope, the tracker and the toast
/// channel.
#[derive(Clone)]
pub struct Supervisor {
    hooks: Arc<dyn LaunchHooks>,
    toast_tx: broadcast::Sender<String>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Supervisor {
    pub fn new(hooks: Arc<dyn LaunchHooks>) -> Self {
        let (toast_tx, _) = broadcast::channel(TOAST_CHANNEL_SIZE);
        Self {
            hooks,
            toast_tx,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    // ── Toasts ───────────────────────────────────────────────────

    /// Broadcast a short-lived message. Dropped if nobody is listening.
    pub fn show_toast(&self, message: impl Into<String>) {
        if self.toast_tx.send(message.into()).is_err() {
            trace!("toast dropped: no active observers");
        }
    }

    /// Subscribe to toast messages published from now on.
    pub fn toasts(&self) -> broadcast::Receiver<String> {
        self.toast_tx.subscribe()
    }

    // ── Hooks ────────────────────────────────────────────────────

    pub fn start_loading(&self) {
        self.hooks.start_loading();
    }

    /// Route a failure to the error hook, unless the scope is gone.
    pub fn handle_error(&self, cause: CoreError) {
        report(self.hooks.as_ref(), &self.cancel, cause);
    }

    // ── Launch helpers ───────────────────────────────────────────

    /// Run `block` under the shared handler.
    ///
    /// Unless `skip_loading` is set, the loading hook runs first. Calls are
    /// not deduplicated; cancel the previous [`Job`] when a newer
    /// equivalent one supersedes it.
    pub fn safe_launch<F>(&self, skip_loading: bool, block: F) -> Job
    where
        F: Future<Output = Result<(), CoreError>> + Send + 'static,
    {
        if !skip_loading {
            self.hooks.start_loading();
        }
        let token = self.cancel.child_token();
        let handle = self
            .tracker
            .spawn(run_guarded(Arc::clone(&self.hooks), token.clone(), block));
        Job { token, handle }
    }

    /// Run `block` in the background and invoke `on_complete` once it ends,
    /// whether it succeeded, failed, panicked or was cancelled.
    pub fn safe_launch_io<F, C>(&self, on_complete: C, block: F) -> Job
    where
        F: Future<Output = Result<(), CoreError>> + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let token = self.cancel.child_token();
        let guarded = run_guarded(Arc::clone(&self.hooks), token.clone(), block);
        let handle = self.tracker.spawn(async move {
            guarded.await;
            on_complete();
        });
        Job { token, handle }
    }

    /// Fan out `calls`, wait for every one of them, then hand the ordered
    /// results to `on_complete`.
    ///
    /// The loading hook runs once up front. A failing call does not abort
    /// its siblings; each failure is reported to the error hook before
    /// `on_complete` runs.
    pub fn fetch_multiple_resource<T, Fut, I, C>(&self, calls: I, on_complete: C) -> Job
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
        I: IntoIterator<Item = Fut>,
        C: FnOnce(Vec<Result<T, CoreError>>) + Send + 'static,
    {
        self.hooks.start_loading();
        let calls: Vec<Fut> = calls.into_iter().collect();
        let this = self.clone();
        self.safe_launch_io(
            || {},
            async move {
                let results = join_all(calls).await;
                for err in results.iter().filter_map(|r| r.as_ref().err()) {
                    this.handle_error(err.clone());
                }
                on_complete(results);
                Ok(())
            },
        )
    }

    /// Drain `source`, calling `on_each` per item.
    ///
    /// The first upstream error goes to the error hook and ends the
    /// subscription.
    pub async fn call<S, T, F>(&self, source: S, mut on_each: F)
    where
        S: Stream<Item = Result<T, CoreError>>,
        F: FnMut(T),
    {
        let mut source = pin!(source);
        while let Some(item) = source.next().await {
            match item {
                Ok(value) => on_each(value),
                Err(err) => {
                    self.handle_error(err);
                    break;
                }
            }
        }
    }

    // ── Teardown ─────────────────────────────────────────────────

    /// The scope every launched job is a child of.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every running and future job.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel every job and wait for all of them to wind down.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        debug!("supervisor shut down");
    }
}

// ── Private helpers ──────────────────────────────────────────────

async fn run_guarded<F>(hooks: Arc<dyn LaunchHooks>, token: CancellationToken, block: F)
where
    F: Future<Output = Result<(), CoreError>> + Send,
{
    let outcome = tokio::select! {
        biased;
        () = token.cancelled() => {
            trace!("supervised task cancelled");
            return;
        }
        outcome = AssertUnwindSafe(block).catch_unwind() => outcome,
    };

    let cause = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err,
        Err(panic) => CoreError::Internal(panic_message(panic.as_ref())),
    };
    report(hooks.as_ref(), &token, cause);
}

/// Forward `cause` to the error hook. Failures observed after the scope
/// was cancelled, and explicit cancellations, are not errors.
fn report(hooks: &dyn LaunchHooks, token: &CancellationToken, cause: CoreError) {
    if token.is_cancelled() || cause.is_cancelled() {
        debug!(error = %cause, "ignoring failure from cancelled scope");
        return;
    }
    warn!(error = %cause, "supervised task failed");
    hooks.handle_error(cause);
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".into()
    }
}
