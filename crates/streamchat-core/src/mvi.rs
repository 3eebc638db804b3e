// ── Screen controller contract ──
//
// Every screen pairs a `Store` with a closed event enum. The view layer
// observes `ui_state()`, consumes `effects()`, and feeds user intent back
// through `on_trigger_event`.

use tokio::sync::broadcast;

use crate::store::Store;
use crate::stream::{EffectStream, StateStream};
use crate::ui_state::UiState;

/// A screen controller built on a [`Store`].
pub trait ViewModel {
    type State: Clone + Send + Sync + 'static;
    type Event;
    type Effect: Send + 'static;

    fn store(&self) -> &Store<Self::State, Self::Effect>;

    /// Single entry point for user intent. Never fails; failures surface
    /// as `UiState::Error` or as a toast.
    fn on_trigger_event(&self, event: Self::Event);

    /// The default data record for this screen.
    fn init_ui_state(&self) -> Self::State;

    /// Put the screen back to its default record.
    fn reset(&self) {
        self.store().reset(self.init_ui_state());
    }

    fn ui_state(&self) -> StateStream<Self::State> {
        self.store().state()
    }

    fn current_state(&self) -> UiState<Self::State> {
        self.store().current()
    }

    fn effects(&self) -> EffectStream<Self::Effect> {
        self.store().effects()
    }

    fn toasts(&self) -> broadcast::Receiver<String> {
        self.store().supervisor().toasts()
    }
}
