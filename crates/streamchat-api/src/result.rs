// ── Result combinators ──
//
// Side-effect-only taps over `std::result::Result`. `map` and friends
// come from std; these fill the gaps the auth and screen layers rely on.

/// A result whose success payload has been discarded.
pub type EmptyResult<E> = Result<(), E>;

/// Pass-through combinators for `Result`.
///
/// `on_success` and `on_error` run their callback for the matching variant
/// only and hand back the original value untouched, so chains such as
/// `r.on_success(f).on_error(g)` are always structurally identical to `r`.
pub trait ResultExt<T, E>: Sized {
    /// Run `action` with the success payload, then return `self`.
    #[must_use]
    fn on_success<F>(self, action: F) -> Self
    where
        F: FnOnce(&T);

    /// Run `action` with the error, then return `self`.
    #[must_use]
    fn on_error<F>(self, action: F) -> Self
    where
        F: FnOnce(&E);

    /// Drop the success payload, keeping the error type.
    fn as_empty_data_result(self) -> EmptyResult<E>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn on_success<F>(self, action: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Ok(ref data) = self {
            action(data);
        }
        self
    }

    fn on_error<F>(self, action: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Err(ref error) = self {
            action(error);
        }
        self
    }

    fn as_empty_data_result(self) -> EmptyResult<E> {
        self.map(|_| ())
    }
}
