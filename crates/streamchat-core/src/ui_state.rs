use crate::error::CoreError;

/// What a screen renders.
///
/// Exactly one variant is active. Only the owning store transitions it;
/// `Data` always holds a full snapshot, never a partial one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState<T> {
    Loading,
    #[default]
    Empty,
    Data(T),
    Error(CoreError),
}

impl<T> UiState<T> {
    /// The payload, if this is `Data`.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    /// The cause, if this is `Error`.
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Variant name, for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Empty => "empty",
            Self::Data(_) => "data",
            Self::Error(_) => "error",
        }
    }
}
