use std::time::Duration;

/// Tunables shared by the screen controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSettings {
    /// Quiet period after the last keystroke before a user search fires.
    pub search_debounce: Duration,
    /// Page size for user search.
    pub user_search_limit: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(750),
            user_search_limit: 10,
        }
    }
}
