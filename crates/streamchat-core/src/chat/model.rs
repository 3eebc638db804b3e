// Chat SDK domain types
//
// Plain data records handed back by the chat SDK boundary. They carry
// only what the screens render or route on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat user. `name` falls back to `id` when the SDK has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: None,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// A channel as returned by a query or a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Fully qualified id, `"{channel_type}:{id}"`.
    pub cid: String,
    pub channel_type: String,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Channel {
    /// Display name: the explicit name, or the bare id when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Build the fully qualified channel id.
pub fn cid(channel_type: &str, id: &str) -> String {
    format!("{channel_type}:{id}")
}

/// One message in a channel feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub cid: String,
    pub text: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

/// Returned by a successful connect call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionData {
    pub user: User,
    pub connection_id: String,
}
