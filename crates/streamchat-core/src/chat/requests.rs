// Chat query builders
//
// Filters serialize to the operator syntax the chat backend expects
// (`{"field": {"$eq": value}}`, `{"$and": [...]}`), so an SDK binding can
// forward them untouched.

use serde::Serialize;
use serde_json::{Map, Value, json};

// ── Filter ──────────────────────────────────────────────────────────

/// Query filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    Autocomplete { field: String, value: String },
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn autocomplete(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Autocomplete {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Operator JSON for this expression.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Eq { field, value } => operator(field, "$eq", value.clone()),
            Self::In { field, values } => operator(field, "$in", Value::Array(values.clone())),
            Self::Autocomplete { field, value } => {
                operator(field, "$autocomplete", Value::String(value.clone()))
            }
            Self::And(filters) => {
                json!({ "$and": filters.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
        }
    }
}

fn operator(field: &str, op: &str, value: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(op.to_owned(), value);
    let mut outer = Map::new();
    outer.insert(field.to_owned(), Value::Object(inner));
    Value::Object(outer)
}

impl Serialize for Filter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// ── Sort ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySort {
    pub field: String,
    pub direction: i8,
}

impl QuerySort {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: -1,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// Channel query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryChannelsRequest {
    pub filter: Filter,
    pub sort: Vec<QuerySort>,
    pub offset: u32,
    pub limit: u32,
    pub member_limit: u32,
    pub watch: bool,
    pub state: bool,
}

/// User query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryUsersRequest {
    pub filter: Filter,
    pub offset: u32,
    pub limit: u32,
}

impl QueryUsersRequest {
    pub fn new(filter: Filter, offset: u32, limit: u32) -> Self {
        Self {
            filter,
            offset,
            limit,
        }
    }
}

/// Channel creation.
///
/// `channel_id: None` asks the backend for a distinct channel keyed by its
/// member set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateChannelRequest {
    pub channel_type: String,
    pub channel_id: Option<String>,
    pub member_ids: Vec<String>,
    pub extra_data: Map<String, Value>,
}

impl CreateChannelRequest {
    pub fn new(channel_type: impl Into<String>, channel_id: Option<String>) -> Self {
        Self {
            channel_type: channel_type.into(),
            channel_id,
            member_ids: Vec::new(),
            extra_data: Map::new(),
        }
    }

    #[must_use]
    pub fn members(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.member_ids = ids.into_iter().collect();
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }
}
