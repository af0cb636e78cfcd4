//! Request and response bodies.
//!
//! Field names are camelCase on the wire (`todoId`, `doneAt`,
//! `errorMessage`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use todo_core::{Item, SortDirection};

/// Body of `POST /api/todos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTodoRequest {
    /// Item text.
    pub value: Option<String>,
}

/// Body of `PATCH /api/todos/:todoId`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    /// Requested order value.
    #[serde(default)]
    pub order: Option<i64>,
    /// Completion flag. An explicit `null` counts as `false`; only an
    /// absent field leaves the item untouched.
    #[serde(default, deserialize_with = "present")]
    pub done: Option<Option<bool>>,
    /// Replacement text.
    #[serde(default)]
    pub value: Option<String>,
}

impl UpdateTodoRequest {
    /// Returns the completion change requested, if any.
    pub fn done_flag(&self) -> Option<bool> {
        self.done.map(|done| done.unwrap_or(false))
    }
}

/// Marks a field as present, so `null` is told apart from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Query string of `GET /api/todos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Sort direction; highest order first when absent.
    pub sort: Option<SortDirection>,
}

/// An item as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoJson {
    /// Item identity.
    pub todo_id: String,
    /// Item text.
    pub value: String,
    /// Position in the list.
    pub order: i64,
    /// Completion time, `null` while open.
    pub done_at: Option<DateTime<Utc>>,
}

impl From<&Item> for TodoJson {
    fn from(item: &Item) -> Self {
        Self {
            todo_id: item.id.to_string(),
            value: item.value.clone(),
            order: item.order,
            done_at: item.done_at,
        }
    }
}

/// Response of `POST /api/todos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoResponse {
    /// The created item.
    pub todo: TodoJson,
}

/// Response of `GET /api/todos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoListResponse {
    /// Items in the requested order.
    pub todos: Vec<TodoJson>,
}

/// Response of `GET /api`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingResponse {
    /// Fixed greeting.
    pub message: String,
}

/// Empty object body, `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyResponse {}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error_message: String,
}

impl ErrorResponse {
    /// Creates an error body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
        }
    }
}
