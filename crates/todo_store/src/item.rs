//! The stored todo document.

use crate::id::ItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo entry as stored in the log.
///
/// The store does not validate `value` or `order`; callers own those rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Immutable identity.
    pub id: ItemId,
    /// Human-readable text.
    pub value: String,
    /// Position in the list. Lower values sort first.
    pub order: i64,
    /// When the item was completed, if it is.
    pub done_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Creates an uncompleted item with a fresh identity.
    pub fn new(value: impl Into<String>, order: i64) -> Self {
        Self {
            id: ItemId::new(),
            value: value.into(),
            order,
            done_at: None,
        }
    }

    /// Returns true if the item has been completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done_at.is_some()
    }
}
