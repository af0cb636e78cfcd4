//! The todo operations: create, list, get, update, delete.

use crate::clock::{Clock, SystemClock};
use crate::error::{TodoError, TodoResult};
use crate::reconcile::reconcile_order;
use crate::validate::validate_value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use todo_store::{Item, ItemId, TodoStore};
use tracing::{debug, info};

/// Direction for listing items by order value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Lowest order first.
    #[serde(alias = "ascending")]
    Asc,
    /// Highest order first.
    #[default]
    #[serde(alias = "descending")]
    Desc,
}

/// A partial update of an item.
///
/// Each field is optional; "falsy" values (`None`, an empty `value`, an
/// `order` of zero) leave the corresponding attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    /// New text.
    pub value: Option<String>,
    /// New order value, reconciled against the current occupant.
    pub order: Option<i64>,
    /// Mark completed (`true`) or not completed (`false`).
    pub done: Option<bool>,
}

impl ItemPatch {
    /// Sets the text.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the order value.
    #[must_use]
    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }
}

/// Todo operations over a shared [`TodoStore`].
///
/// Each mutating operation runs in exactly one store transaction, so a
/// reorder's two writes commit together and concurrent callers are
/// serialised by the store's write lock.
pub struct TodoService {
    store: Arc<TodoStore>,
    clock: Arc<dyn Clock>,
}

impl TodoService {
    /// Creates a service using wall-clock time.
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a service with a custom time source.
    pub fn with_clock(store: Arc<TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<TodoStore> {
        &self.store
    }

    /// Creates an item at the end of the list.
    ///
    /// The new item gets `max(order) + 1`, or `1` if the list is empty.
    pub fn create(&self, value: &str) -> TodoResult<Item> {
        validate_value(value)?;

        let item = self.store.transaction(|txn| {
            let order = match txn.max_order() {
                Some(max) => max.checked_add(1).ok_or_else(|| {
                    TodoError::validation(format!("no order value left after {}", max))
                })?,
                None => 1,
            };
            let item = Item::new(value, order);
            txn.put(item.clone());
            Ok::<_, TodoError>(item)
        })?;

        info!(item = %item.id, order = item.order, "created todo item");
        Ok(item)
    }

    /// Lists all items sorted by order value.
    ///
    /// Items sharing an order value are listed by identity.
    pub fn list(&self, direction: SortDirection) -> Vec<Item> {
        let mut items = self.store.list();
        if direction == SortDirection::Desc {
            items.reverse();
        }
        items
    }

    /// Gets one item.
    pub fn get(&self, id: ItemId) -> TodoResult<Item> {
        self.store.get(id).ok_or(TodoError::NotFound(Some(id)))
    }

    /// Applies `patch` to the item with identity `id`.
    ///
    /// Returns the item as stored after the update.
    pub fn update(&self, id: ItemId, patch: ItemPatch) -> TodoResult<Item> {
        let now = self.clock.now();

        self.store.transaction(|txn| {
            let before = txn.get(id).ok_or(TodoError::NotFound(Some(id)))?;
            let mut item = before.clone();

            if let Some(value) = patch.value.as_deref().filter(|v| !v.is_empty()) {
                validate_value(value)?;
                item.value = value.to_string();
            }

            if let Some(done) = patch.done {
                item.done_at = done.then_some(now);
            }

            let outcome = reconcile_order(txn, &mut item, patch.order);
            if !outcome.is_changed() && item != before {
                txn.put(item.clone());
            }

            debug!(item = %id, ?outcome, writes = txn.write_count(), "updated todo item");
            Ok(item)
        })
    }

    /// Deletes the item with identity `id`.
    pub fn delete(&self, id: ItemId) -> TodoResult<()> {
        self.store.transaction(|txn| {
            if txn.delete(id) {
                Ok(())
            } else {
                Err(TodoError::NotFound(Some(id)))
            }
        })?;

        info!(item = %id, "deleted todo item");
        Ok(())
    }
}
