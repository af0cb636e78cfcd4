//! # Todo Core
//!
//! Domain logic for the todo service.
//!
//! This crate provides:
//! - [`TodoService`]: create, list, get, update and delete items
//! - [`reconcile_order`]: the swap that keeps order values unique when an
//!   item is moved
//! - Input validation for item text
//! - A [`Clock`] abstraction for completion timestamps
//!
//! All mutations run inside a single [`todo_store::TodoStore`] transaction,
//! so a move's two writes become visible together or not at all.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod error;
mod reconcile;
mod service;
mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{TodoError, TodoResult};
pub use reconcile::{reconcile_order, OrderSlots, Reconciled};
pub use service::{ItemPatch, SortDirection, TodoService};
pub use validate::{validate_value, MAX_VALUE_CHARS, MIN_VALUE_CHARS};

pub use todo_store::{Item, ItemId};
