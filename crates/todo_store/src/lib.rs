//! # Todo Store
//!
//! Embedded document store for todo items.
//!
//! The store keeps every live item in memory, indexed by identity and by
//! order value, and records every committed transaction as one frame in an
//! append-only log. Opening a store replays the log.
//!
//! ## Design Principles
//!
//! - One writer at a time; a transaction's writes commit together or not at all
//! - Readers see committed state only and never block each other
//! - Backends are opaque byte stores; the store owns the log format
//! - A torn trailing frame is dropped on open, any other damage is an error
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For tests and ephemeral servers
//! - [`FileBackend`] - A single exclusively locked log file
//!
//! ## Example
//!
//! ```rust
//! use todo_store::{Item, StoreError, TodoStore};
//!
//! let store = TodoStore::open_in_memory().unwrap();
//! store
//!     .transaction(|txn| {
//!         txn.put(Item::new("water the plants", 1));
//!         Ok::<_, StoreError>(())
//!     })
//!     .unwrap();
//! assert_eq!(store.max_order(), Some(1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod id;
mod item;
mod memory;
mod record;
mod store;

pub use backend::LogBackend;
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use id::ItemId;
pub use item::Item;
pub use memory::InMemoryBackend;
pub use record::{compute_crc32, decode_log, CommitRecord, DecodedLog, WriteOp, LOG_MAGIC, LOG_VERSION};
pub use store::{StoreStats, TodoStore, WriteTxn};
