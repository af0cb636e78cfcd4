//! The item store: committed index plus single-writer transactions.

use crate::backend::LogBackend;
use crate::error::{StoreError, StoreResult};
use crate::file::FileBackend;
use crate::id::ItemId;
use crate::item::Item;
use crate::memory::InMemoryBackend;
use crate::record::{decode_log, CommitRecord, WriteOp};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Committed items, indexed by identity and by order value.
#[derive(Debug, Default)]
struct State {
    by_id: BTreeMap<ItemId, Item>,
    by_order: BTreeMap<i64, BTreeSet<ItemId>>,
}

impl State {
    fn apply(&mut self, op: WriteOp) {
        match op {
            WriteOp::Put(item) => {
                if let Some(old) = self.by_id.remove(&item.id) {
                    self.unindex(old.order, old.id);
                }
                self.by_order.entry(item.order).or_default().insert(item.id);
                self.by_id.insert(item.id, item);
            }
            WriteOp::Delete(id) => {
                if let Some(old) = self.by_id.remove(&id) {
                    self.unindex(old.order, old.id);
                }
            }
        }
    }

    fn unindex(&mut self, order: i64, id: ItemId) {
        if let Some(ids) = self.by_order.get_mut(&order) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_order.remove(&order);
            }
        }
    }

    fn first_at_order(&self, order: i64) -> Option<&Item> {
        self.by_order
            .get(&order)
            .and_then(|ids| ids.iter().next())
            .and_then(|id| self.by_id.get(id))
    }
}

/// The writer half: only one exists and it is behind a mutex.
struct Writer {
    backend: Box<dyn LogBackend>,
    next_sequence: u64,
}

/// Summary numbers for inspection and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of live items.
    pub items: usize,
    /// Size of the commit log in bytes.
    pub log_bytes: u64,
    /// Sequence number the next commit will get.
    pub next_sequence: u64,
}

/// Embedded document store for todo items.
///
/// Every mutation goes through [`TodoStore::transaction`], which holds the
/// single write lock for the duration of the closure and turns all of its
/// writes into one commit frame. Readers see committed state only and never
/// wait on each other.
///
/// # Example
///
/// ```rust
/// use todo_store::{Item, StoreError, TodoStore};
///
/// let store = TodoStore::open_in_memory().unwrap();
/// let item = store
///     .transaction(|txn| {
///         let order = txn.max_order().map_or(1, |max| max + 1);
///         let item = Item::new("buy milk", order);
///         txn.put(item.clone());
///         Ok::<_, StoreError>(item)
///     })
///     .unwrap();
/// assert_eq!(store.get(item.id), Some(item));
/// ```
pub struct TodoStore {
    state: RwLock<State>,
    writer: Mutex<Writer>,
}

impl TodoStore {
    /// Opens (or creates) a store backed by the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is locked by another process or the log
    /// cannot be replayed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let backend = FileBackend::open(path)?;
        let store = Self::with_backend(backend)?;
        info!(path = %path.display(), items = store.len(), "opened todo store");
        Ok(store)
    }

    /// Loads a detached copy of the log at `path` without locking or
    /// modifying it.
    ///
    /// A torn trailing frame is skipped, not truncated. Writes to the returned
    /// store stay in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a complete frame is
    /// corrupt.
    pub fn open_snapshot(path: &Path) -> StoreResult<Self> {
        let mut bytes = fs::read(path)?;
        let valid_len = decode_log(&bytes)?.valid_len;
        if valid_len < bytes.len() as u64 {
            warn!(
                path = %path.display(),
                valid_len,
                total_len = bytes.len(),
                "ignoring torn commit at end of log"
            );
            bytes.truncate(valid_len as usize);
        }
        Self::with_backend(InMemoryBackend::with_data(bytes))
    }

    /// Opens an empty store that lives only in memory.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_backend(InMemoryBackend::new())
    }

    /// Opens a store over an arbitrary backend, replaying its log.
    ///
    /// A torn trailing frame is dropped and the log truncated back to the
    /// last complete commit.
    ///
    /// # Errors
    ///
    /// Returns an error if a complete frame is corrupt.
    pub fn with_backend(backend: impl LogBackend + 'static) -> StoreResult<Self> {
        let mut backend: Box<dyn LogBackend> = Box::new(backend);
        let bytes = backend.read_all()?;
        let decoded = decode_log(&bytes)?;

        if decoded.torn_tail {
            warn!(
                valid_len = decoded.valid_len,
                total_len = bytes.len(),
                "discarding torn commit at end of log"
            );
            backend.truncate(decoded.valid_len)?;
        }

        let mut state = State::default();
        let mut next_sequence = 1;
        for record in decoded.records {
            next_sequence = record.sequence + 1;
            for op in record.ops {
                state.apply(op);
            }
        }

        Ok(Self {
            state: RwLock::new(state),
            writer: Mutex::new(Writer {
                backend,
                next_sequence,
            }),
        })
    }

    /// Runs `f` as one atomic write transaction.
    ///
    /// The closure sees committed state overlaid with its own pending writes.
    /// If it returns `Ok`, all writes are appended as a single commit, made
    /// durable, and then published. If it returns `Err`, nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a [`StoreError`] converted into `E`
    /// if the commit cannot be written.
    pub fn transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut WriteTxn<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut writer = self.writer.lock();

        let mut txn = WriteTxn::new(&self.state);
        let value = f(&mut txn)?;
        let ops = txn.into_ops();
        if ops.is_empty() {
            return Ok(value);
        }

        let record = CommitRecord {
            sequence: writer.next_sequence,
            ops,
        };
        let frame = record.to_frame()?;

        append_durably(writer.backend.as_mut(), &frame)?;
        writer.next_sequence += 1;

        debug!(
            sequence = record.sequence,
            ops = record.ops.len(),
            "committed transaction"
        );

        let mut state = self.state.write();
        for op in record.ops {
            state.apply(op);
        }

        Ok(value)
    }

    /// Gets a committed item by identity.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.state.read().by_id.get(&id).cloned()
    }

    /// Finds a committed item holding `order`.
    ///
    /// If several items share the value, the one with the smallest identity
    /// is returned.
    #[must_use]
    pub fn find_by_order(&self, order: i64) -> Option<Item> {
        self.state.read().first_at_order(order).cloned()
    }

    /// Returns the largest committed order value, if any item exists.
    #[must_use]
    pub fn max_order(&self) -> Option<i64> {
        self.state
            .read()
            .by_order
            .last_key_value()
            .map(|(order, _)| *order)
    }

    /// Returns all committed items sorted by order, then identity.
    #[must_use]
    pub fn list(&self) -> Vec<Item> {
        let state = self.state.read();
        state
            .by_order
            .values()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| state.by_id.get(id).cloned())
            .collect()
    }

    /// Returns the number of committed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().by_id.len()
    }

    /// Returns true if the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns summary numbers about the store.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let writer = self.writer.lock();
        Ok(StoreStats {
            items: self.len(),
            log_bytes: writer.backend.size()?,
            next_sequence: writer.next_sequence,
        })
    }

    /// Rewrites the log as a single snapshot commit of the live items.
    ///
    /// Returns the number of bytes reclaimed.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written. A failure before
    /// the snapshot is renamed over the log leaves the old log in use.
    pub fn compact(&self) -> StoreResult<u64> {
        let mut writer = self.writer.lock();
        let before = writer.backend.size()?;

        let ops = self
            .state
            .read()
            .by_id
            .values()
            .cloned()
            .map(WriteOp::Put)
            .collect();
        let record = CommitRecord {
            sequence: writer.next_sequence,
            ops,
        };
        let frame = record.to_frame()?;
        writer.backend.replace(&frame)?;
        writer.next_sequence += 1;

        let after = writer.backend.size()?;
        info!(before, after, "compacted todo log");
        Ok(before.saturating_sub(after))
    }
}

/// Appends and syncs one frame, cutting the log back if either step fails.
fn append_durably(backend: &mut dyn LogBackend, frame: &[u8]) -> StoreResult<()> {
    let rollback_to = backend.size()?;
    let result = backend.append(frame).and_then(|_| backend.sync());
    if result.is_err() {
        if let Err(cleanup) = backend.truncate(rollback_to) {
            warn!(error = %cleanup, "failed to roll back partial commit");
        }
    }
    result
}

/// A write transaction handed to [`TodoStore::transaction`].
///
/// Reads observe committed state overlaid with this transaction's own
/// pending writes.
pub struct WriteTxn<'a> {
    committed: &'a RwLock<State>,
    pending: HashMap<ItemId, Option<Item>>,
    ops: Vec<WriteOp>,
}

impl<'a> WriteTxn<'a> {
    fn new(committed: &'a RwLock<State>) -> Self {
        Self {
            committed,
            pending: HashMap::new(),
            ops: Vec::new(),
        }
    }

    fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Gets an item by identity.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<Item> {
        match self.pending.get(&id) {
            Some(pending) => pending.clone(),
            None => self.committed.read().by_id.get(&id).cloned(),
        }
    }

    /// Finds an item holding `order`.
    ///
    /// Pending writes win over committed items; among several candidates the
    /// smallest identity is returned.
    #[must_use]
    pub fn find_by_order(&self, order: i64) -> Option<Item> {
        let pending = self
            .pending
            .values()
            .flatten()
            .filter(|item| item.order == order)
            .min_by_key(|item| item.id);

        let state = self.committed.read();
        let committed = state
            .by_order
            .get(&order)
            .into_iter()
            .flatten()
            .find(|id| !self.pending.contains_key(id))
            .and_then(|id| state.by_id.get(id));

        match (pending, committed) {
            (Some(p), Some(c)) => Some(std::cmp::min_by_key(p, c, |item| item.id).clone()),
            (Some(p), None) => Some(p.clone()),
            (None, Some(c)) => Some(c.clone()),
            (None, None) => None,
        }
    }

    /// Returns the largest order value visible to this transaction.
    #[must_use]
    pub fn max_order(&self) -> Option<i64> {
        let pending = self.pending.values().flatten().map(|item| item.order).max();

        let state = self.committed.read();
        let committed = state
            .by_order
            .iter()
            .rev()
            .find(|(_, ids)| ids.iter().any(|id| !self.pending.contains_key(id)))
            .map(|(order, _)| *order);

        pending.max(committed)
    }

    /// Inserts or overwrites an item.
    pub fn put(&mut self, item: Item) {
        self.pending.insert(item.id, Some(item.clone()));
        self.ops.push(WriteOp::Put(item));
    }

    /// Deletes an item. Returns true if it was visible before the call.
    pub fn delete(&mut self, id: ItemId) -> bool {
        let existed = self.get(id).is_some();
        if existed {
            self.pending.insert(id, None);
            self.ops.push(WriteOp::Delete(id));
        }
        existed
    }

    /// Returns the number of writes issued so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.ops.len()
    }
}
