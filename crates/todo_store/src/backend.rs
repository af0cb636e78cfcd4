//! Log backend trait definition.

use crate::error::StoreResult;

/// A byte-level home for the commit log.
///
/// Backends are **opaque byte stores**: they never interpret frames or
/// records. The store owns the log format.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `read_all` returns every byte appended since the last `replace`/`truncate`
/// - `sync` makes all appended data durable
/// - `replace` swaps the entire contents atomically with respect to readers
///   of the backend after it returns
pub trait LogBackend: Send + Sync {
    /// Reads the whole log.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_all(&self) -> StoreResult<Vec<u8>>;

    /// Appends data to the end of the log.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StoreResult<u64>;

    /// Makes all appended data durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StoreResult<()>;

    /// Returns the current size of the log in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StoreResult<u64>;

    /// Cuts the log back to `new_size` bytes.
    ///
    /// Used on open to drop a torn trailing frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_size` is greater than the current size or
    /// the truncation fails.
    fn truncate(&mut self, new_size: u64) -> StoreResult<()>;

    /// Replaces the whole log with `data`.
    ///
    /// Used by compaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the new contents cannot be written.
    fn replace(&mut self, data: &[u8]) -> StoreResult<()>;
}
