//! In-memory log backend.

use crate::backend::LogBackend;
use crate::error::StoreResult;
use std::io;

/// A log backend that keeps everything in memory.
///
/// Suitable for unit tests, integration tests and servers started without
/// a data path. Nothing survives the process.
///
/// # Example
///
/// ```rust
/// use todo_store::{InMemoryBackend, LogBackend};
///
/// let mut backend = InMemoryBackend::new();
/// let offset = backend.append(b"frame").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(backend.size().unwrap(), 5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    data: Vec<u8>,
}

impl InMemoryBackend {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with pre-existing log bytes.
    ///
    /// Useful for testing recovery.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the raw log bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl LogBackend for InMemoryBackend {
    fn read_all(&self) -> StoreResult<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn append(&mut self, new_data: &[u8]) -> StoreResult<u64> {
        let offset = self.data.len() as u64;
        self.data.extend_from_slice(new_data);
        Ok(offset)
    }

    fn sync(&mut self) -> StoreResult<()> {
        Ok(())
    }

    fn size(&self) -> StoreResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn truncate(&mut self, new_size: u64) -> StoreResult<()> {
        let current_size = self.data.len() as u64;
        if new_size > current_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "cannot truncate to size {} which is greater than current size {}",
                    new_size, current_size
                ),
            )
            .into());
        }
        self.data.truncate(new_size as usize);
        Ok(())
    }

    fn replace(&mut self, data: &[u8]) -> StoreResult<()> {
        self.data = data.to_vec();
        Ok(())
    }
}
