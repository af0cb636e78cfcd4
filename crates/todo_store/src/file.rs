//! File-based log backend.

use crate::backend::LogBackend;
use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A log backend stored in a single file.
///
/// The file is locked exclusively for as long as the backend lives, so two
/// processes cannot append to the same log.
///
/// # Durability
///
/// - `sync()` calls `File::sync_all()`
/// - `replace()` writes and locks a sibling file, syncs it, renames it over
///   the log, then syncs the parent directory
///
/// # Example
///
/// ```no_run
/// use todo_store::{FileBackend, LogBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("todos.log")).unwrap();
/// backend.append(b"frame").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: File,
    size: u64,
}

impl FileBackend {
    /// Opens or creates the log file at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another process holds the file, or
    /// an I/O error if it cannot be opened.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = Self::open_locked(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
        })
    }

    /// Returns the path to the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_locked(path: &Path) -> StoreResult<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked(path.display().to_string()));
        }
        Ok(file)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".compact");
        self.path.with_file_name(name)
    }
}

impl LogBackend for FileBackend {
    fn read_all(&self) -> StoreResult<Vec<u8>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        let mut buffer = Vec::with_capacity(self.size as usize);
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StoreResult<u64> {
        let offset = self.size;
        if data.is_empty() {
            return Ok(offset);
        }
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(data)?;
        self.size += data.len() as u64;
        Ok(offset)
    }

    fn sync(&mut self) -> StoreResult<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    fn size(&self) -> StoreResult<u64> {
        Ok(self.size)
    }

    fn truncate(&mut self, new_size: u64) -> StoreResult<()> {
        if new_size > self.size {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "cannot truncate to size {} which is greater than current size {}",
                    new_size, self.size
                ),
            )
            .into());
        }
        self.file.set_len(new_size)?;
        self.file.sync_all()?;
        self.size = new_size;
        Ok(())
    }

    fn replace(&mut self, data: &[u8]) -> StoreResult<()> {
        let staging = self.staging_path();
        let file = match Self::write_staging(&staging, data) {
            Ok(file) => file,
            Err(e) => {
                let _ = fs::remove_file(&staging);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        // The staging handle already holds the lock on the new inode.
        let _ = self.file.unlock();
        self.file = file;
        self.size = data.len() as u64;

        sync_parent_dir(&self.path)
    }
}

impl FileBackend {
    /// Writes `data` to a fresh, locked staging file and syncs it.
    fn write_staging(staging: &Path, data: &[u8]) -> StoreResult<File> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(staging)?;
        if file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked(staging.display().to_string()));
        }
        file.write_all(data)?;
        file.sync_all()?;
        Ok(file)
    }
}

/// Syncs the directory holding `path` so a rename into it is durable.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> StoreResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

/// NTFS journals metadata; directories cannot be fsynced on Windows.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> StoreResult<()> {
    Ok(())
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
