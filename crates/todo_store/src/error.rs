//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing the item log.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A commit record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The log contains bytes that are not a valid commit frame.
    #[error("log corrupted at offset {offset}: {message}")]
    Corrupted {
        /// Byte offset of the offending frame.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A complete frame failed its checksum.
    #[error("checksum mismatch at offset {offset}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Byte offset of the offending frame.
        offset: u64,
        /// Checksum stored in the frame.
        expected: u32,
        /// Checksum computed from the frame contents.
        actual: u32,
    },

    /// Another process holds the log file.
    #[error("store locked: another process has exclusive access to {0}")]
    Locked(String),
}

impl StoreError {
    /// Creates a corruption error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }

    /// Creates a codec error from any displayable cause.
    pub fn codec(cause: impl std::fmt::Display) -> Self {
        Self::Codec(cause.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_display_is_hex() {
        let err = StoreError::ChecksumMismatch {
            offset: 12,
            expected: 0xdead_beef,
            actual: 0x0000_0001,
        };
        let msg = err.to_string();
        assert!(msg.contains("deadbeef"));
        assert!(msg.contains("00000001"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn io_converts() {
        let err: StoreError = io::Error::new(io::ErrorKind::Other, "disk gone").into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
