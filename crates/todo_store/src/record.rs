//! Commit records and their on-disk framing.
//!
//! Every committed transaction becomes one frame:
//!
//! ```text
//! | magic (4) | version (2) | length (4) | payload (N) | crc32 (4) |
//! ```
//!
//! The payload is a CBOR-encoded [`CommitRecord`]. Integers are little
//! endian and the checksum covers header and payload.

use crate::error::{StoreError, StoreResult};
use crate::id::ItemId;
use crate::item::Item;
use serde::{Deserialize, Serialize};

/// Magic bytes identifying a commit frame.
pub const LOG_MAGIC: [u8; 4] = *b"TDLG";

/// Current log format version.
pub const LOG_VERSION: u16 = 1;

const HEADER_SIZE: usize = 4 + 2 + 4;
const TRAILER_SIZE: usize = 4;

/// A single write inside a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
    /// Insert or overwrite an item.
    Put(Item),
    /// Remove an item.
    Delete(ItemId),
}

/// All writes of one transaction, applied together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit sequence number, strictly increasing.
    pub sequence: u64,
    /// Writes in the order they were issued.
    pub ops: Vec<WriteOp>,
}

impl CommitRecord {
    /// Encodes the record into a complete frame.
    pub fn to_frame(&self) -> StoreResult<Vec<u8>> {
        let mut payload = Vec::new();
        ciborium::into_writer(self, &mut payload).map_err(StoreError::codec)?;

        let len = u32::try_from(payload.len())
            .map_err(|_| StoreError::codec("commit record larger than 4 GiB"))?;

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len() + TRAILER_SIZE);
        frame.extend_from_slice(&LOG_MAGIC);
        frame.extend_from_slice(&LOG_VERSION.to_le_bytes());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&payload);
        let crc = compute_crc32(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());
        Ok(frame)
    }
}

/// Result of scanning a log.
#[derive(Debug, Default)]
pub struct DecodedLog {
    /// Complete, verified records in log order.
    pub records: Vec<CommitRecord>,
    /// Length of the prefix made of complete frames.
    pub valid_len: u64,
    /// True if bytes after `valid_len` form an incomplete frame.
    pub torn_tail: bool,
}

/// Scans a log buffer into commit records.
///
/// An incomplete trailing frame is reported through
/// [`DecodedLog::torn_tail`] rather than as an error: it is what a crash in
/// the middle of an append leaves behind.
///
/// # Errors
///
/// Returns an error for bad magic, an unknown version, a checksum mismatch
/// on a complete frame, or an undecodable payload.
pub fn decode_log(bytes: &[u8]) -> StoreResult<DecodedLog> {
    let mut decoded = DecodedLog::default();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let rest = &bytes[offset..];
        if rest.len() < HEADER_SIZE {
            decoded.torn_tail = true;
            break;
        }

        if rest[0..4] != LOG_MAGIC {
            return Err(StoreError::corrupted(offset as u64, "bad frame magic"));
        }

        let version = u16::from_le_bytes([rest[4], rest[5]]);
        if version != LOG_VERSION {
            return Err(StoreError::corrupted(
                offset as u64,
                format!("unsupported log version {}", version),
            ));
        }

        let len = u32::from_le_bytes([rest[6], rest[7], rest[8], rest[9]]) as usize;
        let frame_len = HEADER_SIZE + len + TRAILER_SIZE;
        if rest.len() < frame_len {
            decoded.torn_tail = true;
            break;
        }

        let body_end = HEADER_SIZE + len;
        let stored = u32::from_le_bytes([
            rest[body_end],
            rest[body_end + 1],
            rest[body_end + 2],
            rest[body_end + 3],
        ]);
        let computed = compute_crc32(&rest[..body_end]);
        if stored != computed {
            return Err(StoreError::ChecksumMismatch {
                offset: offset as u64,
                expected: stored,
                actual: computed,
            });
        }

        let record: CommitRecord =
            ciborium::from_reader(&rest[HEADER_SIZE..body_end]).map_err(StoreError::codec)?;
        decoded.records.push(record);

        offset += frame_len;
        decoded.valid_len = offset as u64;
    }

    Ok(decoded)
}

/// Computes the CRC32 (IEEE) checksum of `data`.
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}
