//! Stream index: one (unpadded size, uncompressed size) record per block.
//!
//! ```text
//! 0x00 indicator | record count | records... | padding to 4 | CRC32
//! ```
//!
//! The indicator byte is consumed by the block loop before [`Index::read`]
//! runs, but still counts towards the index size and its padding.

use serde::Serialize;

use crate::block::padding_to_four;
use crate::cursor::{ByteCursor, ByteSource};
use crate::error::FormatError;

/// Upper bound on records pre-allocated from an untrusted count.
const PREALLOC_RECORDS: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    pub unpadded_size:     u64,
    pub uncompressed_size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Index {
    pub records: Vec<IndexRecord>,
    /// Total index size in bytes, indicator and CRC32 included.
    pub size:    u64,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub padding: Vec<u8>,
    /// Read, never verified.
    pub crc32:   u32,
}

impl Index {
    pub(crate) fn read<S: ByteSource>(cursor: &mut ByteCursor<S>) -> Result<Self, FormatError> {
        let (count, n) = cursor.read_varint()?;
        let mut consumed = 1 + n as u64;

        let mut records = Vec::with_capacity(count.min(PREALLOC_RECORDS) as usize);
        for _ in 0..count {
            let (unpadded_size, a) = cursor.read_varint()?;
            let (uncompressed_size, b) = cursor.read_varint()?;
            consumed += (a + b) as u64;
            records.push(IndexRecord { unpadded_size, uncompressed_size });
        }

        let padding = cursor.read_bytes(padding_to_four(consumed), "index padding")?;
        let crc32 = cursor.read_u32_le("index CRC32")?;

        Ok(Self {
            size: consumed + padding.len() as u64 + 4,
            records,
            padding,
            crc32,
        })
    }
}
