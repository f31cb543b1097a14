use serde::Serialize;

use crate::cursor::{ByteCursor, ByteSource};
use crate::error::FormatError;

/// Stream footer magic: 'Y', 'Z'
pub const FOOTER_MAGIC: [u8; 2] = [0x59, 0x5A];

#[derive(Debug, Clone, Serialize)]
pub struct StreamFooter {
    /// Read, never verified.
    pub crc32:         u32,
    /// Stored backward size; the index is `(backward_size + 1) * 4` bytes.
    pub backward_size: u32,
    pub flags:         [u8; 2],
    pub magic:         [u8; 2],
}

impl StreamFooter {
    /// Read the footer fields.  The magic is returned as found; whether a
    /// mismatch is fatal is the caller's decision.
    pub(crate) fn read<S: ByteSource>(cursor: &mut ByteCursor<S>) -> Result<Self, FormatError> {
        Ok(Self {
            crc32:         cursor.read_u32_le("stream footer CRC32")?,
            backward_size: cursor.read_u32_le("stream footer backward size")?,
            flags:         cursor.read_array("stream footer flags")?,
            magic:         cursor.read_array("stream footer magic")?,
        })
    }

    /// Index size in bytes implied by the backward size field.
    pub fn index_size(&self) -> u64 {
        (u64::from(self.backward_size) + 1) * 4
    }

    pub fn has_magic(&self) -> bool {
        self.magic == FOOTER_MAGIC
    }
}
