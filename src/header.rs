use serde::Serialize;

use crate::cursor::{ByteCursor, ByteSource};
use crate::error::FormatError;

/// Stream header magic: 0xFD, '7', 'z', 'X', 'Z', 0x00
pub const MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Checksum table indexed by the stream-flags selector: (bytes, name).
pub const CHECK_TABLE: [(usize, &str); 16] = [
    (0,  "None"),
    (4,  "CRC32"),
    (4,  "Reserved"),
    (4,  "Reserved"),
    (8,  "CRC64"),
    (8,  "Reserved"),
    (8,  "Reserved"),
    (16, "Reserved"),
    (16, "Reserved"),
    (16, "Reserved"),
    (32, "SHA-256"),
    (32, "Reserved"),
    (32, "Reserved"),
    (64, "Reserved"),
    (64, "Reserved"),
    (64, "Reserved"),
];

/// The block checksum algorithm a stream declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Check {
    pub id:   u8,
    /// Bytes of checksum trailing every block.
    pub size: usize,
    pub name: &'static str,
}

impl Check {
    /// Look up a selector; `None` outside the 16-entry table.
    pub fn from_id(id: u8) -> Option<Self> {
        CHECK_TABLE
            .get(usize::from(id))
            .map(|&(size, name)| Check { id, size, name })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamHeader {
    pub flags: [u8; 2],
    pub check: Check,
    /// Read, never verified.
    pub crc32: u32,
}

impl StreamHeader {
    pub(crate) fn read<S: ByteSource>(cursor: &mut ByteCursor<S>) -> Result<Self, FormatError> {
        let magic: [u8; 6] = cursor.read_array("stream header magic")?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic { found: magic });
        }
        let flags: [u8; 2] = cursor.read_array("stream header flags")?;
        let check = Check::from_id(flags[1]).ok_or(FormatError::UnsupportedChecksum(flags[1]))?;
        let crc32 = cursor.read_u32_le("stream header CRC32")?;
        Ok(Self { flags, check, crc32 })
    }
}
