//! Block parsing.
//!
//! # Block header layout
//!
//! | Field | Size |
//! |-------|------|
//! | encoded header size | 1 B (real size = (value + 1) × 4; 0x00 = index follows) |
//! | block flags | 1 B |
//! | compressed size | multibyte, present when flags & 0x40 |
//! | uncompressed size | multibyte, present when flags & 0x80 |
//! | filter flags × (flags & 0x03) + 1 | id (multibyte), properties length (multibyte), properties |
//! | header padding | to the declared header size |
//! | header CRC32 | 4 B |
//!
//! The header is followed by the compressed data, zero padding up to a
//! multiple of four, and the stream's check.  The data itself is skipped;
//! filter properties are carried as opaque bytes.

use serde::Serialize;

use crate::cursor::{ByteCursor, ByteSource};
use crate::error::FormatError;
use crate::header::Check;

pub const FLAG_FILTER_COUNT:      u8 = 0x03;
pub const FLAG_RESERVED:          u8 = 0x3C;
pub const FLAG_COMPRESSED_SIZE:   u8 = 0x40;
pub const FLAG_UNCOMPRESSED_SIZE: u8 = 0x80;

/// Bytes of header CRC32 closing every block header.
const HEADER_CRC_LEN: usize = 4;

/// One entry of a block's filter chain.  Never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub id:         u64,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub properties: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockHeader {
    /// Real header size in bytes, size byte and CRC32 included.
    pub size:              usize,
    pub flags:             u8,
    pub compressed_size:   Option<u64>,
    pub uncompressed_size: Option<u64>,
    pub filters:           Vec<Filter>,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub padding:           Vec<u8>,
    /// Read, never verified.
    pub crc32:             u32,
}

/// Remaining-byte budget of a block header being parsed.
struct HeaderBudget {
    block:       usize,
    header_size: usize,
    remaining:   usize,
}

impl HeaderBudget {
    fn spend(&mut self, n: usize) -> Result<(), FormatError> {
        self.remaining = self
            .remaining
            .checked_sub(n)
            .ok_or(FormatError::InvalidBlockHeaderSize {
                block:       self.block,
                header_size: self.header_size,
            })?;
        Ok(())
    }
}

impl BlockHeader {
    /// Parse a block header whose size byte (`encoded_size`, non-zero) has
    /// already been consumed.
    pub(crate) fn read<S: ByteSource>(
        cursor:       &mut ByteCursor<S>,
        block:        usize,
        encoded_size: u8,
    ) -> Result<Self, FormatError> {
        let size = (usize::from(encoded_size) + 1) * 4;
        // The size byte and the flags byte.
        let mut budget = HeaderBudget { block, header_size: size, remaining: size - 2 };

        let flags = cursor.read_u8("block flags")?;
        if flags & FLAG_RESERVED != 0 {
            return Err(FormatError::InvalidBlockFlags { block, flags });
        }

        let compressed_size = if flags & FLAG_COMPRESSED_SIZE != 0 {
            let (value, n) = cursor.read_varint()?;
            budget.spend(n)?;
            Some(value)
        } else {
            None
        };

        let uncompressed_size = if flags & FLAG_UNCOMPRESSED_SIZE != 0 {
            let (value, n) = cursor.read_varint()?;
            budget.spend(n)?;
            Some(value)
        } else {
            None
        };

        let filter_count = usize::from(flags & FLAG_FILTER_COUNT) + 1;
        let mut filters = Vec::with_capacity(filter_count);
        for _ in 0..filter_count {
            let (id, n) = cursor.read_varint()?;
            budget.spend(n)?;
            let (props_len, n) = cursor.read_varint()?;
            budget.spend(n)?;
            // Checked against the budget before allocating.
            let props_len = usize::try_from(props_len).unwrap_or(usize::MAX);
            budget.spend(props_len)?;
            let properties = cursor.read_bytes(props_len, "filter properties")?;
            filters.push(Filter { id, properties });
        }

        let padding_len = budget.remaining.checked_sub(HEADER_CRC_LEN).ok_or(
            FormatError::InvalidBlockHeaderSize { block, header_size: size },
        )?;
        let padding = cursor.read_bytes(padding_len, "block header padding")?;
        let crc32 = cursor.read_u32_le("block header CRC32")?;

        Ok(Self {
            size,
            flags,
            compressed_size,
            uncompressed_size,
            filters,
            padding,
            crc32,
        })
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }
}

/// A fully walked block.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// Zero-based position in the stream.
    pub number:            usize,
    /// Byte offset of the header size byte from the start of the stream.
    pub offset:            u64,
    pub header:            BlockHeader,
    pub compressed_size:   u64,
    /// Declared in the header, or taken from the index when the header
    /// omits it.  `None` only until the index has been read.
    pub uncompressed_size: Option<u64>,
    /// Zero bytes between the data and the check (0–3).
    pub data_padding:      usize,
    /// Read, never verified.
    #[serde(serialize_with = "hex::serde::serialize")]
    pub check:             Vec<u8>,
}

impl Block {
    /// Size as recorded in the index: header + data + check, padding excluded.
    pub fn unpadded_size(&self) -> u64 {
        self.header.size as u64 + self.compressed_size + self.check.len() as u64
    }

    /// Walk one block whose non-zero size byte has just been read at `offset`.
    pub(crate) fn read<S: ByteSource>(
        cursor:       &mut ByteCursor<S>,
        number:       usize,
        offset:       u64,
        encoded_size: u8,
        check:        Check,
    ) -> Result<Self, FormatError> {
        let header = BlockHeader::read(cursor, number, encoded_size)?;
        let compressed_size = header
            .compressed_size
            .ok_or(FormatError::MissingCompressedSize(number))?;

        cursor.skip(compressed_size, "block data")?;

        let data_padding = padding_to_four(compressed_size);
        let padding = cursor.read_bytes(data_padding, "block padding")?;
        if let Some(&byte) = padding.iter().find(|&&b| b != 0) {
            return Err(FormatError::CorruptPadding { block: number, byte });
        }

        let check = cursor.read_bytes(check.size, "block check")?;

        Ok(Self {
            number,
            offset,
            uncompressed_size: header.uncompressed_size,
            header,
            compressed_size,
            data_padding,
            check,
        })
    }
}

/// Bytes needed to bring `len` up to the next multiple of four.
pub(crate) fn padding_to_four(len: u64) -> usize {
    ((4 - len % 4) % 4) as usize
}
