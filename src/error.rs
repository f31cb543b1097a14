use std::io;
use thiserror::Error;

use crate::header::MAGIC;
use crate::scanner::ScanWarning;

/// Every way a scan can fail.  All variants are terminal for the scan that
/// produced them; no partial totals are returned alongside an error.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The first six bytes are not the XZ stream magic.
    #[error("Not an XZ stream: expected magic {}, found {}", hex::encode(MAGIC), hex::encode(.found))]
    BadMagic { found: [u8; 6] },

    /// Stream-flags checksum selector outside the 16-entry table.
    #[error("Unsupported checksum selector {0:#04x}")]
    UnsupportedChecksum(u8),

    /// A reserved bit (mask `0x3c`) is set in a block-flags byte.
    #[error("Invalid flags {flags:#04x} in block {block}: reserved bits set")]
    InvalidBlockFlags { block: usize, flags: u8 },

    /// Non-zero byte in the padding that follows a block's data.
    #[error("Corrupt padding after data of block {block}: found byte {byte:#04x}")]
    CorruptPadding { block: usize, byte: u8 },

    /// End of input reached while the named field was being read.
    #[error("Truncated input while reading {0}")]
    TruncatedInput(&'static str),

    /// The parsed header fields do not fit the declared block header size.
    #[error("Block {block} header fields overrun the declared header size of {header_size} bytes")]
    InvalidBlockHeaderSize { block: usize, header_size: usize },

    #[error("Block {0} does not declare its compressed size")]
    MissingCompressedSize(usize),

    #[error("Block {0} does not declare its uncompressed size and the index has no record for it")]
    MissingUncompressedSize(usize),

    /// Multibyte integer longer than the 9 bytes the format allows.
    #[error("Multibyte integer longer than 9 bytes")]
    OversizedInteger,

    #[error("Bad stream footer magic {}", hex::encode(.0))]
    BadFooterMagic([u8; 2]),

    /// A structural cross-check failed while scanning in strict mode.
    #[error("Inconsistent stream: {0}")]
    Inconsistent(ScanWarning),

    #[error("Size total does not fit in 64 bits")]
    SizeOverflow,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Maps a read error on `field` to [`FormatError`], turning end-of-input
/// into [`FormatError::TruncatedInput`].
pub(crate) fn read_error(field: &'static str) -> impl Fn(io::Error) -> FormatError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::TruncatedInput(field)
        } else {
            FormatError::Io(e)
        }
    }
}
