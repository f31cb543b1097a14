//! Multibyte integer decoding.
//!
//! Little-endian base-128: every byte carries seven value bits, the high bit
//! marks that another byte follows.  The format caps an encoding at nine
//! bytes, which keeps every value below 2^63.

use byteorder::ReadBytesExt;
use std::io::Read;

use crate::error::{read_error, FormatError};

/// Longest legal encoding in bytes.
pub const MAX_LEN: usize = 9;

/// Decode one multibyte integer from `reader`.
///
/// Returns `(value, bytes_consumed)`; callers that track a size budget need
/// the byte count as much as the value.
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<(u64, usize), FormatError> {
    let mut value = 0u64;
    for i in 0..MAX_LEN {
        let byte = reader.read_u8().map_err(read_error("multibyte integer"))?;
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(FormatError::OversizedInteger)
}
