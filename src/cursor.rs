//! Forward-only byte cursor shared by every parsing step.
//!
//! The cursor counts consumed bytes (block offsets and the index size are
//! derived from it) and maps end-of-input on any field to
//! [`FormatError::TruncatedInput`].  Block data is never inspected, only
//! skipped; how it is skipped depends on the [`ByteSource`]:
//!
//! | Source | Skip strategy |
//! |--------|---------------|
//! | [`Streamed`] | read through into a sink (any `Read`) |
//! | [`Seekable`] | seek forward, bounded by the stream length; short skips read through |

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{read_error, FormatError};
use crate::varint;

// ── Sources ───────────────────────────────────────────────────────────────────

/// A readable source that can also skip bytes it does not need to see.
pub trait ByteSource: Read {
    /// Skip up to `n` bytes; returns how many were actually skipped.
    fn skip(&mut self, n: u64) -> io::Result<u64>;
}

/// Plain `Read` source.  Skipped bytes are still read, then discarded.
pub struct Streamed<R>(pub R);

impl<R: Read> Read for Streamed<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> ByteSource for Streamed<R> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        io::copy(&mut self.0.by_ref().take(n), &mut io::sink())
    }
}

/// Seekable source.  Skipping is a seek, clamped to the stream length so a
/// truncated file is still detected.  Skips no longer than
/// [`SEEK_THRESHOLD`] are read through instead, which keeps a `BufReader`'s
/// buffer alive across small blocks.
pub struct Seekable<R> {
    inner: R,
    pos:   u64,
    end:   u64,
}

/// Longest skip served by reading rather than seeking (`BufReader`'s
/// default capacity).
pub const SEEK_THRESHOLD: u64 = 8 * 1024;

impl<R: Read + Seek> Seekable<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let pos = inner.stream_position()?;
        let end = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self { inner, pos, end })
    }
}

impl<R: Read> Read for Seekable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> ByteSource for Seekable<R> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let step = n.min(self.end.saturating_sub(self.pos));
        if step <= SEEK_THRESHOLD {
            let copied = io::copy(&mut self.inner.by_ref().take(step), &mut io::sink())?;
            self.pos += copied;
            return Ok(copied);
        }
        self.pos = self.inner.seek(SeekFrom::Start(self.pos + step))?;
        Ok(step)
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────────

pub struct ByteCursor<S> {
    source:   S,
    position: u64,
}

impl<S: ByteSource> ByteCursor<S> {
    pub fn new(source: S) -> Self {
        Self { source, position: 0 }
    }

    /// Bytes consumed so far, skipped bytes included.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, FormatError> {
        ReadBytesExt::read_u8(self).map_err(read_error(field))
    }

    pub fn read_u32_le(&mut self, field: &'static str) -> Result<u32, FormatError> {
        self.read_u32::<LittleEndian>().map_err(read_error(field))
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], FormatError> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf).map_err(read_error(field))?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<Vec<u8>, FormatError> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf).map_err(read_error(field))?;
        Ok(buf)
    }

    /// Decode one multibyte integer; returns `(value, bytes_consumed)`.
    pub fn read_varint(&mut self) -> Result<(u64, usize), FormatError> {
        varint::decode(self)
    }

    /// Skip exactly `n` bytes without looking at them.
    pub fn skip(&mut self, n: u64, field: &'static str) -> Result<(), FormatError> {
        let skipped = self.source.skip(n)?;
        self.position += skipped;
        if skipped < n {
            return Err(FormatError::TruncatedInput(field));
        }
        Ok(())
    }
}

impl<S: ByteSource> Read for ByteCursor<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.source.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}
