//! Structural scan of one XZ stream.
//!
//! # How it works
//!
//! The scanner makes a single forward pass over the source: stream header,
//! then a loop reading one block-header-size byte at a time (a non-zero
//! value starts a block, zero starts the index), then the footer.  Block
//! data is skipped, never decompressed, so the cost follows the number of
//! blocks and filters rather than the payload size.
//!
//! ## Results
//!
//! [`scan`] and friends return `(compressed_total, uncompressed_total)`.
//! [`inspect`] and friends return the whole parsed [`Stream`].  Either way a
//! result only exists once the footer has been read; any failure yields a
//! [`FormatError`] and nothing else.
//!
//! ## Cross-checks
//!
//! After the index is read it is compared with the walked blocks, and the
//! footer with the header and index.  Disagreements become [`ScanWarning`]s
//! stored on the [`Stream`] and passed to the observer, or, with
//! [`ScanOptions::strict`], a [`FormatError::Inconsistent`].  A block that
//! omits its uncompressed size takes it from its index record.
//!
//! ## Observer
//!
//! Every `inspect*` entry point accepts an optional callback that receives a
//! [`ScanEvent`] for each parsed structure.  Pass `None` to disable it.  The
//! scanner itself never logs; see [`crate::trace`] for a renderer.

use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use thiserror::Error;

use crate::block::Block;
use crate::cursor::{ByteCursor, ByteSource, Seekable, Streamed};
use crate::error::FormatError;
use crate::footer::{StreamFooter, FOOTER_MAGIC};
use crate::header::StreamHeader;
use crate::index::Index;

// ── Options ───────────────────────────────────────────────────────────────────

/// Configuration for the `inspect*` entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Turn every [`ScanWarning`] into [`FormatError::Inconsistent`] and
    /// require the footer magic.
    pub strict:               bool,
    /// Fail with [`FormatError::BadFooterMagic`] instead of warning.
    pub require_footer_magic: bool,
}

// ── Warnings and events ───────────────────────────────────────────────────────

/// A structural disagreement that does not stop the totals from being known.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScanWarning {
    #[error("index has {records} record(s) for {blocks} block(s)")]
    RecordCount { blocks: usize, records: usize },
    #[error("block {block} unpadded size is {walked} but the index records {indexed}")]
    UnpaddedSize { block: usize, walked: u64, indexed: u64 },
    #[error("block {block} declares uncompressed size {declared} but the index records {indexed}")]
    UncompressedSize { block: usize, declared: u64, indexed: u64 },
    #[error("footer backward size implies a {declared}-byte index, read {measured} bytes")]
    BackwardSize { declared: u64, measured: u64 },
    #[error("footer stream flags {} differ from header stream flags {}", hex::encode(.footer), hex::encode(.header))]
    FlagsMismatch { header: [u8; 2], footer: [u8; 2] },
    #[error("footer magic is {} instead of {}", hex::encode(.0), hex::encode(FOOTER_MAGIC))]
    FooterMagic([u8; 2]),
}

/// One parsed structure, reported to the observer as soon as it is complete.
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent<'a> {
    StreamHeader(&'a StreamHeader),
    Block(&'a Block),
    Index(&'a Index),
    Footer(&'a StreamFooter),
    Warning(&'a ScanWarning),
}

// ── Stream ────────────────────────────────────────────────────────────────────

/// Everything a successful scan read.
#[derive(Debug, Clone, Serialize)]
pub struct Stream {
    pub header:            StreamHeader,
    pub blocks:            Vec<Block>,
    pub index:             Index,
    pub footer:            StreamFooter,
    pub warnings:          Vec<ScanWarning>,
    pub compressed_size:   u64,
    pub uncompressed_size: u64,
    /// Bytes consumed, stream header through footer.
    pub stream_size:       u64,
}

impl Stream {
    /// `(compressed_total, uncompressed_total)`.
    pub fn totals(&self) -> (u64, u64) {
        (self.compressed_size, self.uncompressed_size)
    }
}

// ── Scanner ───────────────────────────────────────────────────────────────────

enum ScanState {
    AwaitingBlockOrIndex,
    InBlock { offset: u64, encoded_size: u8 },
    Done(Index),
}

struct Scanner<'o, S, F> {
    cursor:   ByteCursor<S>,
    options:  &'o ScanOptions,
    observer: Option<&'o mut F>,
    warnings: Vec<ScanWarning>,
}

impl<'o, S, F> Scanner<'o, S, F>
where
    S: ByteSource,
    F: FnMut(ScanEvent<'_>),
{
    fn new(source: S, options: &'o ScanOptions, observer: Option<&'o mut F>) -> Self {
        Self {
            cursor: ByteCursor::new(source),
            options,
            observer,
            warnings: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Stream, FormatError> {
        let header = StreamHeader::read(&mut self.cursor)?;
        self.emit(ScanEvent::StreamHeader(&header));

        let mut blocks: Vec<Block> = Vec::new();
        let mut state = ScanState::AwaitingBlockOrIndex;
        let index = loop {
            state = match state {
                ScanState::AwaitingBlockOrIndex => {
                    let offset = self.cursor.position();
                    match self.cursor.read_u8("block header size")? {
                        0 => ScanState::Done(Index::read(&mut self.cursor)?),
                        encoded_size => ScanState::InBlock { offset, encoded_size },
                    }
                }
                ScanState::InBlock { offset, encoded_size } => {
                    let block = Block::read(
                        &mut self.cursor,
                        blocks.len(),
                        offset,
                        encoded_size,
                        header.check,
                    )?;
                    self.emit(ScanEvent::Block(&block));
                    blocks.push(block);
                    ScanState::AwaitingBlockOrIndex
                }
                ScanState::Done(index) => break index,
            };
        };
        self.emit(ScanEvent::Index(&index));
        self.reconcile_index(&mut blocks, &index)?;

        let footer = StreamFooter::read(&mut self.cursor)?;
        self.emit(ScanEvent::Footer(&footer));
        self.check_footer(&header, &index, &footer)?;

        let (compressed_size, uncompressed_size) = totals(&blocks)?;

        Ok(Stream {
            header,
            blocks,
            index,
            footer,
            warnings: self.warnings,
            compressed_size,
            uncompressed_size,
            stream_size: self.cursor.position(),
        })
    }

    fn emit(&mut self, event: ScanEvent<'_>) {
        if let Some(cb) = self.observer.as_deref_mut() {
            cb(event);
        }
    }

    fn warn(&mut self, warning: ScanWarning) -> Result<(), FormatError> {
        if self.options.strict {
            return Err(FormatError::Inconsistent(warning));
        }
        self.emit(ScanEvent::Warning(&warning));
        self.warnings.push(warning);
        Ok(())
    }

    /// Compare walked blocks with index records; fill in uncompressed sizes
    /// the block headers left out.
    fn reconcile_index(&mut self, blocks: &mut [Block], index: &Index) -> Result<(), FormatError> {
        if index.records.len() != blocks.len() {
            self.warn(ScanWarning::RecordCount {
                blocks:  blocks.len(),
                records: index.records.len(),
            })?;
        }

        for (block, record) in blocks.iter_mut().zip(&index.records) {
            if block.unpadded_size() != record.unpadded_size {
                self.warn(ScanWarning::UnpaddedSize {
                    block:   block.number,
                    walked:  block.unpadded_size(),
                    indexed: record.unpadded_size,
                })?;
            }
            match block.uncompressed_size {
                Some(declared) if declared != record.uncompressed_size => {
                    self.warn(ScanWarning::UncompressedSize {
                        block:    block.number,
                        declared,
                        indexed:  record.uncompressed_size,
                    })?;
                }
                Some(_) => {}
                None => block.uncompressed_size = Some(record.uncompressed_size),
            }
        }
        Ok(())
    }

    fn check_footer(
        &mut self,
        header: &StreamHeader,
        index:  &Index,
        footer: &StreamFooter,
    ) -> Result<(), FormatError> {
        if !footer.has_magic() {
            if self.options.strict || self.options.require_footer_magic {
                return Err(FormatError::BadFooterMagic(footer.magic));
            }
            self.warn(ScanWarning::FooterMagic(footer.magic))?;
        }
        if footer.index_size() != index.size {
            self.warn(ScanWarning::BackwardSize {
                declared: footer.index_size(),
                measured: index.size,
            })?;
        }
        if footer.flags != header.flags {
            self.warn(ScanWarning::FlagsMismatch {
                header: header.flags,
                footer: footer.flags,
            })?;
        }
        Ok(())
    }
}

fn totals(blocks: &[Block]) -> Result<(u64, u64), FormatError> {
    blocks.iter().try_fold((0u64, 0u64), |(compressed, uncompressed), block| {
        let block_uncompressed = block
            .uncompressed_size
            .ok_or(FormatError::MissingUncompressedSize(block.number))?;
        Ok((
            compressed.checked_add(block.compressed_size).ok_or(FormatError::SizeOverflow)?,
            uncompressed.checked_add(block_uncompressed).ok_or(FormatError::SizeOverflow)?,
        ))
    })
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Scan an XZ stream from any reader and return
/// `(compressed_total, uncompressed_total)`.
///
/// Block data is read and discarded.  Prefer [`scan_seekable`] or
/// [`scan_file`] when the source can seek.
pub fn scan<R: Read>(reader: R) -> Result<(u64, u64), FormatError> {
    inspect::<_, fn(ScanEvent<'_>)>(reader, &ScanOptions::default(), None).map(|s| s.totals())
}

/// Like [`scan`], skipping block data by seeking.
pub fn scan_seekable<R: Read + Seek>(reader: R) -> Result<(u64, u64), FormatError> {
    inspect_seekable::<_, fn(ScanEvent<'_>)>(reader, &ScanOptions::default(), None)
        .map(|s| s.totals())
}

/// Convenience: scan the file at `path`.
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<(u64, u64), FormatError> {
    inspect_file::<_, fn(ScanEvent<'_>)>(path, &ScanOptions::default(), None)
        .map(|s| s.totals())
}

/// Scan a stream from any reader and return the full structure.
///
/// # Arguments
/// * `reader`  : positioned at the first byte of the stream header.
/// * `options` : cross-check strictness.
/// * `observer`: optional callback; called once per parsed structure.
pub fn inspect<R, F>(
    reader:   R,
    options:  &ScanOptions,
    observer: Option<&mut F>,
) -> Result<Stream, FormatError>
where
    R: Read,
    F: FnMut(ScanEvent<'_>),
{
    Scanner::new(Streamed(reader), options, observer).run()
}

/// Like [`inspect`], skipping block data by seeking.  Offsets are relative
/// to the reader's position on entry.
pub fn inspect_seekable<R, F>(
    reader:   R,
    options:  &ScanOptions,
    observer: Option<&mut F>,
) -> Result<Stream, FormatError>
where
    R: Read + Seek,
    F: FnMut(ScanEvent<'_>),
{
    Scanner::new(Seekable::new(reader)?, options, observer).run()
}

pub fn inspect_file<P, F>(
    path:     P,
    options:  &ScanOptions,
    observer: Option<&mut F>,
) -> Result<Stream, FormatError>
where
    P: AsRef<Path>,
    F: FnMut(ScanEvent<'_>),
{
    let file = File::open(path)?;
    inspect_seekable(BufReader::new(file), options, observer)
}
