//! Structural reader for XZ streams.
//!
//! Walks the stream header, blocks, index and footer to total the compressed
//! and uncompressed sizes without decompressing anything, e.g. to size a
//! progress bar before the real decompression pass.
//!
//! ```no_run
//! let (compressed, uncompressed) = xzscan::scan_file("image.img.xz")?;
//! println!("{compressed} B -> {uncompressed} B");
//! # Ok::<(), xzscan::FormatError>(())
//! ```

mod cursor;
pub mod error;
pub mod varint;
pub mod header;
pub mod block;
pub mod index;
pub mod footer;
pub mod scanner;
pub mod trace;
pub mod batch;

pub use error::FormatError;
pub use header::{Check, StreamHeader};
pub use block::{Block, BlockHeader, Filter};
pub use index::{Index, IndexRecord};
pub use footer::StreamFooter;
pub use scanner::{
    inspect, inspect_file, inspect_seekable, scan, scan_file, scan_seekable,
    ScanEvent, ScanOptions, ScanWarning, Stream,
};
