//! Renders scan events as `tracing` diagnostics.
//!
//! Structure is logged at `debug`, warnings at `warn`.  Raw fields (CRCs,
//! padding, checks, filter properties) are hex-encoded as they appear on
//! disk.  Use as an observer:
//!
//! ```no_run
//! use xzscan::{inspect_file, trace, ScanEvent, ScanOptions};
//!
//! let mut log = |e: ScanEvent<'_>| trace::log_event(&e);
//! let stream = inspect_file("image.img.xz", &ScanOptions::default(), Some(&mut log))?;
//! # Ok::<(), xzscan::FormatError>(())
//! ```

use tracing::{debug, warn};

use crate::scanner::ScanEvent;

pub fn log_event(event: &ScanEvent<'_>) {
    match event {
        ScanEvent::StreamHeader(h) => debug!(
            flags      = %hex::encode(h.flags),
            check      = h.check.name,
            check_size = h.check.size,
            crc32      = %hex::encode(h.crc32.to_le_bytes()),
            "stream header"
        ),
        ScanEvent::Block(b) => {
            debug!(
                block          = b.number,
                offset         = b.offset,
                header_size    = b.header.size,
                flags          = %format!("{:02x}", b.header.flags),
                compressed     = b.compressed_size,
                uncompressed   = ?b.header.uncompressed_size,
                filters        = b.header.filter_count(),
                header_padding = %hex::encode(&b.header.padding),
                header_crc32   = %hex::encode(b.header.crc32.to_le_bytes()),
                check          = %hex::encode(&b.check),
                "block"
            );
            for (i, f) in b.header.filters.iter().enumerate() {
                debug!(
                    block      = b.number,
                    filter     = i,
                    id         = %format!("{:#x}", f.id),
                    properties = %hex::encode(&f.properties),
                    "filter"
                );
            }
        }
        ScanEvent::Index(idx) => {
            debug!(
                records = idx.records.len(),
                size    = idx.size,
                padding = %hex::encode(&idx.padding),
                crc32   = %hex::encode(idx.crc32.to_le_bytes()),
                "index"
            );
            for (i, r) in idx.records.iter().enumerate() {
                debug!(
                    record       = i,
                    unpadded     = r.unpadded_size,
                    uncompressed = r.uncompressed_size,
                    "index record"
                );
            }
        }
        ScanEvent::Footer(f) => debug!(
            crc32         = %hex::encode(f.crc32.to_le_bytes()),
            backward_size = f.backward_size,
            flags         = %hex::encode(f.flags),
            magic         = %hex::encode(f.magic),
            "stream footer"
        ),
        ScanEvent::Warning(w) => warn!("{}", w),
    }
}
