//! Scanning many independent files.
//!
//! Each file gets its own handle and scanner, so no coordination is needed.
//! With the `parallel` feature the files are scanned on Rayon's global pool;
//! results come back in input order either way.

use std::path::{Path, PathBuf};

use crate::error::FormatError;
use crate::scanner::{inspect_file, ScanEvent, ScanOptions};

/// Outcome for one file.
#[derive(Debug)]
pub struct FileScan {
    pub path:   PathBuf,
    /// `(compressed_total, uncompressed_total)` or why the scan failed.
    pub result: Result<(u64, u64), FormatError>,
}

/// Scan every path in `paths`.  A failing file does not stop the others.
pub fn scan_files<P>(paths: &[P], options: &ScanOptions) -> Vec<FileScan>
where
    P: AsRef<Path> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        paths.par_iter().map(|p| scan_one(p.as_ref(), options)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        paths.iter().map(|p| scan_one(p.as_ref(), options)).collect()
    }
}

fn scan_one(path: &Path, options: &ScanOptions) -> FileScan {
    FileScan {
        path:   path.to_owned(),
        result: inspect_file::<_, fn(ScanEvent<'_>)>(path, options, None).map(|s| s.totals()),
    }
}
