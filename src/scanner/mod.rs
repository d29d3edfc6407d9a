//! The scan-and-import pipeline.
//!
//! A scan walks a directory tree, records candidate files and classifies
//! them by metadata hash; an import feeds classified files into the
//! catalog engine. Both run on background workers while status is polled
//! through the reporter. Per-file failures are absorbed and logged; only
//! parameter errors reach the caller.

pub mod import;
pub mod scan;
pub mod status;
pub mod walker;

use std::path::PathBuf;

use thiserror::Error;

use crate::repository::DbError;

pub use import::ImportService;
pub use scan::{DeleteOutcome, ScanService};
pub use status::StatusReporter;
pub use walker::{Candidate, SCAN_EXTENSIONS};

/// Structural errors surfaced to the pipeline's caller.
///
/// Everything else (store conflicts, extraction failures, catalog errors)
/// is per-record and handled inside the jobs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("scan path {path} is outside the trusted root {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("scan path {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("empty hash selection")]
    EmptySelection,

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reject a scan path that escapes the trusted prefix.
///
/// Callers must run this before handing a path to the scan job; it is the
/// guard against pointing the scanner at arbitrary system directories.
pub fn validate_scan_path(path: &std::path::Path, root: &std::path::Path) -> Result<(), PipelineError> {
    if !path.starts_with(root) {
        return Err(PipelineError::PathOutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(PipelineError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}
