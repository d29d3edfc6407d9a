//! Data models for shelfscan.

mod book_meta;
mod scan_file;

pub use book_meta::BookMeta;
pub use scan_file::{ScanFile, ScanStatus};
