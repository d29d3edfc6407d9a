//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! over SQLite.

pub mod context;
pub mod diesel_models;
pub mod pool;
pub mod scan_file;
pub mod util;

pub use context::DbContext;
pub use pool::{DbError, SqlitePool};
pub use scan_file::{BatchKind, ScanFileRepository, SortField};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ScanStatus;

/// Per-status record counts for one scan or import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    pub new: u64,
    pub ready: u64,
    pub exist: u64,
    #[serde(rename = "drop")]
    pub dropped: u64,
    pub imported: u64,
}

impl StatusCounts {
    /// Record `count` entries of one status.
    pub fn add(&mut self, status: ScanStatus, count: u64) {
        self.total += count;
        match status {
            ScanStatus::New => self.new += count,
            ScanStatus::Ready => self.ready += count,
            ScanStatus::Exist => self.exist += count,
            ScanStatus::Drop => self.dropped += count,
            ScanStatus::Imported => self.imported += count,
        }
    }

    pub fn get(&self, status: ScanStatus) -> u64 {
        match status {
            ScanStatus::New => self.new,
            ScanStatus::Ready => self.ready,
            ScanStatus::Exist => self.exist,
            ScanStatus::Drop => self.dropped,
            ScanStatus::Imported => self.imported,
        }
    }
}

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
