//! Scan file records and their status lifecycle.
//!
//! Every candidate file discovered by a scan becomes one record that moves
//! through a one-way lifecycle: `new` at discovery, then `ready`, `exist`
//! or `drop` after classification, then `imported` or `exist` after import.
//! Transitions are validated on every write so a record never regresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Placeholder inserted during the walk phase, not yet classified.
    New,
    /// Classified and waiting for import.
    Ready,
    /// A matching book already exists in the catalog.
    Exist,
    /// Duplicate of another record with the same content hash.
    Drop,
    /// Imported into the catalog.
    Imported,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Ready => "ready",
            Self::Exist => "exist",
            Self::Drop => "drop",
            Self::Imported => "imported",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "ready" => Some(Self::Ready),
            "exist" => Some(Self::Exist),
            "drop" => Some(Self::Drop),
            "imported" => Some(Self::Imported),
            _ => None,
        }
    }

    /// All statuses, in lifecycle order.
    pub const ALL: [ScanStatus; 5] = [
        Self::New,
        Self::Ready,
        Self::Exist,
        Self::Drop,
        Self::Imported,
    ];

    /// Whether a record may move from `self` to `next`.
    ///
    /// `exist`, `drop` and `imported` are terminal. Writing a status back
    /// onto itself is allowed so re-saves of an unchanged record pass.
    pub fn can_transition(&self, next: ScanStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            Self::New => matches!(next, Self::Ready | Self::Exist | Self::Drop),
            Self::Ready => matches!(next, Self::Imported | Self::Exist),
            Self::Exist | Self::Drop | Self::Imported => false,
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered candidate file and its processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFile {
    /// Database row ID.
    pub id: i32,
    /// Scan batch this record was discovered in (epoch seconds).
    pub scan_id: i64,
    /// Import batch this record was selected into, 0 until then.
    pub import_id: i64,
    /// File name without directory.
    pub name: String,
    /// Absolute path on disk. Unique per record.
    pub path: String,
    /// Content-identity hash; the path string until classification.
    pub hash: String,
    /// Lifecycle status.
    pub status: ScanStatus,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub tags: String,
    /// Catalog book this record resolved to, 0 until linked.
    pub book_id: i64,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}
