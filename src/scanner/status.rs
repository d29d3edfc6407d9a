//! Batch status aggregation for polling callers.

use crate::repository::{BatchKind, DbError, ScanFileRepository, StatusCounts};

/// Aggregates record counts for the most recent scan or import batch.
#[derive(Clone)]
pub struct StatusReporter {
    repo: ScanFileRepository,
}

impl StatusReporter {
    pub fn new(repo: ScanFileRepository) -> Self {
        Self { repo }
    }

    /// Status of the latest scan batch; `(0, empty)` when none has run.
    pub async fn scan_status(&self) -> Result<(i64, StatusCounts), DbError> {
        self.batch_status(BatchKind::Scan).await
    }

    /// Status of the latest import batch; `(0, empty)` when none has run.
    pub async fn import_status(&self) -> Result<(i64, StatusCounts), DbError> {
        self.batch_status(BatchKind::Import).await
    }

    async fn batch_status(&self, kind: BatchKind) -> Result<(i64, StatusCounts), DbError> {
        match self.repo.latest_batch_id(kind).await? {
            Some(batch_id) => Ok((batch_id, self.repo.count_by_status(batch_id, kind).await?)),
            None => Ok((0, StatusCounts::default())),
        }
    }
}
