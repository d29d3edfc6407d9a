//! Scan job: discover candidate files, record and classify them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;

use crate::catalog::CatalogEngine;
use crate::metadata::MetadataExtractor;
use crate::models::{ScanFile, ScanStatus};
use crate::repository::ScanFileRepository;

use super::walker::{self, Candidate};
use super::PipelineError;

/// Bounded wait for the first durably stored record before the caller
/// is released to poll status.
const START_SIGNAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOutcome {
    /// Rows removed from the store.
    pub records_deleted: usize,
    /// Underlying files removed from disk.
    pub files_deleted: usize,
}

/// Orchestrates one directory scan.
#[derive(Clone)]
pub struct ScanService {
    repo: ScanFileRepository,
    extractor: Arc<dyn MetadataExtractor>,
    catalog: Arc<dyn CatalogEngine>,
    background: bool,
}

impl ScanService {
    pub fn new(
        repo: ScanFileRepository,
        extractor: Arc<dyn MetadataExtractor>,
        catalog: Arc<dyn CatalogEngine>,
    ) -> Self {
        Self {
            repo,
            extractor,
            catalog,
            background: true,
        }
    }

    /// Run the per-file work inline instead of on a background worker.
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    /// Start a scan of `root`, returning the candidate count.
    ///
    /// Callers must have validated the path against the trusted prefix
    /// (see [`super::validate_scan_path`]). Zero candidates is the "nothing
    /// to do" outcome, not an error. The call returns once the first record
    /// is durably stored, the walk turns out empty, or the bounded wait
    /// elapses - whichever comes first.
    pub async fn run_scan(&self, root: &Path) -> Result<usize, PipelineError> {
        let candidates: Vec<Candidate> = walker::walk(root).collect();
        if candidates.is_empty() {
            return Ok(0);
        }
        let total = candidates.len();

        // Batch id groups this run's records for status polling.
        let scan_id = Utc::now().timestamp();
        tracing::info!("scan {} started over {} candidates", scan_id, total);

        let (tx, rx) = oneshot::channel();
        if self.background {
            let job = self.clone();
            tokio::spawn(async move { job.do_scan(candidates, scan_id, tx).await });
            if tokio::time::timeout(START_SIGNAL_TIMEOUT, rx).await.is_err() {
                tracing::warn!(
                    "scan {}: no record stored within {:?}, caller proceeding",
                    scan_id,
                    START_SIGNAL_TIMEOUT
                );
            }
        } else {
            self.do_scan(candidates, scan_id, tx).await;
        }
        Ok(total)
    }

    async fn do_scan(&self, candidates: Vec<Candidate>, scan_id: i64, signal: oneshot::Sender<()>) {
        let mut signal = Some(signal);

        // Walk phase: placeholder records, one transaction each.
        let mut inserted: Vec<(ScanFile, String)> = Vec::new();
        for candidate in candidates {
            let path = candidate.path.display().to_string();
            match self.repo.exists_by_path(&path).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!("path lookup failed for {}: {}", path, err);
                    continue;
                }
            }
            match self
                .repo
                .insert_placeholder(&candidate.name, &path, scan_id)
                .await
            {
                Ok(record) => {
                    if let Some(tx) = signal.take() {
                        let _ = tx.send(());
                    }
                    inserted.push((record, candidate.format));
                }
                Err(err) => {
                    tracing::warn!("insert failed for {}, skipping: {}", path, err);
                }
            }
        }
        // Nothing inserted: release the caller anyway.
        if let Some(tx) = signal.take() {
            let _ = tx.send(());
        }

        // Classification phase: metadata, hash, dedup, catalog check.
        // The seen-set catches duplicates discovered within this walk;
        // the store lookup catches duplicates from prior runs.
        let mut seen: HashSet<String> = HashSet::new();
        for (mut record, format) in inserted {
            let meta = match self.extractor.extract(Path::new(&record.path), &format).await {
                Ok(meta) => meta,
                Err(err) => {
                    tracing::warn!("metadata extraction failed for {}: {}", record.path, err);
                    continue;
                }
            };
            let size = match tokio::fs::metadata(&record.path).await {
                Ok(fs_meta) => fs_meta.len(),
                Err(err) => {
                    tracing::warn!("stat failed for {}: {}", record.path, err);
                    continue;
                }
            };

            record.title = meta.title.clone();
            record.author = meta.author.clone();
            record.publisher = meta.publisher.clone();
            record.tags = meta.tags_joined();
            record.status = ScanStatus::Ready;

            match self.catalog.find_matching_book(&meta).await {
                Ok(Some(book_id)) => {
                    record.book_id = book_id;
                    record.status = ScanStatus::Exist;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("catalog lookup failed for {}: {}", record.path, err);
                }
            }

            let hash = meta.content_hash(size);
            let duplicate = seen.contains(&hash)
                || match self.repo.hash_in_use(&hash).await {
                    Ok(in_use) => in_use,
                    Err(err) => {
                        tracing::warn!("hash lookup failed for {}: {}", record.path, err);
                        continue;
                    }
                };
            if duplicate {
                record.status = ScanStatus::Drop;
                record.book_id = 0;
            }
            record.hash = hash.clone();
            seen.insert(hash);

            match self.repo.save(&record).await {
                Ok(true) => tracing::info!(
                    "update: status={:<5} path={}{}",
                    record.status,
                    record.path,
                    if record.book_id > 0 {
                        format!(" [ book-id={} ]", record.book_id)
                    } else {
                        String::new()
                    }
                ),
                Ok(false) => {}
                Err(err) => tracing::warn!("save error for {}: {}", record.path, err),
            }
        }
        tracing::info!("scan {} finished", scan_id);
    }

    /// Delete records by hash selection, optionally removing files on disk.
    ///
    /// `delete_imported` removes the files of `imported` records;
    /// `delete_unimported` removes the files of everything else.
    pub async fn delete_records(
        &self,
        hashes: Option<Vec<String>>,
        delete_imported: bool,
        delete_unimported: bool,
    ) -> Result<DeleteOutcome, PipelineError> {
        if matches!(hashes.as_deref(), Some([])) {
            return Err(PipelineError::EmptySelection);
        }

        let records = self.repo.records_by_hashes(hashes.as_deref()).await?;
        let targets: Vec<String> = records
            .iter()
            .filter(|r| {
                if r.status == ScanStatus::Imported {
                    delete_imported
                } else {
                    delete_unimported
                }
            })
            .map(|r| r.path.clone())
            .collect();

        let records_deleted = self.repo.delete_by_hashes(hashes.as_deref()).await?;

        let mut files_deleted = 0;
        for path in targets {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!("deleted file {}", path);
                    files_deleted += 1;
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => tracing::warn!("could not delete {}: {}", path, err),
            }
        }

        Ok(DeleteOutcome {
            records_deleted,
            files_deleted,
        })
    }
}
