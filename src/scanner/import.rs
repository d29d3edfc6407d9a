//! Import job: feed classified records into the catalog engine.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::catalog::CatalogEngine;
use crate::metadata::MetadataExtractor;
use crate::models::ScanStatus;
use crate::repository::ScanFileRepository;

use super::walker::format_of;
use super::PipelineError;

/// Orchestrates one import run over `ready` records.
#[derive(Clone)]
pub struct ImportService {
    repo: ScanFileRepository,
    extractor: Arc<dyn MetadataExtractor>,
    catalog: Arc<dyn CatalogEngine>,
    background: bool,
}

impl ImportService {
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

    /// Run the per-record work inline instead of on a background worker.
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    /// Start an import over `ready` records, optionally filtered to a hash
    /// list (`None` means all eligible). Returns the eligible count.
    ///
    /// The count and the batch-tagging commit happen before this returns,
    /// so a repeated call cannot select the same records twice; the
    /// per-record catalog work runs on a background worker. Progress is
    /// observed through the status reporter, not a return value.
    pub async fn run_import(
        &self,
        hashes: Option<Vec<String>>,
        collector_id: i64,
    ) -> Result<u64, PipelineError> {
        if matches!(hashes.as_deref(), Some([])) {
            return Err(PipelineError::EmptySelection);
        }

        let total = self.repo.count_ready(hashes.as_deref()).await?;
        if total == 0 {
            return Ok(0);
        }

        let import_id = Utc::now().timestamp();
        self.repo
            .bulk_update_import_id(hashes.as_deref(), import_id)
            .await?;
        tracing::info!("import {} started over {} records", import_id, total);

        if self.background {
            let job = self.clone();
            tokio::spawn(async move { job.do_import(import_id, collector_id).await });
        } else {
            self.do_import(import_id, collector_id).await;
        }
        Ok(total as u64)
    }

    async fn do_import(&self, import_id: i64, collector_id: i64) {
        let records = match self.repo.records_for_import(import_id).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!("import {}: could not load batch: {}", import_id, err);
                return;
            }
        };

        for mut record in records {
            let path = Path::new(&record.path);
            let format = format_of(path);
            let meta = match self.extractor.extract(path, &format).await {
                Ok(meta) => meta,
                Err(err) => {
                    tracing::warn!("metadata extraction failed for {}: {}", record.path, err);
                    continue;
                }
            };

            // Re-check the catalog: the same book may have been imported
            // through another path since the scan classified this record.
            match self.catalog.find_matching_book(&meta).await {
                Ok(Some(book_id)) => {
                    record.status = ScanStatus::Exist;
                    record.book_id = book_id;
                    self.save(&record).await;
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("catalog lookup failed for {}: {}", record.path, err);
                    continue;
                }
            }

            tracing::info!("import [{}] from {}", meta.title, record.path);
            let book_id = match self.catalog.import_book(&meta, &[path]).await {
                Ok(book_id) => book_id,
                Err(err) => {
                    // Terminal for this batch; the record stays ready.
                    tracing::warn!("import failed for {}: {}", record.path, err);
                    continue;
                }
            };
            record.status = ScanStatus::Imported;
            record.book_id = book_id;
            self.save(&record).await;

            // Ownership link is best-effort.
            if let Err(err) = self.repo.create_book_link(book_id, collector_id).await {
                tracing::error!("save link error for book {}: {}", book_id, err);
            }
        }
        tracing::info!("import {} finished", import_id);
    }

    async fn save(&self, record: &crate::models::ScanFile) {
        match self.repo.save(record).await {
            Ok(true) => tracing::info!(
                "update: status={:<8} path={} [ book-id={} ]",
                record.status,
                record.path,
                record.book_id
            ),
            Ok(false) => {}
            Err(err) => tracing::warn!("save error for {}: {}", record.path, err),
        }
    }
}
