//! Scan file repository - the persisted store of discovered candidate files.
//!
//! This is the single source of truth for path uniqueness, hash
//! deduplication and the status lifecycle. Status writes are validated
//! against the allowed-transition table; a rejected transition is reported
//! to the caller rather than applied.

use chrono::Utc;
use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::models::{ScanFile, ScanStatus};
use crate::schema::{book_items, scan_files};

use super::diesel_models::{NewBookItem, NewScanFile, ScanFileRecord};
use super::pool::{DbError, SqlitePool};
use super::StatusCounts;

/// Which batch id column groups a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Scan,
    Import,
}

/// Sort field for the listing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Path,
    Name,
    #[default]
    CreateTime,
    UpdateTime,
}

impl SortField {
    pub fn from_str(s: &str) -> Self {
        match s {
            "id" => Self::Id,
            "path" => Self::Path,
            "name" => Self::Name,
            "update_time" => Self::UpdateTime,
            _ => Self::CreateTime,
        }
    }
}

/// Repository for scan file records and book ownership links.
#[derive(Clone)]
pub struct ScanFileRepository {
    pool: SqlitePool,
}

impl ScanFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether a record with this exact path already exists (any status).
    pub async fn exists_by_path(&self, path: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;
        let count: i64 = scan_files::table
            .filter(scan_files::path.eq(path))
            .select(count_star())
            .first(&mut conn)
            .await?;
        Ok(count > 0)
    }

    /// Whether any record already carries this content hash.
    pub async fn hash_in_use(&self, hash: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;
        let count: i64 = scan_files::table
            .filter(scan_files::hash.eq(hash))
            .select(count_star())
            .first(&mut conn)
            .await?;
        Ok(count > 0)
    }

    /// Insert a placeholder record for a freshly discovered file.
    ///
    /// The hash is temporarily the path string; classification replaces it.
    /// Fails on constraint violation (duplicate path); callers catch and
    /// skip that file.
    pub async fn insert_placeholder(
        &self,
        name: &str,
        path: &str,
        scan_id: i64,
    ) -> Result<ScanFile, DbError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;
        diesel::insert_into(scan_files::table)
            .values(NewScanFile {
                scan_id,
                import_id: 0,
                name,
                path,
                hash: path,
                status: ScanStatus::New.as_str(),
                title: "",
                author: "",
                publisher: "",
                tags: "",
                book_id: 0,
                create_time: &now,
                update_time: &now,
            })
            .execute(&mut conn)
            .await?;

        let record: ScanFileRecord = scan_files::table
            .filter(scan_files::path.eq(path))
            .first(&mut conn)
            .await?;
        Ok(record.into())
    }

    /// Persist a record's classification or import outcome.
    ///
    /// Writes hash, metadata, status and book_id. The stored status is
    /// checked against the transition table first; an invalid transition
    /// leaves the row untouched and returns `false`.
    pub async fn save(&self, record: &ScanFile) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;
        let stored: String = scan_files::table
            .find(record.id)
            .select(scan_files::status)
            .first(&mut conn)
            .await?;
        let stored = ScanStatus::from_str(&stored).unwrap_or(ScanStatus::New);
        if !stored.can_transition(record.status) {
            tracing::warn!(
                "refusing status transition {} -> {} for {}",
                stored,
                record.status,
                record.path
            );
            return Ok(false);
        }

        diesel::update(scan_files::table.find(record.id))
            .set((
                scan_files::hash.eq(&record.hash),
                scan_files::status.eq(record.status.as_str()),
                scan_files::title.eq(&record.title),
                scan_files::author.eq(&record.author),
                scan_files::publisher.eq(&record.publisher),
                scan_files::tags.eq(&record.tags),
                scan_files::book_id.eq(record.book_id),
                scan_files::update_time.eq(Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(true)
    }

    /// Count records waiting for import, optionally restricted to a hash list.
    pub async fn count_ready(&self, hashes: Option<&[String]>) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;
        let filter = scan_files::status.eq(ScanStatus::Ready.as_str());
        match hashes {
            Some(hashes) => {
                scan_files::table
                    .filter(filter)
                    .filter(scan_files::hash.eq_any(hashes))
                    .select(count_star())
                    .first(&mut conn)
                    .await
            }
            None => {
                scan_files::table
                    .filter(filter)
                    .select(count_star())
                    .first(&mut conn)
                    .await
            }
        }
    }

    /// Tag all matching ready records with an import batch id.
    ///
    /// One batch UPDATE, no per-row iteration.
    pub async fn bulk_update_import_id(
        &self,
        hashes: Option<&[String]>,
        import_id: i64,
    ) -> Result<usize, DbError> {
        let mut conn = self.pool.get().await?;
        let filter = scan_files::status.eq(ScanStatus::Ready.as_str());
        match hashes {
            Some(hashes) => {
                diesel::update(
                    scan_files::table
                        .filter(filter)
                        .filter(scan_files::hash.eq_any(hashes)),
                )
                .set(scan_files::import_id.eq(import_id))
                .execute(&mut conn)
                .await
            }
            None => {
                diesel::update(scan_files::table.filter(filter))
                    .set(scan_files::import_id.eq(import_id))
                    .execute(&mut conn)
                    .await
            }
        }
    }

    /// Ready records tagged with this import batch, in store order.
    pub async fn records_for_import(&self, import_id: i64) -> Result<Vec<ScanFile>, DbError> {
        let mut conn = self.pool.get().await?;
        let records: Vec<ScanFileRecord> = scan_files::table
            .filter(scan_files::import_id.eq(import_id))
            .filter(scan_files::status.eq(ScanStatus::Ready.as_str()))
            .order(scan_files::id.asc())
            .load(&mut conn)
            .await?;
        Ok(records.into_iter().map(ScanFile::from).collect())
    }

    /// Records matching a hash list, or all records when `None`.
    pub async fn records_by_hashes(
        &self,
        hashes: Option<&[String]>,
    ) -> Result<Vec<ScanFile>, DbError> {
        let mut conn = self.pool.get().await?;
        let mut query = scan_files::table.order(scan_files::id.asc()).into_boxed();
        if let Some(hashes) = hashes {
            query = query.filter(scan_files::hash.eq_any(hashes));
        }
        let records: Vec<ScanFileRecord> = query.load(&mut conn).await?;
        Ok(records.into_iter().map(ScanFile::from).collect())
    }

    /// Delete records by hash list (all records when `None`).
    ///
    /// Returns the number of rows removed.
    pub async fn delete_by_hashes(&self, hashes: Option<&[String]>) -> Result<usize, DbError> {
        let mut conn = self.pool.get().await?;
        match hashes {
            Some(hashes) => {
                diesel::delete(scan_files::table.filter(scan_files::hash.eq_any(hashes)))
                    .execute(&mut conn)
                    .await
            }
            None => diesel::delete(scan_files::table).execute(&mut conn).await,
        }
    }

    /// Latest batch id for a kind, `None` when no batch has ever run.
    pub async fn latest_batch_id(&self, kind: BatchKind) -> Result<Option<i64>, DbError> {
        let mut conn = self.pool.get().await?;
        match kind {
            BatchKind::Scan => {
                scan_files::table
                    .select(max(scan_files::scan_id))
                    .first(&mut conn)
                    .await
            }
            BatchKind::Import => {
                // import_id stays 0 until a record is selected into a batch
                scan_files::table
                    .filter(scan_files::import_id.gt(0))
                    .select(max(scan_files::import_id))
                    .first(&mut conn)
                    .await
            }
        }
    }

    /// Count records of one batch grouped by status.
    pub async fn count_by_status(
        &self,
        batch_id: i64,
        kind: BatchKind,
    ) -> Result<StatusCounts, DbError> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<(String, i64)> = match kind {
            BatchKind::Scan => {
                scan_files::table
                    .filter(scan_files::scan_id.eq(batch_id))
                    .group_by(scan_files::status)
                    .select((scan_files::status, count_star()))
                    .load(&mut conn)
                    .await?
            }
            BatchKind::Import => {
                scan_files::table
                    .filter(scan_files::import_id.eq(batch_id))
                    .group_by(scan_files::status)
                    .select((scan_files::status, count_star()))
                    .load(&mut conn)
                    .await?
            }
        };

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            if let Some(status) = ScanStatus::from_str(&status) {
                counts.add(status, count as u64);
            }
        }
        Ok(counts)
    }

    /// Paged, sorted listing for the operator surface.
    ///
    /// Returns `(total, page_of_records)`. `page` is zero-based.
    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
        sort: SortField,
        descending: bool,
    ) -> Result<(i64, Vec<ScanFile>), DbError> {
        let mut conn = self.pool.get().await?;
        let total: i64 = scan_files::table
            .select(count_star())
            .first(&mut conn)
            .await?;

        let mut query = scan_files::table.into_boxed();
        query = match (sort, descending) {
            (SortField::Id, false) => query.order(scan_files::id.asc()),
            (SortField::Id, true) => query.order(scan_files::id.desc()),
            (SortField::Path, false) => query.order(scan_files::path.asc()),
            (SortField::Path, true) => query.order(scan_files::path.desc()),
            (SortField::Name, false) => query.order(scan_files::name.asc()),
            (SortField::Name, true) => query.order(scan_files::name.desc()),
            (SortField::CreateTime, false) => query.order(scan_files::create_time.asc()),
            (SortField::CreateTime, true) => query.order(scan_files::create_time.desc()),
            (SortField::UpdateTime, false) => query.order(scan_files::update_time.asc()),
            (SortField::UpdateTime, true) => query.order(scan_files::update_time.desc()),
        };

        let records: Vec<ScanFileRecord> = query
            .limit(per_page)
            .offset(page * per_page)
            .load(&mut conn)
            .await?;
        Ok((total, records.into_iter().map(ScanFile::from).collect()))
    }

    /// Register an ownership link for an imported book. Best-effort:
    /// callers log a failure and move on.
    pub async fn create_book_link(&self, book_id: i64, collector_id: i64) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;
        diesel::insert_into(book_items::table)
            .values(NewBookItem {
                book_id,
                collector_id,
                create_time: &now,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
