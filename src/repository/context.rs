//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It holds the connection pool and provides access to the repositories.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::pool::{DbError, SqlitePool};
use super::scan_file::ScanFileRepository;

/// Database context that manages the connection pool and provides repository access.
#[derive(Clone)]
pub struct DbContext {
    pool: SqlitePool,
}

impl DbContext {
    /// Create a context from a database file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: SqlitePool::from_path(db_path),
        }
    }

    /// Create a context from a database URL.
    pub fn from_url(url: &str) -> Self {
        Self {
            pool: SqlitePool::new(url),
        }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a scan file repository.
    pub fn scan_files(&self) -> ScanFileRepository {
        ScanFileRepository::new(self.pool.clone())
    }

    /// Initialize database schema.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(include_str!("schema_sqlite.sql")).await
    }
}
