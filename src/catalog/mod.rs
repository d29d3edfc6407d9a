//! Catalog engine seam.
//!
//! The catalog engine owns canonical book records; the pipeline only asks
//! it two questions: "is there already a book matching this metadata?" and
//! "import this file as a new book". Both may be slow and are only called
//! from background workers.

mod calibre;

use std::path::Path;

use async_trait::async_trait;

use crate::models::BookMeta;

pub use calibre::CalibreCli;

/// External book catalog consumed by the scan and import jobs.
#[async_trait]
pub trait CatalogEngine: Send + Sync {
    /// Look up an existing book with matching metadata.
    async fn find_matching_book(&self, meta: &BookMeta) -> anyhow::Result<Option<i64>>;

    /// Import a file as a new catalog entry, returning the new book id.
    async fn import_book(&self, meta: &BookMeta, files: &[&Path]) -> anyhow::Result<i64>;
}

/// Catalog backend for installations without a configured library.
///
/// Never matches, so every classified file stays `ready`; importing is an
/// error surfaced before any background work starts.
pub struct NullCatalog;

#[async_trait]
impl CatalogEngine for NullCatalog {
    async fn find_matching_book(&self, _meta: &BookMeta) -> anyhow::Result<Option<i64>> {
        Ok(None)
    }

    async fn import_book(&self, _meta: &BookMeta, _files: &[&Path]) -> anyhow::Result<i64> {
        anyhow::bail!("no catalog library configured")
    }
}
