//! Metadata extraction seam.
//!
//! Extraction failures are per-file events: the caller logs them, leaves
//! the record in its prior status and moves on. They never abort a batch.

mod epub;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::models::BookMeta;

/// Extracts book metadata from a file of a known format.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extract metadata. `format` is the lowercased file extension.
    async fn extract(&self, path: &Path, format: &str) -> anyhow::Result<BookMeta>;
}

/// Default extractor: EPUB containers are opened and their OPF package
/// document read; every other format falls back to a filename-derived
/// title, which is all the catalog match can go on for untagged files.
pub struct FileMetadataExtractor;

#[async_trait]
impl MetadataExtractor for FileMetadataExtractor {
    async fn extract(&self, path: &Path, format: &str) -> anyhow::Result<BookMeta> {
        if format == "epub" {
            // zip is synchronous; keep it off the async executor
            let path: PathBuf = path.to_path_buf();
            let meta = tokio::task::spawn_blocking(move || epub::read_metadata(&path)).await??;
            if !meta.title.is_empty() {
                return Ok(meta);
            }
            // Untitled OPF: fall through to the filename
        }
        Ok(BookMeta::with_title(title_from_filename(path)))
    }
}

/// Derive a title from the file stem, normalizing underscores.
fn title_from_filename(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " ").trim().to_string())
        .unwrap_or_default()
}
