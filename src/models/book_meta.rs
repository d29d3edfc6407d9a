//! Extracted book metadata and the content-identity hash derived from it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata extracted from an e-book file.
///
/// Fields mirror what metadata extractors can reliably pull out of the
/// common formats; all of them may be empty for poorly tagged files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMeta {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub tags: Vec<String>,
}

impl BookMeta {
    /// Create metadata with just a title (filename-derived fallback).
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Comma-joined tag list as stored in the database.
    pub fn tags_joined(&self) -> String {
        self.tags.join(", ")
    }

    /// Compute the content-identity hash for a file with this metadata.
    ///
    /// The hash covers title, author, publisher, joined tags and the file
    /// size in hex - never the file contents, which keeps scans over large
    /// libraries cheap. Two distinct files with identical metadata and size
    /// collide on purpose; the scanner treats that as a duplicate.
    pub fn content_hash(&self, file_size: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        hasher.update(self.author.as_bytes());
        hasher.update(self.publisher.as_bytes());
        hasher.update(self.tags_joined().as_bytes());
        hasher.update(format!("{:#x}", file_size).as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> BookMeta {
        BookMeta {
            title: "The Manual".to_string(),
            author: "Nobody, Some".to_string(),
            publisher: "Small Press".to_string(),
            tags: vec!["reference".to_string(), "fiction".to_string()],
        }
    }

    #[test]
    fn test_hash_is_stable_and_prefixed() {
        let a = meta().content_hash(4096);
        let b = meta().content_hash(4096);
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 64);
    }

    #[test]
    fn test_hash_varies_with_size() {
        assert_ne!(meta().content_hash(4096), meta().content_hash(4097));
    }

    #[test]
    fn test_hash_varies_with_metadata() {
        let mut other = meta();
        other.title = "Another Manual".to_string();
        assert_ne!(meta().content_hash(4096), other.content_hash(4096));
    }

    #[test]
    fn test_empty_fields_hash() {
        // Empty metadata still hashes; only the size differentiates.
        let empty = BookMeta::default();
        assert_ne!(empty.content_hash(1), empty.content_hash(2));
    }
}
