//! Candidate file enumeration.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions eligible for scanning.
pub const SCAN_EXTENSIONS: [&str; 6] = ["azw", "azw3", "epub", "mobi", "pdf", "txt"];

/// One file eligible for scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// File name without directory.
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Lowercased extension.
    pub format: String,
}

/// Lowercased extension of a path, empty when there is none.
pub fn format_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Lazily enumerate candidate files under a root directory.
///
/// Recurses through every subdirectory in lexicographic order so runs over
/// an unchanged tree are reproducible. Files with other extensions and
/// unreadable directory entries are silently skipped.
pub fn walk(root: &Path) -> impl Iterator<Item = Candidate> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let format = format_of(entry.path());
            if !SCAN_EXTENSIONS.contains(&format.as_str()) {
                return None;
            }
            Some(Candidate {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                format,
            })
        })
}
