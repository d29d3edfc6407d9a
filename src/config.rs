//! Configuration management for shelfscan.
//!
//! Settings come from an optional TOML file (`shelfscan.toml` next to the
//! data directory, or an explicit `--config` path) with environment
//! variable overrides on top. Paths are shell-expanded so `~` works in
//! config files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::repository::DbContext;
use crate::scanner::{validate_scan_path, PipelineError};

const DEFAULT_DATABASE_FILENAME: &str = "shelfscan.db";

/// Runtime settings for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside the data directory.
    pub database_filename: String,
    /// Trusted prefix scans must stay under. Guards against pointing the
    /// scanner at arbitrary system directories.
    pub scan_root: PathBuf,
    /// Default directory to scan when none is given on the command line.
    pub scan_dir: Option<PathBuf>,
    /// Calibre library directory; unset means scan-only operation.
    pub calibre_library: Option<PathBuf>,
    /// Collector id recorded on ownership links for imported books.
    pub collector_id: i64,
    /// Run scan/import work on background workers. Disabled in tests.
    pub background: bool,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shelfscan");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            scan_root: PathBuf::from("/data"),
            scan_dir: None,
            calibre_library: None,
            collector_id: 1,
            background: true,
        }
    }
}

impl Settings {
    /// Load settings: config file (when present) with env overrides.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)?
            }
            None => {
                let default_path = Self::default().data_dir.join("shelfscan.toml");
                if default_path.is_file() {
                    let raw = std::fs::read_to_string(&default_path)?;
                    toml::from_str(&raw)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env();
        settings.expand_paths();
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("SHELFSCAN_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(root) = std::env::var("SHELFSCAN_SCAN_ROOT") {
            self.scan_root = PathBuf::from(root);
        }
        if let Ok(library) = std::env::var("SHELFSCAN_CALIBRE_LIBRARY") {
            self.calibre_library = Some(PathBuf::from(library));
        }
    }

    fn expand_paths(&mut self) {
        let expand = |path: &PathBuf| -> PathBuf {
            PathBuf::from(shellexpand::tilde(&path.display().to_string()).into_owned())
        };
        self.data_dir = expand(&self.data_dir);
        self.scan_root = expand(&self.scan_root);
        self.scan_dir = self.scan_dir.as_ref().map(expand);
        self.calibre_library = self.calibre_library.as_ref().map(expand);
    }

    /// Path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Create a database context for this configuration.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::new(&self.database_path())
    }

    /// Resolve and validate the directory a scan should run over.
    ///
    /// An explicit path must lie under the trusted scan root; with no
    /// explicit path the configured scan_dir (or the root itself) is used.
    pub fn resolve_scan_path(&self, explicit: Option<&Path>) -> Result<PathBuf, PipelineError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => self
                .scan_dir
                .clone()
                .unwrap_or_else(|| self.scan_root.clone()),
        };
        validate_scan_path(&path, &self.scan_root)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.scan_root, PathBuf::from("/data"));
        assert!(settings.background);
        assert_eq!(settings.collector_id, 1);
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings =
            toml::from_str("scan_root = \"/srv/books\"\nbackground = false\n").unwrap();
        assert_eq!(settings.scan_root, PathBuf::from("/srv/books"));
        assert!(!settings.background);
        assert_eq!(settings.database_filename, DEFAULT_DATABASE_FILENAME);
    }

    #[test]
    fn test_resolve_scan_path_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            scan_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert!(settings.resolve_scan_path(Some(Path::new("/etc"))).is_err());
        assert_eq!(settings.resolve_scan_path(None).unwrap(), dir.path());
    }
}
