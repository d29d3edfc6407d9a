//! Command implementations.

mod delete;
mod import;
mod init;
mod list;
mod scan;
mod status;

use std::sync::Arc;

use crate::catalog::{CalibreCli, CatalogEngine, NullCatalog};
use crate::config::Settings;
use crate::metadata::{FileMetadataExtractor, MetadataExtractor};

pub use delete::cmd_delete;
pub use import::cmd_import;
pub use init::cmd_init;
pub use list::cmd_list;
pub use scan::cmd_scan;
pub use status::cmd_status;

/// Metadata extractor shared by the scan and import commands.
fn extractor() -> Arc<dyn MetadataExtractor> {
    Arc::new(FileMetadataExtractor)
}

/// Catalog engine from configuration. Without a configured library the
/// null catalog is used: scans classify everything as ready.
fn catalog(settings: &Settings) -> Arc<dyn CatalogEngine> {
    match &settings.calibre_library {
        Some(library) => Arc::new(CalibreCli::new(library.clone())),
        None => Arc::new(NullCatalog),
    }
}
