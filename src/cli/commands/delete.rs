//! Delete command.

use console::style;

use crate::config::Settings;
use crate::scanner::ScanService;

/// Delete records by hash selection, optionally removing files from disk.
pub async fn cmd_delete(
    settings: &Settings,
    hashes: Vec<String>,
    all: bool,
    delete_imported: bool,
    delete_others: bool,
) -> anyhow::Result<()> {
    if hashes.is_empty() && !all {
        println!(
            "{} Nothing selected; pass --hash or --all",
            style("✗").red()
        );
        return Ok(());
    }
    let filter = if all { None } else { Some(hashes) };

    let ctx = settings.create_db_context();
    let service = ScanService::new(ctx.scan_files(), super::extractor(), super::catalog(settings));

    let outcome = service
        .delete_records(filter, delete_imported, delete_others)
        .await?;
    println!(
        "{} Deleted {} record(s), removed {} file(s) from disk",
        style("✓").green(),
        outcome.records_deleted,
        outcome.files_deleted
    );
    Ok(())
}
