//! Import command.

use console::style;

use crate::config::Settings;
use crate::scanner::ImportService;

/// Import ready records into the catalog.
pub async fn cmd_import(settings: &Settings, hashes: Vec<String>) -> anyhow::Result<()> {
    if settings.calibre_library.is_none() {
        println!(
            "{} No calibre_library configured; nothing can be imported",
            style("✗").red()
        );
        return Ok(());
    }

    let ctx = settings.create_db_context();
    let service =
        ImportService::new(ctx.scan_files(), super::extractor(), super::catalog(settings))
            .with_background(settings.background);

    let filter = if hashes.is_empty() { None } else { Some(hashes) };
    let total = service.run_import(filter, settings.collector_id).await?;
    if total == 0 {
        println!("{} No books waiting for import", style("!").yellow());
        return Ok(());
    }

    println!(
        "{} Import started over {} record(s)",
        style("✓").green(),
        total
    );
    if settings.background {
        println!("  Poll progress with 'shelf status --import'");
    }
    Ok(())
}
