//! Status command.

use console::style;

use crate::config::Settings;
use crate::scanner::StatusReporter;

/// Show status counts for the latest scan or import batch.
pub async fn cmd_status(settings: &Settings, import: bool) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    let reporter = StatusReporter::new(ctx.scan_files());

    let (kind, (batch_id, counts)) = if import {
        ("import", reporter.import_status().await?)
    } else {
        ("scan", reporter.scan_status().await?)
    };

    if batch_id == 0 {
        println!("{} No {} batch has run yet", style("!").yellow(), kind);
        return Ok(());
    }

    println!("{} batch {}", style(kind).bold(), batch_id);
    println!("  {:<10} {:>6}", "total:", counts.total);
    println!("  {:<10} {:>6}", "new:", counts.new);
    println!("  {:<10} {:>6}", "ready:", style(counts.ready).green());
    println!("  {:<10} {:>6}", "exist:", style(counts.exist).yellow());
    println!("  {:<10} {:>6}", "drop:", style(counts.dropped).dim());
    println!(
        "  {:<10} {:>6}",
        "imported:",
        style(counts.imported).green()
    );
    Ok(())
}
