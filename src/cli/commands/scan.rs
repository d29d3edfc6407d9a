//! Scan command.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::scanner::{ScanService, StatusReporter};

/// Run a scan over a directory under the trusted root.
pub async fn cmd_scan(settings: &Settings, path: Option<&Path>, wait: bool) -> anyhow::Result<()> {
    let scan_path = settings.resolve_scan_path(path)?;

    let ctx = settings.create_db_context();
    let service = ScanService::new(ctx.scan_files(), super::extractor(), super::catalog(settings))
        .with_background(settings.background);

    let total = service.run_scan(&scan_path).await?;
    if total == 0 {
        println!(
            "{} No matching book files under {}",
            style("!").yellow(),
            scan_path.display()
        );
        return Ok(());
    }

    println!(
        "{} Scan started: {} candidate file(s) under {}",
        style("✓").green(),
        total,
        scan_path.display()
    );

    if wait && settings.background {
        poll_until_settled(&StatusReporter::new(ctx.scan_files())).await?;
    } else if settings.background {
        println!("  Poll progress with 'shelf status'");
    }
    Ok(())
}

/// Poll scan status until no record is left unclassified.
async fn poll_until_settled(reporter: &StatusReporter) -> anyhow::Result<()> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} classified")
            .expect("static template"),
    );

    loop {
        let (_, counts) = reporter.scan_status().await?;
        pb.set_length(counts.total);
        pb.set_position(counts.total - counts.new);
        if counts.total > 0 && counts.new == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    pb.finish_and_clear();

    let (scan_id, counts) = reporter.scan_status().await?;
    println!("{} Scan {} finished:", style("✓").green(), scan_id);
    println!("  Ready:    {}", style(counts.ready).green());
    println!("  Existing: {}", style(counts.exist).yellow());
    println!("  Dropped:  {}", style(counts.dropped).dim());
    Ok(())
}
