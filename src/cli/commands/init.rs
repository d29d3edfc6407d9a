//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(&settings.data_dir)?;

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    println!(
        "{} Initialized shelfscan in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!("  Database:  {}", settings.database_path().display());
    println!("  Scan root: {}", settings.scan_root.display());
    if settings.calibre_library.is_none() {
        println!(
            "{} No calibre_library configured; imports are disabled",
            style("!").yellow()
        );
    }
    Ok(())
}
