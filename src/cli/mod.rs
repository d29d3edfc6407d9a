//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Scan-and-import pipeline for a personal e-book library")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,
    /// Scan a directory tree for candidate e-book files
    Scan {
        /// Directory to scan (defaults to the configured scan_dir)
        path: Option<PathBuf>,
        /// Poll status until the scan settles
        #[arg(long)]
        wait: bool,
    },
    /// List discovered records
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: i64,
        /// Records per page
        #[arg(long, default_value_t = 20)]
        per_page: i64,
        /// Sort field: id, path, name, create_time, update_time
        #[arg(long, default_value = "create_time")]
        sort: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Import ready records into the catalog
    Import {
        /// Hashes to import; imports all ready records when omitted
        #[arg(long = "hash")]
        hashes: Vec<String>,
    },
    /// Show status counts of the latest batch
    Status {
        /// Show the latest import batch instead of the latest scan
        #[arg(long)]
        import: bool,
    },
    /// Delete records, optionally removing their files from disk
    Delete {
        /// Hashes to delete
        #[arg(long = "hash")]
        hashes: Vec<String>,
        /// Delete every record
        #[arg(long)]
        all: bool,
        /// Also remove files of imported records from disk
        #[arg(long)]
        delete_imported: bool,
        /// Also remove files of records that were not imported
        #[arg(long)]
        delete_others: bool,
    },
}

/// Peek at argv for the verbose flag before clap runs, so logging can be
/// initialized first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&settings).await,
        Commands::Scan { path, wait } => {
            commands::cmd_scan(&settings, path.as_deref(), wait).await
        }
        Commands::List {
            page,
            per_page,
            sort,
            asc,
        } => commands::cmd_list(&settings, page, per_page, &sort, !asc).await,
        Commands::Import { hashes } => commands::cmd_import(&settings, hashes).await,
        Commands::Status { import } => commands::cmd_status(&settings, import).await,
        Commands::Delete {
            hashes,
            all,
            delete_imported,
            delete_others,
        } => commands::cmd_delete(&settings, hashes, all, delete_imported, delete_others).await,
    }
}
