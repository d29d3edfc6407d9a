//! List command.

use console::style;

use crate::config::Settings;
use crate::repository::SortField;

/// List discovered records with paging and sorting.
pub async fn cmd_list(
    settings: &Settings,
    page: i64,
    per_page: i64,
    sort: &str,
    descending: bool,
) -> anyhow::Result<()> {
    let page = page.max(1) - 1;
    let per_page = per_page.clamp(10, 200);

    let ctx = settings.create_db_context();
    let (total, records) = ctx
        .scan_files()
        .list(page, per_page, SortField::from_str(sort), descending)
        .await?;

    if records.is_empty() {
        println!("{} No records (total {})", style("!").yellow(), total);
        return Ok(());
    }

    println!(
        "{:>5}  {:<9}  {:<30}  {:<20}  {}",
        "id", "status", "title", "author", "path"
    );
    for record in &records {
        println!(
            "{:>5}  {:<9}  {:<30}  {:<20}  {}",
            record.id,
            record.status.as_str(),
            truncate(&record.title, 30),
            truncate(&record.author, 20),
            record.path
        );
    }
    println!(
        "page {} of {} ({} records)",
        page + 1,
        (total + per_page - 1) / per_page.max(1),
        total
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
