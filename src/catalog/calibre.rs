//! Catalog engine backed by the `calibredb` system binary.
//!
//! Matching is by exact title, the same check the library's own duplicate
//! detection performs. Title-less files never match anything.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::models::BookMeta;

use super::CatalogEngine;

/// Calibre catalog driven through the `calibredb` CLI.
pub struct CalibreCli {
    library: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ListedBook {
    id: i64,
}

impl CalibreCli {
    pub fn new(library: impl Into<PathBuf>) -> Self {
        Self {
            library: library.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new("calibredb")
            .arg("--with-library")
            .arg(&self.library)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            anyhow::bail!(
                "calibredb {} failed: {}",
                args.first().unwrap_or(&""),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl CatalogEngine for CalibreCli {
    async fn find_matching_book(&self, meta: &BookMeta) -> anyhow::Result<Option<i64>> {
        if meta.title.is_empty() {
            return Ok(None);
        }
        let search = format!("title:\"={}\"", meta.title.replace('"', ""));
        let stdout = self
            .run(&["list", "--for-machine", "--fields", "id", "--search", &search])
            .await?;
        let books: Vec<ListedBook> = serde_json::from_str(stdout.trim())?;
        Ok(books.first().map(|b| b.id))
    }

    async fn import_book(&self, meta: &BookMeta, files: &[&Path]) -> anyhow::Result<i64> {
        let mut args: Vec<String> = vec!["add".to_string()];
        if !meta.title.is_empty() {
            args.push("--title".to_string());
            args.push(meta.title.clone());
        }
        if !meta.author.is_empty() {
            args.push("--authors".to_string());
            args.push(meta.author.clone());
        }
        let tags = meta.tags_joined();
        if !tags.is_empty() {
            args.push("--tags".to_string());
            args.push(tags);
        }
        for file in files {
            args.push(file.display().to_string());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let stdout = self.run(&arg_refs).await?;
        parse_added_ids(&stdout)
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("calibredb add reported no new book id"))
    }
}

/// Parse book ids out of calibredb's "Added book ids: 1, 2" summary line.
fn parse_added_ids(stdout: &str) -> Vec<i64> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Added book ids:"))
        .map(|ids| {
            ids.split(',')
                .filter_map(|id| id.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_added_ids() {
        assert_eq!(parse_added_ids("Added book ids: 42\n"), vec![42]);
        assert_eq!(parse_added_ids("Added book ids: 7, 8\n"), vec![7, 8]);
        assert!(parse_added_ids("Backing up metadata\n").is_empty());
    }
}
