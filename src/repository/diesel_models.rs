//! Diesel ORM models for database tables.

use diesel::prelude::*;

use crate::models::{ScanFile, ScanStatus};
use crate::schema;

use super::parse_datetime;

/// Scan file record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::scan_files)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScanFileRecord {
    pub id: i32,
    pub scan_id: i64,
    pub import_id: i64,
    pub name: String,
    pub path: String,
    pub hash: String,
    pub status: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub tags: String,
    pub book_id: i64,
    pub create_time: String,
    pub update_time: String,
}

/// New scan file placeholder for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::scan_files)]
pub struct NewScanFile<'a> {
    pub scan_id: i64,
    pub import_id: i64,
    pub name: &'a str,
    pub path: &'a str,
    pub hash: &'a str,
    pub status: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub publisher: &'a str,
    pub tags: &'a str,
    pub book_id: i64,
    pub create_time: &'a str,
    pub update_time: &'a str,
}

impl From<ScanFileRecord> for ScanFile {
    fn from(record: ScanFileRecord) -> Self {
        ScanFile {
            id: record.id,
            scan_id: record.scan_id,
            import_id: record.import_id,
            name: record.name,
            path: record.path,
            hash: record.hash,
            // Unknown strings degrade to the initial status rather than failing the load.
            status: ScanStatus::from_str(&record.status).unwrap_or(ScanStatus::New),
            title: record.title,
            author: record.author,
            publisher: record.publisher,
            tags: record.tags,
            book_id: record.book_id,
            create_time: parse_datetime(&record.create_time),
            update_time: parse_datetime(&record.update_time),
        }
    }
}

/// Book ownership link record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::book_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookItemRecord {
    pub id: i32,
    pub book_id: i64,
    pub collector_id: i64,
    pub create_time: String,
}

/// New ownership link for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::book_items)]
pub struct NewBookItem<'a> {
    pub book_id: i64,
    pub collector_id: i64,
    pub create_time: &'a str,
}
