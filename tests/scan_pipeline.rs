//! End-to-end pipeline tests over a temporary database and directory tree.
//!
//! Background workers are disabled so every job runs inline and the
//! assertions see the final state deterministically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use shelfscan::catalog::CatalogEngine;
use shelfscan::metadata::MetadataExtractor;
use shelfscan::models::{BookMeta, ScanFile, ScanStatus};
use shelfscan::repository::DbContext;
use shelfscan::scanner::{ImportService, PipelineError, ScanService, StatusReporter};

/// Extractor returning canned metadata by file name, with a
/// filename-derived fallback.
struct StubExtractor {
    metas: HashMap<String, BookMeta>,
}

impl StubExtractor {
    fn empty() -> Self {
        Self {
            metas: HashMap::new(),
        }
    }

    fn with(mut self, file_name: &str, meta: BookMeta) -> Self {
        self.metas.insert(file_name.to_string(), meta);
        self
    }
}

#[async_trait]
impl MetadataExtractor for StubExtractor {
    async fn extract(&self, path: &Path, _format: &str) -> anyhow::Result<BookMeta> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(meta) = self.metas.get(&name) {
            return Ok(meta.clone());
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(BookMeta::with_title(stem))
    }
}

/// In-memory catalog that matches by exact title and records imports.
#[derive(Default)]
struct FakeCatalog {
    matches: Mutex<HashMap<String, i64>>,
    imported: Mutex<Vec<String>>,
    next_id: AtomicI64,
}

impl FakeCatalog {
    fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    fn add_match(&self, title: &str, book_id: i64) {
        self.matches.lock().unwrap().insert(title.to_string(), book_id);
    }

    fn imported_titles(&self) -> Vec<String> {
        self.imported.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogEngine for FakeCatalog {
    async fn find_matching_book(&self, meta: &BookMeta) -> anyhow::Result<Option<i64>> {
        Ok(self.matches.lock().unwrap().get(&meta.title).copied())
    }

    async fn import_book(&self, meta: &BookMeta, _files: &[&Path]) -> anyhow::Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.imported.lock().unwrap().push(meta.title.clone());
        self.matches.lock().unwrap().insert(meta.title.clone(), id);
        Ok(id)
    }
}

struct TestEnv {
    _tmp: TempDir,
    ctx: DbContext,
    books: PathBuf,
    catalog: Arc<FakeCatalog>,
}

impl TestEnv {
    async fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let ctx = DbContext::new(&tmp.path().join("shelfscan.db"));
        ctx.init_schema().await.unwrap();
        let books = tmp.path().join("books");
        std::fs::create_dir(&books).unwrap();
        Self {
            _tmp: tmp,
            ctx,
            books,
            catalog: Arc::new(FakeCatalog::new()),
        }
    }

    fn scan_service(&self, extractor: StubExtractor) -> ScanService {
        ScanService::new(
            self.ctx.scan_files(),
            Arc::new(extractor),
            self.catalog.clone(),
        )
        .with_background(false)
    }

    fn import_service(&self, extractor: StubExtractor) -> ImportService {
        ImportService::new(
            self.ctx.scan_files(),
            Arc::new(extractor),
            self.catalog.clone(),
        )
        .with_background(false)
    }

    fn reporter(&self) -> StatusReporter {
        StatusReporter::new(self.ctx.scan_files())
    }

    fn write_book(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.books.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    async fn all_records(&self) -> Vec<ScanFile> {
        self.ctx.scan_files().records_by_hashes(None).await.unwrap()
    }
}

#[tokio::test]
async fn scan_empty_directory_reports_zero() {
    let env = TestEnv::new().await;
    let service = env.scan_service(StubExtractor::empty());

    let total = service.run_scan(&env.books).await.unwrap();
    assert_eq!(total, 0);

    let (scan_id, counts) = env.reporter().scan_status().await.unwrap();
    assert_eq!(scan_id, 0);
    assert_eq!(counts.total, 0);
}

#[tokio::test]
async fn scan_single_new_book_becomes_ready() {
    let env = TestEnv::new().await;
    env.write_book("book.epub", b"epub bytes");
    let service = env.scan_service(StubExtractor::empty());

    let total = service.run_scan(&env.books).await.unwrap();
    assert_eq!(total, 1);

    let records = env.all_records().await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.status, ScanStatus::Ready);
    assert_eq!(record.title, "book");
    assert_eq!(record.book_id, 0);
    assert!(record.hash.starts_with("sha256:"));
    assert!(record.scan_id > 0);

    let (_, counts) = env.reporter().scan_status().await.unwrap();
    assert_eq!(counts.total, 1);
    assert_eq!(counts.ready, 1);
}

#[tokio::test]
async fn rescanning_unchanged_directory_inserts_nothing() {
    let env = TestEnv::new().await;
    env.write_book("one.epub", b"a");
    env.write_book("two.mobi", b"bb");
    let service = env.scan_service(StubExtractor::empty());

    service.run_scan(&env.books).await.unwrap();
    let before = env.all_records().await;
    assert_eq!(before.len(), 2);

    // Second run over the unchanged tree: paths already exist.
    service.run_scan(&env.books).await.unwrap();
    let after = env.all_records().await;
    assert_eq!(after.len(), 2);
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.status, b.status);
        assert_eq!(a.scan_id, b.scan_id);
    }
}

#[tokio::test]
async fn duplicate_metadata_and_size_drops_second_file() {
    let env = TestEnv::new().await;
    // Same length, different bytes: the hash only sees metadata and size.
    env.write_book("a.txt", b"first");
    env.write_book("b.txt", b"other");
    let meta = BookMeta {
        title: "Same Book".to_string(),
        author: "Same Author".to_string(),
        ..Default::default()
    };
    let extractor = StubExtractor::empty()
        .with("a.txt", meta.clone())
        .with("b.txt", meta);
    let service = env.scan_service(extractor);

    service.run_scan(&env.books).await.unwrap();

    let records = env.all_records().await;
    assert_eq!(records.len(), 2);
    let a = records.iter().find(|r| r.name == "a.txt").unwrap();
    let b = records.iter().find(|r| r.name == "b.txt").unwrap();
    assert_eq!(a.status, ScanStatus::Ready);
    assert_eq!(b.status, ScanStatus::Drop);
    assert_eq!(a.hash, b.hash);
    assert_eq!(b.book_id, 0);
}

#[tokio::test]
async fn duplicate_hash_across_runs_is_dropped() {
    let env = TestEnv::new().await;
    env.write_book("a.txt", b"12345");
    let meta = BookMeta::with_title("Crossrun");
    let service = env.scan_service(StubExtractor::empty().with("a.txt", meta.clone()));
    service.run_scan(&env.books).await.unwrap();

    // New path, same metadata and size, discovered by a later run.
    env.write_book("c.txt", b"54321");
    let service = env.scan_service(StubExtractor::empty().with("c.txt", meta));
    service.run_scan(&env.books).await.unwrap();

    let records = env.all_records().await;
    let c = records.iter().find(|r| r.name == "c.txt").unwrap();
    assert_eq!(c.status, ScanStatus::Drop);
}

#[tokio::test]
async fn catalog_match_marks_exist_at_scan_time() {
    let env = TestEnv::new().await;
    env.write_book("known.epub", b"x");
    env.catalog.add_match("known", 77);
    let service = env.scan_service(StubExtractor::empty());

    service.run_scan(&env.books).await.unwrap();

    let records = env.all_records().await;
    assert_eq!(records[0].status, ScanStatus::Exist);
    assert_eq!(records[0].book_id, 77);
}

#[tokio::test]
async fn import_all_imports_ready_records() {
    let env = TestEnv::new().await;
    env.write_book("novel.epub", b"contents");
    env.scan_service(StubExtractor::empty())
        .run_scan(&env.books)
        .await
        .unwrap();

    let total = env
        .import_service(StubExtractor::empty())
        .run_import(None, 1)
        .await
        .unwrap();
    assert_eq!(total, 1);

    let records = env.all_records().await;
    assert_eq!(records[0].status, ScanStatus::Imported);
    assert!(records[0].book_id >= 100);
    assert!(records[0].import_id > 0);
    assert_eq!(env.catalog.imported_titles(), vec!["novel".to_string()]);

    let (import_id, counts) = env.reporter().import_status().await.unwrap();
    assert_eq!(import_id, records[0].import_id);
    assert_eq!(counts.total, 1);
    assert_eq!(counts.imported, 1);
}

#[tokio::test]
async fn import_recheck_marks_concurrent_duplicate_as_exist() {
    let env = TestEnv::new().await;
    env.write_book("dupe.epub", b"y");
    env.scan_service(StubExtractor::empty())
        .run_scan(&env.books)
        .await
        .unwrap();

    // The same book lands in the catalog between scan and import.
    env.catalog.add_match("dupe", 55);
    env.import_service(StubExtractor::empty())
        .run_import(None, 1)
        .await
        .unwrap();

    let records = env.all_records().await;
    assert_eq!(records[0].status, ScanStatus::Exist);
    assert_eq!(records[0].book_id, 55);
    assert!(env.catalog.imported_titles().is_empty());
}

#[tokio::test]
async fn import_with_hash_filter_leaves_other_records_untouched() {
    let env = TestEnv::new().await;
    env.write_book("a.epub", b"a");
    env.write_book("b.epub", b"bb");
    env.write_book("c.epub", b"ccc");
    env.catalog.add_match("c", 9);
    env.scan_service(StubExtractor::empty())
        .run_scan(&env.books)
        .await
        .unwrap();

    let records = env.all_records().await;
    let a_hash = records
        .iter()
        .find(|r| r.name == "a.epub")
        .unwrap()
        .hash
        .clone();

    let total = env
        .import_service(StubExtractor::empty())
        .run_import(Some(vec![a_hash]), 1)
        .await
        .unwrap();
    assert_eq!(total, 1);

    let records = env.all_records().await;
    let a = records.iter().find(|r| r.name == "a.epub").unwrap();
    let b = records.iter().find(|r| r.name == "b.epub").unwrap();
    let c = records.iter().find(|r| r.name == "c.epub").unwrap();
    assert_eq!(a.status, ScanStatus::Imported);
    assert!(a.import_id > 0);
    assert_eq!(b.status, ScanStatus::Ready);
    assert_eq!(b.import_id, 0);
    assert_eq!(c.status, ScanStatus::Exist);
    assert_eq!(c.import_id, 0);
}

#[tokio::test]
async fn import_with_empty_selection_is_a_parameter_error() {
    let env = TestEnv::new().await;
    let err = env
        .import_service(StubExtractor::empty())
        .run_import(Some(Vec::new()), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptySelection));
}

#[tokio::test]
async fn import_with_nothing_ready_reports_empty() {
    let env = TestEnv::new().await;
    let total = env
        .import_service(StubExtractor::empty())
        .run_import(None, 1)
        .await
        .unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn status_counts_sum_to_total() {
    let env = TestEnv::new().await;
    env.write_book("x.epub", b"1");
    env.write_book("y.epub", b"22");
    env.write_book("z.epub", b"22");
    env.catalog.add_match("x", 5);
    // y and z share metadata and size, so z is dropped.
    let meta = BookMeta::with_title("shared");
    let extractor = StubExtractor::empty()
        .with("y.epub", meta.clone())
        .with("z.epub", meta);
    env.scan_service(extractor).run_scan(&env.books).await.unwrap();

    let (_, counts) = env.reporter().scan_status().await.unwrap();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.exist, 1);
    assert_eq!(counts.ready, 1);
    assert_eq!(counts.dropped, 1);
    assert_eq!(
        counts.exist + counts.ready + counts.dropped + counts.new + counts.imported,
        counts.total
    );
}

#[tokio::test]
async fn delete_all_removes_only_imported_files_when_asked() {
    let env = TestEnv::new().await;
    let imported_path = env.write_book("keepers.epub", b"imported");
    let ready_path = env.write_book("waiting.epub", b"ready");
    env.scan_service(StubExtractor::empty())
        .run_scan(&env.books)
        .await
        .unwrap();

    // Import only the first book.
    let records = env.all_records().await;
    let hash = records
        .iter()
        .find(|r| r.name == "keepers.epub")
        .unwrap()
        .hash
        .clone();
    env.import_service(StubExtractor::empty())
        .run_import(Some(vec![hash]), 1)
        .await
        .unwrap();

    // hashlist=all, delete_success=true, delete_failed=false
    let outcome = env
        .scan_service(StubExtractor::empty())
        .delete_records(None, true, false)
        .await
        .unwrap();
    assert_eq!(outcome.records_deleted, 2);
    assert_eq!(outcome.files_deleted, 1);
    assert!(!imported_path.exists());
    assert!(ready_path.exists());
    assert!(env.all_records().await.is_empty());
}

#[tokio::test]
async fn delete_with_empty_selection_is_a_parameter_error() {
    let env = TestEnv::new().await;
    let err = env
        .scan_service(StubExtractor::empty())
        .delete_records(Some(Vec::new()), true, true)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptySelection));
}

#[tokio::test]
async fn terminal_records_never_regress() {
    let env = TestEnv::new().await;
    env.write_book("stable.epub", b"z");
    env.scan_service(StubExtractor::empty())
        .run_scan(&env.books)
        .await
        .unwrap();
    env.import_service(StubExtractor::empty())
        .run_import(None, 1)
        .await
        .unwrap();

    let repo = env.ctx.scan_files();
    let mut record = env.all_records().await.remove(0);
    assert_eq!(record.status, ScanStatus::Imported);

    // An imported record cannot be written back to an earlier status.
    record.status = ScanStatus::New;
    assert!(!repo.save(&record).await.unwrap());
    let stored = env.all_records().await.remove(0);
    assert_eq!(stored.status, ScanStatus::Imported);
}
