// fulltext/src/indexer.rs
//! 索引模块 - 全文索引的写入与维护
//!
//! 每次写操作创建一个 IndexWriter，完成后提交并释放：
//! - 读者只会看到上一次提交的内容，重建过程中不会看到半成品
//! - 重建被取消时回滚到上一次提交
//! - 同一时刻只有一个写操作（进程内互斥锁）

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use query::SearchQuery;
use serde::Serialize;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::{IndexWriter, Term};

use crate::config::FulltextConfig;
use crate::documents::{BuiltDocuments, DocumentBuilder, FailedFile, SkippedFile};
use crate::error::{IndexError, Result};
use crate::extract::{PdfTextExtractor, TextExtractor};
use crate::models::{BibEntry, LinkedFile};
use crate::query_executor::QueryContext;
use crate::resolve::{DirectoryResolver, FileResolver};
use crate::search::FulltextHits;
use crate::store::IndexStore;

/// 协作式取消标志，可在线程间共享
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 一次写操作的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// 处理的条目数
    pub entries: usize,
    /// 写入的文档数（元数据 + 页面）
    pub documents: usize,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<FailedFile>,
}

impl RebuildReport {
    fn record(&mut self, built: BuiltDocuments) {
        self.entries += 1;
        self.documents += built.documents.len();
        self.skipped.extend(built.skipped);
        self.failed.extend(built.failed);
    }
}

/// 文献库的全文索引
pub struct FulltextIndexer {
    store: IndexStore,
    builder: DocumentBuilder,
    writer_memory: usize,
    search_limit: usize,
    write_lock: Mutex<()>,
    needs_rebuild: AtomicBool,
}

impl FulltextIndexer {
    /// 使用 pdf-extract 和配置中的文件目录打开索引
    pub fn open(path: &Path, config: &FulltextConfig) -> Result<Self> {
        let resolver = DirectoryResolver::new(config.file_directories.clone());
        Self::open_with(path, config, Arc::new(resolver), Arc::new(PdfTextExtractor))
    }

    /// 使用自定义的文件定位与文本提取打开索引
    pub fn open_with(
        path: &Path,
        config: &FulltextConfig,
        resolver: Arc<dyn FileResolver>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self> {
        let store = IndexStore::open(path)?;
        let needs_rebuild = AtomicBool::new(store.needs_rebuild());
        tracing::debug!("已打开全文索引: {:?} ({} 个文档)", path, store.num_docs());

        Ok(Self {
            store,
            builder: DocumentBuilder::new(resolver, extractor),
            writer_memory: config.writer_memory,
            search_limit: config.search_limit,
            write_lock: Mutex::new(()),
            needs_rebuild,
        })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// 已提交的文档数
    pub fn num_docs(&self) -> u64 {
        self.store.num_docs()
    }

    /// 索引为新建或刚被恢复，需要全量重建
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild.load(Ordering::SeqCst)
    }

    /// 清空后重新索引全部条目
    pub fn rebuild_index(&self, entries: &[BibEntry]) -> Result<RebuildReport> {
        self.rebuild_index_with(entries, &CancelFlag::new(), |_, _| {})
    }

    /// 带取消与进度回调 `(已完成, 总数)` 的全量重建
    ///
    /// 取消时回滚到上一次提交并返回 [`IndexError::Cancelled`]。
    pub fn rebuild_index_with<F>(
        &self,
        entries: &[BibEntry],
        cancel: &CancelFlag,
        mut progress: F,
    ) -> Result<RebuildReport>
    where
        F: FnMut(usize, usize),
    {
        let _guard = self.write_lock.lock();
        let mut writer = self.writer()?;
        writer.delete_all_documents()?;

        let total = entries.len();
        let mut report = RebuildReport::default();

        for (done, entry) in entries.iter().enumerate() {
            if cancel.is_cancelled() {
                writer.rollback()?;
                tracing::info!("索引重建已取消 ({}/{})", done, total);
                return Err(IndexError::Cancelled);
            }

            let built = self.builder.build(entry);
            for document in &built.documents {
                writer.add_document(document.to_document(&self.store.fields))?;
            }
            report.record(built);
            progress(done + 1, total);
        }

        self.commit(writer)?;
        self.needs_rebuild.store(false, Ordering::SeqCst);

        tracing::info!(
            "索引重建完成: {} 个条目, {} 个文档, 跳过 {} 个文件, {} 个解析失败",
            report.entries,
            report.documents,
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// 增量索引单个条目，替换该条目已有的全部文档
    pub fn add_to_index(&self, entry: &BibEntry) -> Result<RebuildReport> {
        // 提取在加锁前完成，不阻塞其他写操作
        let built = self.builder.build(entry);

        let _guard = self.write_lock.lock();
        let writer = self.writer()?;
        writer.delete_term(self.entry_term(&entry.id));
        for document in &built.documents {
            writer.add_document(document.to_document(&self.store.fields))?;
        }
        self.commit(writer)?;

        let mut report = RebuildReport::default();
        report.record(built);
        tracing::info!("已索引条目 {}: {} 个文档", entry.id, report.documents);
        Ok(report)
    }

    /// 只为条目新链接的文件补充页面文档
    pub fn add_linked_file(&self, entry: &BibEntry, file: &LinkedFile) -> Result<RebuildReport> {
        let mut built = BuiltDocuments::default();
        self.builder.build_file(entry, file, &mut built);

        let _guard = self.write_lock.lock();
        let writer = self.writer()?;
        writer.delete_query(self.linked_file_query(&entry.id, &file.link))?;
        for document in &built.documents {
            writer.add_document(document.to_document(&self.store.fields))?;
        }
        self.commit(writer)?;

        let mut report = RebuildReport::default();
        report.record(built);
        Ok(report)
    }

    /// 删除条目的元数据文档和全部页面文档
    pub fn remove_from_index(&self, entry_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let writer = self.writer()?;
        writer.delete_term(self.entry_term(entry_id));
        self.commit(writer)?;

        tracing::info!("已从索引删除条目: {}", entry_id);
        Ok(())
    }

    /// 删除条目某个链接文件的页面文档，元数据文档保留
    pub fn remove_linked_file(&self, entry_id: &str, link: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let writer = self.writer()?;
        writer.delete_query(self.linked_file_query(entry_id, link))?;
        self.commit(writer)?;

        tracing::info!("已从索引删除文件: {} ({})", link, entry_id);
        Ok(())
    }

    /// 搜索全文索引，结果按得分排序、惰性读取
    pub fn search(&self, query: &SearchQuery) -> Result<FulltextHits> {
        self.search_with_limit(query, self.search_limit)
    }

    pub fn search_with_limit(&self, query: &SearchQuery, limit: usize) -> Result<FulltextHits> {
        let context = QueryContext::new(&self.store.index, &self.store.fields);
        let tantivy_query = context.build(query)?;
        tracing::debug!("[全文搜索] '{}' -> {:?}", query.raw(), tantivy_query);

        FulltextHits::collect(
            self.store.reader.searcher(),
            self.store.fields,
            tantivy_query.as_ref(),
            limit,
        )
    }

    fn writer(&self) -> Result<IndexWriter> {
        Ok(self.store.index.writer(self.writer_memory)?)
    }

    /// 提交、等待合并线程并刷新读者
    fn commit(&self, mut writer: IndexWriter) -> Result<()> {
        writer.commit()?;
        writer.wait_merging_threads()?;
        self.store.reader.reload()?;
        Ok(())
    }

    fn entry_term(&self, entry_id: &str) -> Term {
        Term::from_field_text(self.store.fields.entry_id, entry_id)
    }

    fn linked_file_query(&self, entry_id: &str, link: &str) -> Box<dyn Query> {
        let entry = TermQuery::new(self.entry_term(entry_id), IndexRecordOption::Basic);
        let path = TermQuery::new(
            Term::from_field_text(self.store.fields.path, link),
            IndexRecordOption::Basic,
        );
        Box::new(BooleanQuery::new(vec![
            (Occur::Must, Box::new(entry) as Box<dyn Query>),
            (Occur::Must, Box::new(path)),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::tests::{StubExtractor, files_dir};
    use query::SearchFlags;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _index_dir: TempDir,
        files: TempDir,
        indexer: FulltextIndexer,
    }

    fn fixture(pages: usize) -> Fixture {
        let index_dir = TempDir::new().unwrap();
        let files = files_dir(&["thesis-example.pdf", "metaData.pdf", "thesis-example.aux"]);
        let indexer = FulltextIndexer::open_with(
            index_dir.path(),
            &FulltextConfig::default(),
            Arc::new(DirectoryResolver::new(vec![PathBuf::from(files.path())])),
            Arc::new(StubExtractor { pages }),
        )
        .unwrap();
        Fixture {
            _index_dir: index_dir,
            files,
            indexer,
        }
    }

    fn thesis() -> BibEntry {
        BibEntry::new("thesis", "phdthesis")
            .with_citation_key("ExampleThesis2017")
            .with_file(LinkedFile::new("Example Thesis", "thesis-example.pdf", "PDF"))
    }

    #[test]
    fn test_rebuild_indexes_metadata_and_pages() {
        let f = fixture(32);
        assert!(f.indexer.needs_rebuild());

        let report = f.indexer.rebuild_index(&[thesis()]).unwrap();

        assert_eq!(f.indexer.num_docs(), 33);
        assert_eq!(report.documents, 33);
        assert!(!f.indexer.needs_rebuild());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let f = fixture(4);
        f.indexer.rebuild_index(&[thesis()]).unwrap();
        f.indexer.rebuild_index(&[thesis()]).unwrap();
        assert_eq!(f.indexer.num_docs(), 5);
    }

    #[test]
    fn test_non_pdf_and_online_links_only_index_metadata() {
        let f = fixture(4);
        let aux = BibEntry::new("aux", "phdthesis")
            .with_file(LinkedFile::new("", "thesis-example.aux", "AUX"));
        let online = BibEntry::new("online", "phdthesis").with_file(LinkedFile::new(
            "",
            "https://example.org/thesis-example.pdf",
            "PDF",
        ));

        let report = f.indexer.rebuild_index(&[aux, online]).unwrap();

        assert_eq!(f.indexer.num_docs(), 2);
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn test_add_to_index_appends_single_entry() {
        let f = fixture(32);
        f.indexer.rebuild_index(&[thesis()]).unwrap();

        let metadata = BibEntry::new("meta", "article")
            .with_citation_key("MetaData2017")
            .with_file(LinkedFile::new("Metadata file", "metaData.pdf", "PDF"));
        // 找不到文件时只产生元数据文档
        std::fs::remove_file(f.files.path().join("metaData.pdf")).unwrap();
        f.indexer.add_to_index(&metadata).unwrap();

        assert_eq!(f.indexer.num_docs(), 34);
    }

    #[test]
    fn test_add_to_index_replaces_previous_documents() {
        let f = fixture(3);
        f.indexer.add_to_index(&thesis()).unwrap();
        f.indexer.add_to_index(&thesis()).unwrap();
        assert_eq!(f.indexer.num_docs(), 4);
    }

    #[test]
    fn test_remove_from_index() {
        let f = fixture(3);
        let other = BibEntry::new("other", "article");
        f.indexer.rebuild_index(&[thesis(), other]).unwrap();
        assert_eq!(f.indexer.num_docs(), 5);

        f.indexer.remove_from_index("thesis").unwrap();
        assert_eq!(f.indexer.num_docs(), 1);
    }

    #[test]
    fn test_remove_and_add_linked_file() {
        let f = fixture(3);
        f.indexer.rebuild_index(&[thesis()]).unwrap();

        f.indexer.remove_linked_file("thesis", "thesis-example.pdf").unwrap();
        assert_eq!(f.indexer.num_docs(), 1);

        let file = LinkedFile::new("", "thesis-example.pdf", "PDF");
        f.indexer.add_linked_file(&thesis(), &file).unwrap();
        assert_eq!(f.indexer.num_docs(), 4);
    }

    #[test]
    fn test_cancelled_rebuild_keeps_previous_state() {
        let f = fixture(3);
        f.indexer.rebuild_index(&[thesis()]).unwrap();

        let cancel = CancelFlag::new();
        let entries: Vec<_> = (0..5)
            .map(|i| BibEntry::new(format!("e{i}"), "article"))
            .collect();
        let result = f.indexer.rebuild_index_with(&entries, &cancel, |done, _| {
            if done == 2 {
                cancel.cancel();
            }
        });

        assert!(matches!(result, Err(IndexError::Cancelled)));
        assert_eq!(f.indexer.num_docs(), 4);
    }

    #[test]
    fn test_progress_reports_every_entry() {
        let f = fixture(1);
        let entries: Vec<_> = (0..3)
            .map(|i| BibEntry::new(format!("e{i}"), "article"))
            .collect();
        let mut seen = Vec::new();
        f.indexer
            .rebuild_index_with(&entries, &CancelFlag::new(), |done, total| {
                seen.push((done, total))
            })
            .unwrap();
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_index_survives_reopen() {
        let index_dir = TempDir::new().unwrap();
        let files = files_dir(&["thesis-example.pdf"]);
        let open = || {
            FulltextIndexer::open_with(
                index_dir.path(),
                &FulltextConfig::default(),
                Arc::new(DirectoryResolver::new(vec![PathBuf::from(files.path())])),
                Arc::new(StubExtractor { pages: 2 }),
            )
            .unwrap()
        };

        open().rebuild_index(&[thesis()]).unwrap();
        let reopened = open();
        assert_eq!(reopened.num_docs(), 3);
        assert!(!reopened.needs_rebuild());
    }

    #[test]
    fn test_empty_meta_file_keeps_index() {
        let index_dir = TempDir::new().unwrap();
        let files = files_dir(&["thesis-example.pdf"]);
        let open = || {
            FulltextIndexer::open_with(
                index_dir.path(),
                &FulltextConfig::default(),
                Arc::new(DirectoryResolver::new(vec![PathBuf::from(files.path())])),
                Arc::new(StubExtractor { pages: 3 }),
            )
            .unwrap()
        };

        open().rebuild_index(&[thesis()]).unwrap();
        std::fs::write(index_dir.path().join(crate::store::META_FILE_NAME), b"").unwrap();

        let reopened = open();
        assert_eq!(reopened.num_docs(), 4);
        assert!(!reopened.needs_rebuild());
    }

    #[test]
    fn test_search_finds_pages_and_metadata() {
        let f = fixture(2);
        let entry = thesis().with_field("title", "Neural networks for parsing");
        f.indexer.rebuild_index(&[entry, BibEntry::new("other", "article")]).unwrap();

        let hits: Vec<_> = f
            .indexer
            .search(&SearchQuery::new("neural", SearchFlags::empty()))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|hit| hit.entry_id == "thesis"));
        assert_eq!(hits.iter().filter(|hit| hit.page.is_some()).count(), 2);
    }
}
