// fulltext/src/search.rs
//! 搜索模块
//!
//! - [`FulltextHits`]: 全文索引命中，按得分排序，逐条惰性读取存储的文档
//! - [`search_library`]: 字段匹配与全文命中的合并，索引不可用时只用字段匹配

use std::collections::HashMap;

use query::SearchQuery;
use serde::Serialize;
use tantivy::collector::TopDocs;
use tantivy::query::Query;
use tantivy::schema::Value;
use tantivy::{DocAddress, Score, Searcher, TantivyDocument};

use crate::error::Result;
use crate::indexer::FulltextIndexer;
use crate::models::{BibEntry, EntryId};
use crate::schema::{KIND_PAGE, SchemaFields};

/// 单条全文命中
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulltextHit {
    pub entry_id: EntryId,
    pub citation_key: Option<String>,
    /// 页面命中时的文件链接
    pub path: Option<String>,
    /// 页面命中时的页码，元数据命中时为空
    pub page: Option<u64>,
    pub score: Score,
}

/// 全文命中序列
///
/// 只能向前遍历一次；需要再次遍历时重新搜索。
pub struct FulltextHits {
    searcher: Searcher,
    fields: SchemaFields,
    addresses: std::vec::IntoIter<(Score, DocAddress)>,
}

impl FulltextHits {
    pub(crate) fn collect(
        searcher: Searcher,
        fields: SchemaFields,
        query: &dyn Query,
        limit: usize,
    ) -> Result<Self> {
        let top_docs = searcher.search(query, &TopDocs::with_limit(limit.max(1)))?;
        tracing::debug!("[全文搜索] 找到 {} 个文档", top_docs.len());

        Ok(Self {
            searcher,
            fields,
            addresses: top_docs.into_iter(),
        })
    }

    fn load(&self, score: Score, address: DocAddress) -> Result<FulltextHit> {
        let doc: TantivyDocument = self.searcher.doc(address)?;
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        let is_page = text(self.fields.kind).as_deref() == Some(KIND_PAGE);
        Ok(FulltextHit {
            entry_id: text(self.fields.entry_id).unwrap_or_default(),
            citation_key: text(self.fields.citation_key),
            path: if is_page { text(self.fields.path) } else { None },
            page: if is_page {
                doc.get_first(self.fields.page).and_then(|v| v.as_u64())
            } else {
                None
            },
            score,
        })
    }
}

impl Iterator for FulltextHits {
    type Item = Result<FulltextHit>;

    fn next(&mut self) -> Option<Self::Item> {
        let (score, address) = self.addresses.next()?;
        Some(self.load(score, address))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.addresses.size_hint()
    }
}

/// 命中页面
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageHit {
    pub path: String,
    pub page: u64,
    pub score: Score,
}

/// 文献库搜索中的一个条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryHit {
    pub entry_id: EntryId,
    /// 字段匹配是否命中
    pub matches_fields: bool,
    /// 全文命中的页面，按得分排序
    pub pages: Vec<PageHit>,
}

/// 文献库搜索结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LibrarySearch {
    /// 按文献库顺序排列
    pub hits: Vec<LibraryHit>,
    /// 全文索引不可用，只有字段匹配结果
    pub fulltext_unavailable: bool,
}

/// 在整个文献库中搜索
///
/// 条目的字段满足查询，或其 PDF 有页面命中，即出现在结果中。
/// 命名字段上的比较已经排除的条目不附加页面命中。
/// 无效查询返回空结果；全文搜索失败时记录警告并退回到字段匹配。
pub fn search_library(
    query: &SearchQuery,
    entries: &[BibEntry],
    indexer: Option<&FulltextIndexer>,
) -> LibrarySearch {
    if !query.is_valid() {
        return LibrarySearch::default();
    }

    let mut fulltext_unavailable = indexer.is_none();
    let mut pages: HashMap<EntryId, Vec<PageHit>> = HashMap::new();

    // 空查询匹配所有条目，不需要全文命中
    if let Some(indexer) = indexer.filter(|_| !query.raw().trim().is_empty()) {
        match fulltext_pages(indexer, query) {
            Ok(found) => pages = found,
            Err(e) => {
                tracing::warn!("全文搜索失败，只使用字段匹配: {}", e);
                fulltext_unavailable = true;
            }
        }
    }

    let hits = entries
        .iter()
        .filter_map(|entry| {
            let matches_fields = query.is_match(entry);
            let entry_pages = pages
                .remove(&entry.id)
                .filter(|_| query.fields_allow_match(entry))
                .unwrap_or_default();
            (matches_fields || !entry_pages.is_empty()).then(|| LibraryHit {
                entry_id: entry.id.clone(),
                matches_fields,
                pages: entry_pages,
            })
        })
        .collect();

    LibrarySearch {
        hits,
        fulltext_unavailable,
    }
}

fn fulltext_pages(
    indexer: &FulltextIndexer,
    query: &SearchQuery,
) -> Result<HashMap<EntryId, Vec<PageHit>>> {
    let mut pages: HashMap<EntryId, Vec<PageHit>> = HashMap::new();
    for hit in indexer.search(query)? {
        let hit = hit?;
        if let (Some(path), Some(page)) = (hit.path, hit.page) {
            pages.entry(hit.entry_id).or_default().push(PageHit {
                path,
                page,
                score: hit.score,
            });
        }
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FulltextConfig;
    use crate::documents::tests::{StubExtractor, files_dir};
    use crate::models::LinkedFile;
    use crate::resolve::DirectoryResolver;
    use query::{SearchFlag, SearchFlags};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn library() -> Vec<BibEntry> {
        vec![
            BibEntry::new("fruit", "article")
                .with_field("title", "Fruity features")
                .with_field("keywords", "banana, pineapple, orange"),
            BibEntry::new("thesis", "phdthesis")
                .with_field("title", "A thesis")
                .with_file(LinkedFile::new("", "thesis.pdf", "PDF")),
        ]
    }

    fn ids(result: &LibrarySearch) -> Vec<&str> {
        result.hits.iter().map(|h| h.entry_id.as_str()).collect()
    }

    #[test]
    fn test_matcher_only_without_index() {
        let query = SearchQuery::new("anykeyword==pineapple", SearchFlags::empty());
        let result = search_library(&query, &library(), None);

        assert_eq!(ids(&result), vec!["fruit"]);
        assert!(result.fulltext_unavailable);
    }

    #[test]
    fn test_invalid_query_finds_nothing() {
        let query = SearchQuery::new("fruit[", SearchFlags::from(SearchFlag::RegularExpression));
        assert!(search_library(&query, &library(), None).hits.is_empty());
    }

    #[test]
    fn test_fulltext_pages_are_merged() {
        let index_dir = TempDir::new().unwrap();
        let files = files_dir(&["thesis.pdf"]);
        let indexer = FulltextIndexer::open_with(
            index_dir.path(),
            &FulltextConfig::default(),
            Arc::new(DirectoryResolver::new(vec![PathBuf::from(files.path())])),
            Arc::new(StubExtractor { pages: 2 }),
        )
        .unwrap();
        let entries = library();
        indexer.rebuild_index(&entries).unwrap();

        let query = SearchQuery::new("networks", SearchFlags::empty());
        let result = search_library(&query, &entries, Some(&indexer));

        assert!(!result.fulltext_unavailable);
        assert_eq!(ids(&result), vec!["thesis"]);
        let hit = &result.hits[0];
        assert!(!hit.matches_fields);
        assert_eq!(hit.pages.len(), 2);
        assert!(hit.pages.iter().all(|p| p.path == "thesis.pdf"));
    }

    #[test]
    fn test_negated_field_comparison_ignores_pages() {
        let index_dir = TempDir::new().unwrap();
        let files = files_dir(&["smith.pdf"]);
        let indexer = FulltextIndexer::open_with(
            index_dir.path(),
            &FulltextConfig::default(),
            Arc::new(DirectoryResolver::new(vec![PathBuf::from(files.path())])),
            Arc::new(StubExtractor { pages: 2 }),
        )
        .unwrap();
        let entries = vec![
            BibEntry::new("smith", "article")
                .with_field("author", "Smith")
                .with_file(LinkedFile::new("", "smith.pdf", "PDF")),
            BibEntry::new("jones", "article").with_field("author", "Jones"),
        ];
        indexer.rebuild_index(&entries).unwrap();

        for raw in ["author!=smith", "author!==smith", "NOT author=smith"] {
            let query = SearchQuery::new(raw, SearchFlags::empty());
            let result = search_library(&query, &entries, Some(&indexer));
            assert_eq!(ids(&result), vec!["jones"], "{raw}");
            assert!(result.hits[0].pages.is_empty(), "{raw}");

            let hits: Vec<_> = indexer
                .search(&query)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();
            assert!(hits.iter().all(|hit| hit.page.is_none()), "{raw}");
        }

        // 页面命中只附加给命名字段没有排除的条目
        let query = SearchQuery::new("author=jones OR networks", SearchFlags::empty());
        let result = search_library(&query, &entries, Some(&indexer));
        assert_eq!(ids(&result), vec!["smith", "jones"]);
        assert_eq!(result.hits[0].pages.len(), 2);
    }

    #[test]
    fn test_hits_are_consumed_once() {
        let index_dir = TempDir::new().unwrap();
        let files = files_dir(&["thesis.pdf"]);
        let indexer = FulltextIndexer::open_with(
            index_dir.path(),
            &FulltextConfig::default(),
            Arc::new(DirectoryResolver::new(vec![PathBuf::from(files.path())])),
            Arc::new(StubExtractor { pages: 3 }),
        )
        .unwrap();
        indexer.rebuild_index(&library()).unwrap();

        let mut hits = indexer
            .search(&SearchQuery::new("page", SearchFlags::empty()))
            .unwrap();
        assert_eq!(hits.size_hint().0, 3);
        assert!(hits.next().is_some());
        assert_eq!(hits.by_ref().count(), 2);
        assert!(hits.next().is_none());
    }
}
