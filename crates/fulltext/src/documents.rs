// fulltext/src/documents.rs
//! 索引文档构建
//!
//! 每个条目产生一个元数据文档，外加其本地 PDF 的每页一个页面文档。
//! 单个文件的跳过或解析失败只记录下来，不影响同一条目的其他文件。

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::extract::TextExtractor;
use crate::models::{BibEntry, LinkedFile};
use crate::resolve::FileResolver;
use crate::schema::{IndexedDocument, MetadataDocument, PageDocument};

/// 文件被跳过的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    NotPdf,
    Remote,
    Unresolved,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NotPdf => "不是 PDF",
            SkipReason::Remote => "远程文件",
            SkipReason::Unresolved => "找不到本地文件",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub entry_id: String,
    pub link: String,
    pub reason: SkipReason,
}

/// 能找到但无法解析的 PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub entry_id: String,
    pub link: String,
    pub error: String,
}

/// 一个条目的构建结果
#[derive(Debug, Clone, Default)]
pub struct BuiltDocuments {
    pub documents: Vec<IndexedDocument>,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<FailedFile>,
}

/// 索引文档构建器
#[derive(Clone)]
pub struct DocumentBuilder {
    resolver: Arc<dyn FileResolver>,
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentBuilder {
    pub fn new(resolver: Arc<dyn FileResolver>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            resolver,
            extractor,
        }
    }

    /// 条目的全部文档：元数据文档在前，随后按文件、页码顺序排列页面文档
    pub fn build(&self, entry: &BibEntry) -> BuiltDocuments {
        let mut built = BuiltDocuments::default();
        built.documents.push(metadata_document(entry));

        for file in &entry.files {
            self.build_file(entry, file, &mut built);
        }

        built
    }

    /// 只构建某个文件的页面文档
    pub fn build_file(&self, entry: &BibEntry, file: &LinkedFile, built: &mut BuiltDocuments) {
        let skip = |reason: SkipReason, built: &mut BuiltDocuments| {
            tracing::debug!("跳过文件 {} ({}): {}", file.link, entry.id, reason);
            built.skipped.push(SkippedFile {
                entry_id: entry.id.clone(),
                link: file.link.clone(),
                reason,
            });
        };

        if !file.is_pdf() {
            return skip(SkipReason::NotPdf, built);
        }
        if file.is_online() {
            return skip(SkipReason::Remote, built);
        }
        let Some(path) = self.resolver.resolve(file) else {
            return skip(SkipReason::Unresolved, built);
        };

        let extracted = match self.extractor.extract(&path) {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::warn!("PDF 解析失败，只索引元数据 ({}): {}", entry.id, e);
                built.failed.push(FailedFile {
                    entry_id: entry.id.clone(),
                    link: file.link.clone(),
                    error: e.to_string(),
                });
                return;
            }
        };

        let citation_key = entry.citation_key().map(str::to_string);
        built
            .documents
            .extend(extracted.pages.into_iter().enumerate().map(|(i, content)| {
                IndexedDocument::Page(PageDocument {
                    entry_id: entry.id.clone(),
                    citation_key: citation_key.clone(),
                    path: file.link.clone(),
                    page: i as u64 + 1,
                    content,
                    modified_time: extracted.modified_time,
                })
            }));
    }
}

pub fn metadata_document(entry: &BibEntry) -> IndexedDocument {
    IndexedDocument::Metadata(MetadataDocument {
        entry_id: entry.id.clone(),
        citation_key: entry.citation_key().map(str::to_string),
        fields: entry.fields.clone(),
    })
}
