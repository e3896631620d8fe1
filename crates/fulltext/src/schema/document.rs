// fulltext/src/schema/document.rs
//! 文档结构定义
//!
//! 定义索引文档的结构化表示，用于创建 Tantivy 文档

use std::collections::BTreeMap;

use query::accessor::all_field_text;
use serde::{Deserialize, Serialize};
use tantivy::schema::OwnedValue;
use tantivy::TantivyDocument;

use super::builder::SchemaFields;
use super::fields::{KIND_METADATA, KIND_PAGE};

/// 条目元数据文档，每个条目恰好一个
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub entry_id: String,
    pub citation_key: Option<String>,
    /// 所有字段值的快照
    pub fields: BTreeMap<String, String>,
}

/// 链接 PDF 的一页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    pub entry_id: String,
    pub citation_key: Option<String>,
    /// 条目中记录的文件链接
    pub path: String,
    /// 从 1 开始
    pub page: u64,
    pub content: String,
    pub modified_time: u64,
}

/// 索引文档 - 待写入 Tantivy 的单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexedDocument {
    Metadata(MetadataDocument),
    Page(PageDocument),
}

impl IndexedDocument {
    pub fn entry_id(&self) -> &str {
        match self {
            IndexedDocument::Metadata(doc) => &doc.entry_id,
            IndexedDocument::Page(doc) => &doc.entry_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IndexedDocument::Metadata(_) => KIND_METADATA,
            IndexedDocument::Page(_) => KIND_PAGE,
        }
    }

    /// 转换为 Tantivy 文档
    pub fn to_document(&self, fields: &SchemaFields) -> TantivyDocument {
        let mut doc = TantivyDocument::default();
        doc.add_text(fields.kind, self.kind());

        match self {
            IndexedDocument::Metadata(meta) => {
                doc.add_text(fields.entry_id, &meta.entry_id);
                if let Some(key) = &meta.citation_key {
                    doc.add_text(fields.citation_key, key);
                }

                let object: BTreeMap<String, OwnedValue> = meta
                    .fields
                    .iter()
                    .map(|(name, value)| (name.clone(), OwnedValue::Str(value.clone())))
                    .collect();
                doc.add_object(fields.fields, object);
                doc.add_text(fields.fields_text, all_field_text(&meta.fields));
            }
            IndexedDocument::Page(page) => {
                doc.add_text(fields.entry_id, &page.entry_id);
                if let Some(key) = &page.citation_key {
                    doc.add_text(fields.citation_key, key);
                }
                doc.add_text(fields.path, &page.path);
                doc.add_u64(fields.page, page.page);
                doc.add_text(fields.content, &page.content);
                doc.add_u64(fields.modified_time, page.modified_time);
            }
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_schema;
    use tantivy::schema::Value;

    #[test]
    fn test_page_document_fields() {
        let fields = SchemaFields::from_schema(&build_schema()).unwrap();
        let page = IndexedDocument::Page(PageDocument {
            entry_id: "e1".into(),
            citation_key: None,
            path: "thesis.pdf".into(),
            page: 3,
            content: "some text".into(),
            modified_time: 42,
        });

        let doc = page.to_document(&fields);
        assert_eq!(doc.get_first(fields.kind).and_then(|v| v.as_str()), Some("page"));
        assert_eq!(doc.get_first(fields.page).and_then(|v| v.as_u64()), Some(3));
        assert!(doc.get_first(fields.citation_key).is_none());
    }

    #[test]
    fn test_metadata_document_fields() {
        let fields = SchemaFields::from_schema(&build_schema()).unwrap();
        let meta = IndexedDocument::Metadata(MetadataDocument {
            entry_id: "e1".into(),
            citation_key: Some("Key2020".into()),
            fields: BTreeMap::from([("title".to_string(), "Deep nets".to_string())]),
        });

        let doc = meta.to_document(&fields);
        assert_eq!(meta.entry_id(), "e1");
        assert_eq!(
            doc.get_first(fields.fields_text).and_then(|v| v.as_str()),
            Some("Deep nets")
        );
        assert!(doc.get_first(fields.path).is_none());
    }
}
