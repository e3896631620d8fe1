// fulltext/src/models.rs
//! 数据模型定义
//!
//! 文献条目只按“字段名 -> 字符串值”存储，外加链接文件列表。

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use query::FieldAccessor;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 条目在文献库内的唯一标识
pub type EntryId = String;

/// 存放引用键的字段
pub const FIELD_CITATION_KEY: &str = "citationkey";

/// 带 scheme 前缀的链接（`https://`、`ftp://` 等）视为远程文件
static REMOTE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid remote link pattern"));

/// 条目关联的文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedFile {
    #[serde(default)]
    pub description: String,

    /// 本地路径（绝对或相对于文件目录）或 URL
    pub link: String,

    /// 文件类型，如 `PDF`
    #[serde(default, rename = "type")]
    pub file_type: String,
}

impl LinkedFile {
    pub fn new(
        description: impl Into<String>,
        link: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            link: link.into(),
            file_type: file_type.into(),
        }
    }

    /// 声明类型为 PDF；未声明类型时按扩展名判断
    pub fn is_pdf(&self) -> bool {
        if self.file_type.is_empty() {
            return self.link.to_ascii_lowercase().ends_with(".pdf");
        }
        self.file_type.eq_ignore_ascii_case("pdf")
    }

    pub fn is_online(&self) -> bool {
        REMOTE_LINK.is_match(self.link.trim())
    }
}

/// 文献条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    pub id: EntryId,

    #[serde(default, rename = "type")]
    pub entry_type: String,

    /// 字段名统一小写
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    #[serde(default)]
    pub files: Vec<LinkedFile>,
}

impl BibEntry {
    pub fn new(id: impl Into<EntryId>, entry_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry_type: entry_type.into(),
            fields: BTreeMap::new(),
            files: Vec::new(),
        }
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn with_citation_key(self, key: impl Into<String>) -> Self {
        self.with_field(FIELD_CITATION_KEY, key)
    }

    pub fn with_file(mut self, file: LinkedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn citation_key(&self) -> Option<&str> {
        self.fields
            .get(FIELD_CITATION_KEY)
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }

    /// 反序列化后统一字段名大小写
    pub fn normalized(mut self) -> Self {
        self.fields = std::mem::take(&mut self.fields)
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();
        self
    }
}

impl FieldAccessor for BibEntry {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.field(name)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        FieldAccessor::fields(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query::{SearchFlags, SearchQuery};

    #[test]
    fn test_linked_file_kind() {
        assert!(LinkedFile::new("", "thesis.pdf", "PDF").is_pdf());
        assert!(LinkedFile::new("", "thesis.PDF", "").is_pdf());
        assert!(!LinkedFile::new("", "thesis.aux", "AUX").is_pdf());
        assert!(!LinkedFile::new("", "thesis.pdf", "AUX").is_pdf());
    }

    #[test]
    fn test_remote_links() {
        assert!(LinkedFile::new("", "https://example.org/a.pdf", "PDF").is_online());
        assert!(LinkedFile::new("", "ftp://example.org/a.pdf", "PDF").is_online());
        assert!(!LinkedFile::new("", "/home/me/a.pdf", "PDF").is_online());
        assert!(!LinkedFile::new("", r"C:\papers\a.pdf", "PDF").is_online());
    }

    #[test]
    fn test_entry_is_searchable() {
        let entry = BibEntry::new("e1", "article")
            .with_field("Title", "Fruity features")
            .with_field("keywords", "banana, pineapple, orange")
            .with_citation_key("Fruit2020");

        assert_eq!(entry.citation_key(), Some("Fruit2020"));
        assert!(SearchQuery::new("title=fruit", SearchFlags::empty()).is_match(&entry));
        assert!(SearchQuery::new("anykeyword==orange", SearchFlags::empty()).is_match(&entry));
    }

    #[test]
    fn test_deserialize_entry() {
        let entry: BibEntry = serde_json::from_str(
            r#"{"id": "e1", "type": "phdthesis",
                "fields": {"Author": "Smith"},
                "files": [{"link": "thesis.pdf", "type": "PDF"}]}"#,
        )
        .unwrap();
        let entry = entry.normalized();

        assert_eq!(entry.fields.get("author").map(String::as_str), Some("Smith"));
        assert_eq!(entry.files[0].description, "");
        assert!(entry.files[0].is_pdf());
    }
}
