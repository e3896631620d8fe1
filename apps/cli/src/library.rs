//! 文献库文件
//!
//! 一个 JSON 数组，每个元素是一个条目：
//! `{"id": "...", "type": "article", "fields": {...}, "files": [{"description", "link", "type"}]}`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use fulltext::BibEntry;

use crate::error::{OptionExt, Result, WrapErr, error};

#[derive(Debug, Clone)]
pub struct Library {
    path: PathBuf,
    entries: Vec<BibEntry>,
}

impl Library {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("无法读取文献库 {:?}", path))?;
        Self::from_json(path, &content)
    }

    fn from_json(path: &Path, content: &str) -> Result<Self> {
        let entries: Vec<BibEntry> = serde_json::from_str(content)
            .wrap_err_with(|| format!("文献库格式错误 {:?}", path))?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = entries.iter().find(|e| !seen.insert(e.id.as_str())) {
            return Err(error!("文献库中条目 id 重复: {}", duplicate.id));
        }

        tracing::debug!("已加载文献库 {:?}: {} 个条目", path, entries.len());
        Ok(Self {
            path: path.to_path_buf(),
            entries: entries.into_iter().map(BibEntry::normalized).collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文献库所在目录，用于解析相对文件链接
    pub fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn entries(&self) -> &[BibEntry] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Result<&BibEntry> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_eyre(format!("文献库中没有条目: {id}"))
    }
}
