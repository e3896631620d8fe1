// fulltext/src/resolve.rs
//! 链接文件定位

use std::path::{Path, PathBuf};

use crate::models::LinkedFile;

/// 把条目中的文件链接解析为本地路径
pub trait FileResolver: Send + Sync {
    /// 找不到本地文件时返回 `None`
    fn resolve(&self, file: &LinkedFile) -> Option<PathBuf>;
}

/// 按顺序在若干基准目录中查找相对路径
#[derive(Debug, Clone, Default)]
pub struct DirectoryResolver {
    directories: Vec<PathBuf>,
}

impl DirectoryResolver {
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

impl FileResolver for DirectoryResolver {
    fn resolve(&self, file: &LinkedFile) -> Option<PathBuf> {
        if file.is_online() {
            return None;
        }

        let link = Path::new(file.link.trim());
        if link.as_os_str().is_empty() {
            return None;
        }

        if link.is_absolute() {
            return link.is_file().then(|| link.to_path_buf());
        }

        self.directories
            .iter()
            .map(|dir| dir.join(link))
            .find(|candidate| candidate.is_file())
    }
}
