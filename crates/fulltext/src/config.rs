// fulltext/src/config.rs
//! 配置模块

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// 全文索引配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FulltextConfig {
    /// IndexWriter 内存预算（字节）
    pub writer_memory: usize,

    /// 单次搜索返回的最大文档数
    pub search_limit: usize,

    /// 解析相对文件链接时依次尝试的目录
    pub file_directories: Vec<PathBuf>,

    /// 索引根目录，未设置时由调用方决定
    pub index_root: Option<PathBuf>,
}

impl Default for FulltextConfig {
    fn default() -> Self {
        Self {
            writer_memory: 50_000_000,
            search_limit: 100,
            file_directories: Vec::new(),
            index_root: None,
        }
    }
}

impl FulltextConfig {
    /// 从 TOML 文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FulltextConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// 尝试加载配置，失败则使用默认值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("使用默认全文索引配置 ({:?}): {}", path.as_ref(), e);
                Self::default()
            }
        }
    }

    /// 文献库对应的索引目录
    ///
    /// `<index_root>/<文件名>-<规范路径 SHA-256 前 16 位>`，`index_root`
    /// 未配置时使用 `default_root`。
    pub fn index_path_for(&self, collection: &Path, default_root: &Path) -> PathBuf {
        let root = self.index_root.as_deref().unwrap_or(default_root);
        root.join(index_dir_name(collection))
    }
}

/// 同一文献库总是得到同一个目录名，不同位置的同名文献库互不冲突
pub fn index_dir_name(collection: &Path) -> String {
    let canonical = collection
        .canonicalize()
        .unwrap_or_else(|_| collection.to_path_buf());

    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let hash = hex::encode(digest);

    let stem = collection
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "library".to_string());

    format!("{}-{}", stem, &hash[..16])
}
