// fulltext/src/error.rs
//! 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// 索引存储错误
///
/// 打开或写入索引目录失败时返回，调用方需要自行处理；
/// 已提交的索引内容不受影响。
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Tantivy 错误: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("无法打开索引目录: {0}")]
    OpenDirectory(#[from] tantivy::directory::error::OpenDirectoryError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("索引元数据错误: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("配置文件错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("无效的查询: {0}")]
    InvalidQuery(String),

    #[error("索引重建已取消")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// 单个文件的文本提取错误，只影响该文件
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("无法读取文件 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析 PDF {path:?}: {reason}")]
    Pdf { path: PathBuf, reason: String },
}
