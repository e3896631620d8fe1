// fulltext/src/extract.rs
//! 文本提取模块
//!
//! 索引只依赖 [`TextExtractor`]：给定一个 PDF，返回按页排列的文本和文件级元数据。

use std::fs;
use std::panic;
use std::path::Path;
use std::time::SystemTime;

use crate::error::ExtractError;

/// 提取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    /// 按原文顺序排列的每页文本
    pub pages: Vec<String>,

    /// 文件修改时间（Unix 时间戳秒）
    pub modified_time: u64,
}

/// PDF 文本提取能力
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<ExtractedText, ExtractError>;
}

/// 基于 pdf-extract 的实现
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedText, ExtractError> {
        tracing::debug!("正在解析 PDF: {:?}", path);

        let metadata = fs::metadata(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let modified_time = metadata
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH)
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        // pdf-extract 遇到损坏的文件可能 panic
        let pages = match panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path)) {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                return Err(ExtractError::Pdf {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ExtractError::Pdf {
                    path: path.to_path_buf(),
                    reason: "解析器崩溃".to_string(),
                });
            }
        };

        tracing::debug!("已提取 {} 页: {:?}", pages.len(), path);
        Ok(ExtractedText {
            pages,
            modified_time,
        })
    }
}
