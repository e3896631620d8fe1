// fulltext/src/lib.rs
//! 文献全文索引
//!
//! 为文献库中的每个条目建立一个元数据文档，并为其链接的本地 PDF 按页建立页面文档，
//! 支持：
//! - 全量重建（可取消、可报告进度）
//! - 按条目或按文件的增量添加与删除
//! - 用查询语言搜索，命中结果带页码
//!
//! 每个文献库对应一个独立的索引目录，见 [`FulltextConfig::index_path_for`]。

pub mod config;
pub mod documents;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod models;
pub mod query_executor;
pub mod resolve;
pub mod schema;
pub mod search;
pub mod store;

// 重导出核心类型
pub use config::{FulltextConfig, index_dir_name};
pub use documents::{DocumentBuilder, FailedFile, SkipReason, SkippedFile};
pub use error::{ExtractError, IndexError, Result};
pub use extract::{ExtractedText, PdfTextExtractor, TextExtractor};
pub use indexer::{CancelFlag, FulltextIndexer, RebuildReport};
pub use models::{BibEntry, EntryId, LinkedFile};
pub use resolve::{DirectoryResolver, FileResolver};
pub use search::{FulltextHit, FulltextHits, LibraryHit, LibrarySearch, PageHit, search_library};
pub use store::IndexStore;
