// fulltext/src/schema/fields.rs
//! 字段名常量定义
//!
//! 统一管理所有 Schema 字段名，避免魔法字符串

/// 条目 ID（精确匹配，删除条目时使用）
pub const FIELD_ENTRY_ID: &str = "entry_id";

/// 引用键（可选）
pub const FIELD_CITATION_KEY: &str = "citation_key";

/// 文档类型，取值见 [`KIND_METADATA`] / [`KIND_PAGE`]
pub const FIELD_KIND: &str = "kind";

/// 页面所属的文件链接（精确匹配）
pub const FIELD_PATH: &str = "path";

/// 页码，从 1 开始
pub const FIELD_PAGE: &str = "page";

/// 页面全文
pub const FIELD_CONTENT: &str = "content";

/// 条目字段快照（JSON 对象，键为字段名）
pub const FIELD_FIELDS: &str = "fields";

/// 所有字段值拼接后的文本，对应 `anyfield`
pub const FIELD_FIELDS_TEXT: &str = "fields_text";

/// 文件修改时间（Unix 时间戳秒）
pub const FIELD_MODIFIED_TIME: &str = "modified_time";

pub const KIND_METADATA: &str = "metadata";
pub const KIND_PAGE: &str = "page";

/// 文本字段使用的分词器：结巴分词 + 小写
pub const TOKENIZER_NAME: &str = "jieba";

/// Schema 变化时递增，旧索引会被清空重建
pub const SCHEMA_VERSION: u32 = 1;
