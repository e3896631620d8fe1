// fulltext/src/schema/builder.rs
//! Schema 构建器
//!
//! 构建 Tantivy 索引 Schema，统一管理字段配置

use tantivy::schema::*;
use tantivy::tokenizer::{LowerCaser, TextAnalyzer};
use tantivy::Index;
use tantivy_jieba::JiebaTokenizer;

use super::fields::*;

/// 构建 Tantivy Schema
///
/// - 标识字段（entry_id, citation_key, kind, path）不分词，精确匹配
/// - 文本字段（content, fields_text, fields）使用结巴分词并小写
/// - page, modified_time 为数值字段
pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    let indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKENIZER_NAME)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);

    let text_options = TextOptions::default()
        .set_indexing_options(indexing.clone())
        .set_stored();

    let json_options = JsonObjectOptions::default()
        .set_indexing_options(indexing)
        .set_stored();

    schema_builder.add_text_field(FIELD_ENTRY_ID, STRING | STORED);
    schema_builder.add_text_field(FIELD_CITATION_KEY, STRING | STORED);
    schema_builder.add_text_field(FIELD_KIND, STRING | STORED);
    schema_builder.add_text_field(FIELD_PATH, STRING | STORED);
    schema_builder.add_u64_field(FIELD_PAGE, INDEXED | STORED);

    schema_builder.add_text_field(FIELD_CONTENT, text_options.clone());
    schema_builder.add_text_field(FIELD_FIELDS_TEXT, text_options);
    schema_builder.add_json_field(FIELD_FIELDS, json_options);

    schema_builder.add_u64_field(FIELD_MODIFIED_TIME, FAST | STORED);

    schema_builder.build()
}

/// 注册文本字段使用的分词器，每次打开索引后都要调用
pub fn register_tokenizer(index: &Index) {
    let analyzer = TextAnalyzer::builder(JiebaTokenizer {})
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(TOKENIZER_NAME, analyzer);
}

/// Schema 字段辅助结构
///
/// 缓存字段引用，避免重复查找
#[derive(Debug, Clone, Copy)]
pub struct SchemaFields {
    pub entry_id: Field,
    pub citation_key: Field,
    pub kind: Field,
    pub path: Field,
    pub page: Field,
    pub content: Field,
    pub fields: Field,
    pub fields_text: Field,
    pub modified_time: Field,
}

impl SchemaFields {
    /// 从 Schema 中提取所有字段引用
    pub fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
        Ok(Self {
            entry_id: schema.get_field(FIELD_ENTRY_ID)?,
            citation_key: schema.get_field(FIELD_CITATION_KEY)?,
            kind: schema.get_field(FIELD_KIND)?,
            path: schema.get_field(FIELD_PATH)?,
            page: schema.get_field(FIELD_PAGE)?,
            content: schema.get_field(FIELD_CONTENT)?,
            fields: schema.get_field(FIELD_FIELDS)?,
            fields_text: schema.get_field(FIELD_FIELDS_TEXT)?,
            modified_time: schema.get_field(FIELD_MODIFIED_TIME)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tantivy::tokenizer::TokenStream;

    #[test]
    fn test_all_fields_present() {
        let schema = build_schema();
        assert!(SchemaFields::from_schema(&schema).is_ok());
    }

    #[test]
    fn test_tokenizer_lowercases() {
        let index = Index::create_in_ram(build_schema());
        register_tokenizer(&index);

        let mut analyzer = index.tokenizers().get(TOKENIZER_NAME).unwrap();
        let mut stream = analyzer.token_stream("Deep Learning");
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        assert!(tokens.contains(&"deep".to_string()));
        assert!(tokens.contains(&"learning".to_string()));
    }
}
