// fulltext/src/query_executor.rs
//! 查询转换
//!
//! 将 [`SearchQuery`] 转换为 Tantivy 查询：
//! - 普通查询：每个词都必须出现在页面全文或字段文本中
//! - 语法查询：按表达式树组合 BooleanQuery，字段比较落到 `fields` JSON 字段
//!
//! 索引按词元匹配且总是忽略大小写，`==` 近似为短语查询。
//! 否定（`!=`、`!==`、`NOT`）只作用于元数据文档：页面文档没有字段，
//! 在页面上取反会让每一页都命中。

use query::{Comparison, Expression, FieldRef, Operator, SearchQuery};
use tantivy::query::{
    AllQuery, BooleanQuery, EmptyQuery, Occur, PhraseQuery, Query, RegexQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, Term};

use crate::error::{IndexError, Result};
use crate::schema::{KIND_METADATA, SchemaFields, TOKENIZER_NAME};

/// 查询目标
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    /// 页面全文和字段文本
    Anywhere,
    /// `fields` JSON 字段中的某个键
    Field(&'a str),
}

/// 查询转换上下文
pub struct QueryContext<'a> {
    pub index: &'a Index,
    pub fields: &'a SchemaFields,
}

impl<'a> QueryContext<'a> {
    pub fn new(index: &'a Index, fields: &'a SchemaFields) -> Self {
        Self { index, fields }
    }

    /// 转换整个查询；无效的正则查询返回错误
    pub fn build(&self, query: &SearchQuery) -> Result<Box<dyn Query>> {
        if let Some(e) = query.pattern_error() {
            return Err(IndexError::InvalidQuery(e.to_string()));
        }

        let regex = query.flags().is_regular_expression();
        match query.expression() {
            Some(expression) => self.build_expression(expression, regex),
            None => {
                if query.terms().is_empty() {
                    return Ok(Box::new(AllQuery));
                }
                let clauses = query
                    .terms()
                    .iter()
                    .map(|term| {
                        let query = self.value_query(Target::Anywhere, term, false, regex)?;
                        Ok((Occur::Must, query))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(BooleanQuery::new(clauses)))
            }
        }
    }

    fn build_expression(&self, expression: &Expression, regex: bool) -> Result<Box<dyn Query>> {
        let query: Box<dyn Query> = match expression {
            Expression::Comparison(c) => self.comparison_query(c, regex)?,
            Expression::And(lhs, rhs) => Box::new(BooleanQuery::new(vec![
                (Occur::Must, self.build_expression(lhs, regex)?),
                (Occur::Must, self.build_expression(rhs, regex)?),
            ])),
            Expression::Or(lhs, rhs) => Box::new(BooleanQuery::new(vec![
                (Occur::Should, self.build_expression(lhs, regex)?),
                (Occur::Should, self.build_expression(rhs, regex)?),
            ])),
            Expression::Not(inner) => self.negate(self.build_expression(inner, regex)?),
        };
        Ok(query)
    }

    fn comparison_query(&self, comparison: &Comparison, regex: bool) -> Result<Box<dyn Query>> {
        let target = match &comparison.field {
            FieldRef::AnyField => Target::Anywhere,
            FieldRef::AnyKeyword => Target::Field(query::KEYWORDS_FIELD),
            FieldRef::Named(name) => Target::Field(name),
        };

        let exact = comparison.operator.is_exact();
        let positive = self.value_query(target, &comparison.value, exact, regex)?;

        Ok(match comparison.operator {
            Operator::Contains | Operator::Exact => positive,
            Operator::DoesNotContain | Operator::NotExact => self.negate(positive),
        })
    }

    fn value_query(
        &self,
        target: Target<'_>,
        value: &str,
        exact: bool,
        regex: bool,
    ) -> Result<Box<dyn Query>> {
        match target {
            Target::Anywhere => {
                let text_fields = [self.fields.content, self.fields.fields_text];
                let clauses = text_fields
                    .into_iter()
                    .map(|field| {
                        let query = if regex {
                            regex_query(field, value, exact)?
                        } else {
                            self.text_query(value, |token| Term::from_field_text(field, token))
                        };
                        Ok((Occur::Should, query))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(BooleanQuery::new(clauses)))
            }
            // JSON 字段不支持正则，退回到全部字段文本
            Target::Field(_) if regex => regex_query(self.fields.fields_text, value, exact),
            Target::Field(name) => {
                let json = self.fields.fields;
                Ok(self.text_query(value, |token| {
                    let mut term = Term::from_field_json_path(json, name, false);
                    term.append_type_and_str(token);
                    term
                }))
            }
        }
    }

    /// 元数据文档中排除匹配 `query` 的部分
    fn negate(&self, query: Box<dyn Query>) -> Box<dyn Query> {
        let metadata = TermQuery::new(
            Term::from_field_text(self.fields.kind, KIND_METADATA),
            IndexRecordOption::Basic,
        );
        Box::new(BooleanQuery::new(vec![
            (Occur::Must, Box::new(metadata) as Box<dyn Query>),
            (Occur::MustNot, query),
        ]))
    }

    /// 用索引分词器切分取值：单个词元为 TermQuery，多个为保留原始位置的 PhraseQuery
    fn text_query<F>(&self, value: &str, make_term: F) -> Box<dyn Query>
    where
        F: Fn(&str) -> Term,
    {
        let mut terms: Vec<(usize, Term)> = self
            .tokens(value)
            .iter()
            .map(|(position, token)| (*position, make_term(token)))
            .collect();

        match terms.len() {
            0 => Box::new(EmptyQuery),
            1 => Box::new(TermQuery::new(
                terms.remove(0).1,
                IndexRecordOption::WithFreqsAndPositions,
            )),
            _ => Box::new(PhraseQuery::new_with_offset(terms)),
        }
    }

    /// 非空白词元及其位置
    fn tokens(&self, value: &str) -> Vec<(usize, String)> {
        let Some(mut analyzer) = self.index.tokenizers().get(TOKENIZER_NAME) else {
            tracing::warn!("分词器未注册: {}", TOKENIZER_NAME);
            return Vec::new();
        };

        let mut tokens = Vec::new();
        let mut stream = analyzer.token_stream(value);
        while stream.advance() {
            let token = stream.token();
            let text = token.text.trim();
            if !text.is_empty() {
                tokens.push((token.position, text.to_string()));
            }
        }
        tokens
    }
}

/// 正则匹配单个词元；`=` 允许词元中包含匹配，`==` 要求整个词元匹配
fn regex_query(field: Field, pattern: &str, exact: bool) -> Result<Box<dyn Query>> {
    let pattern = if exact {
        format!("(?i)(?:{pattern})")
    } else {
        format!("(?i).*(?:{pattern}).*")
    };
    Ok(Box::new(RegexQuery::from_pattern(&pattern, field)?))
}
