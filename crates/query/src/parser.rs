use std::fmt;

use chumsky::{input::ValueInput, prelude::*};

use crate::expression::Operator;
use crate::{QueryLexer, lexer::Token};

pub type Span = SimpleSpan;
pub type Spanned<T> = (T, Span);

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuery {
    /// `field<op>value`
    Comparison(ParsedComparison),

    /// A value without field, e.g. `fruit` in `fruit AND year=2020`
    Bare(ParsedValue),

    /// Logical And
    And(Vec<Spanned<ParsedQuery>>),

    /// Logical Or
    Or(Vec<Spanned<ParsedQuery>>),

    /// Logical Not
    Not(Box<Spanned<ParsedQuery>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedComparison {
    pub field: Spanned<String>,
    pub operator: Spanned<Operator>,
    pub value: Spanned<ParsedValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// Plain text e.g. `abc`
    Text(String),

    /// Quoted text (Not includes quotes) e.g. `a\"b c`
    QuotedText(String),
}

impl ParsedValue {
    pub fn raw_str(&self) -> &str {
        match self {
            ParsedValue::Text(s) => s,
            ParsedValue::QuotedText(s) => s,
        }
    }

    /// Return the string inside the value with escape interpretation for
    /// QuotedText. e.g. `a\"b` -> `a"b`, `a\\b` -> `a\b`.
    pub fn unescaped(&self) -> String {
        match self {
            ParsedValue::Text(s) => s.clone(),
            ParsedValue::QuotedText(s) => {
                let mut out = String::with_capacity(s.len());
                let mut chars = s.chars();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some(next @ ('"' | '\\')) => out.push(next),
                            Some(next) => {
                                out.push('\\');
                                out.push(next);
                            }
                            None => out.push('\\'),
                        },
                        _ => out.push(c),
                    }
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A character sequence that is not a token, e.g. a lone `!`
    Lex { span: Span },
    Syntax { span: Span, message: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex { span } => {
                write!(f, "unexpected character (at position {}..{})", span.start, span.end)
            }
            ParseError::Syntax { span, message } => {
                write!(f, "{} (at position {}..{})", message, span.start, span.end)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parser for field comparison queries
///
/// Grammar(lower to higher priority):
/// ```text
/// query       := or_expr
/// or_expr     := and_expr (OR and_expr)*
/// and_expr    := not_expr (AND not_expr)*
/// not_expr    := NOT* atom
/// atom        := '(' query ')' | comparison | value
/// comparison  := Text ('=' | '==' | '!=' | '!==') value
/// value       := Text | QuotedText
/// ```
pub fn parser<'tokens, I>()
-> impl Parser<'tokens, I, Spanned<ParsedQuery>, extra::Err<Rich<'tokens, Token>>>
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    recursive(|query| {
        let value = select! {
            Token::Text(s) => ParsedValue::Text(s),
            Token::QuotedText(s) => ParsedValue::QuotedText(s),
        };

        let field_with_span = select! { Token::Text(s) => s }.map_with(|s, e| (s, e.span()));
        let operator_with_span = select! { Token::Op(op) => op }.map_with(|op, e| (op, e.span()));
        let value_with_span = value.clone().map_with(|v, e| (v, e.span()));

        let comparison = field_with_span
            .then(operator_with_span)
            .then(value_with_span)
            .map(|((field, operator), value)| {
                ParsedQuery::Comparison(ParsedComparison {
                    field,
                    operator,
                    value,
                })
            })
            .map_with(|q, e| (q, e.span()));

        let bare = value.map(ParsedQuery::Bare).map_with(|q, e| (q, e.span()));

        let atom = comparison.or(bare).or(query
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen)));

        let not_expr = just(Token::Not).map_with(|_, e| e.span()).repeated().foldr(
            atom,
            |not_span: SimpleSpan, (q, q_span): Spanned<ParsedQuery>| {
                let combined_span = (not_span.start..q_span.end).into();
                (ParsedQuery::Not(Box::new((q, q_span))), combined_span)
            },
        );

        let and_expr = not_expr.clone().foldl(
            just(Token::And).ignore_then(not_expr).repeated(),
            |lhs: Spanned<ParsedQuery>, rhs: Spanned<ParsedQuery>| {
                let span = (lhs.1.start..rhs.1.end).into();
                match lhs {
                    (ParsedQuery::And(mut v), _) => {
                        v.push(rhs);
                        (ParsedQuery::And(v), span)
                    }
                    _ => (ParsedQuery::And(vec![lhs, rhs]), span),
                }
            },
        );

        and_expr.clone().foldl(
            just(Token::Or).ignore_then(and_expr).repeated(),
            |lhs: Spanned<ParsedQuery>, rhs: Spanned<ParsedQuery>| {
                let span = (lhs.1.start..rhs.1.end).into();
                match lhs {
                    (ParsedQuery::Or(mut v), _) => {
                        v.push(rhs);
                        (ParsedQuery::Or(v), span)
                    }
                    _ => (ParsedQuery::Or(vec![lhs, rhs]), span),
                }
            },
        )
    })
}

/// Parse a query string into a spanned syntax tree
pub fn parse_query(input: &str) -> Result<Spanned<ParsedQuery>, ParseError> {
    use chumsky::input::Stream;

    let mut tokens = Vec::new();
    for (token, span) in QueryLexer::new(input).spanned() {
        match token {
            Ok(token) => tokens.push((token, SimpleSpan::from(span))),
            Err(()) => return Err(ParseError::Lex { span: span.into() }),
        }
    }

    let token_stream = Stream::from_iter(tokens.into_iter())
        .map((0..input.len()).into(), |(t, s): (_, _)| (t, s));

    parser().parse(token_stream).into_result().map_err(|errors| {
        let first = errors.into_iter().next();
        match first {
            Some(error) => ParseError::Syntax {
                span: *error.span(),
                message: format!("{:?}", error.reason()),
            },
            None => ParseError::Syntax {
                span: (0..input.len()).into(),
                message: "invalid query".to_string(),
            },
        }
    })
}

/// Whether the input contains, outside quoted text, a field name immediately
/// followed by a comparison operator and a value.
pub fn has_field_comparison(input: &str) -> bool {
    let tokens: Vec<_> = QueryLexer::new(input).spanned().collect();

    tokens.windows(3).any(|window| match window {
        [
            (Ok(Token::Text(field)), field_span),
            (Ok(Token::Op(_)), op_span),
            (Ok(Token::Text(_) | Token::QuotedText(_)), _),
        ] => field_span.end == op_span.start && is_field_identifier(field),
        _ => false,
    })
}

/// Field identifiers start with a letter or `_` and continue with letters,
/// digits, `_`, `-` or `.`
pub fn is_field_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn comparison(query: &ParsedQuery) -> &ParsedComparison {
        match query {
            ParsedQuery::Comparison(c) => c,
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_comparison() {
        let (query, _) = parse_query("title=hello").unwrap();
        let c = comparison(&query);
        assert_eq!(c.field.0, "title");
        assert_eq!(c.operator.0, Operator::Contains);
        assert_eq!(c.value.0.raw_str(), "hello");
    }

    #[test]
    fn test_quoted_comparison() {
        let (query, _) = parse_query(r#"keywords="one two""#).unwrap();
        let c = comparison(&query);
        assert_eq!(c.value.0, ParsedValue::QuotedText("one two".into()));
    }

    #[test]
    fn test_span_info_preserved() {
        let (query, span) = parse_query("author==smith").unwrap();
        let c = comparison(&query);
        assert_eq!((c.field.1.start, c.field.1.end), (0, 6));
        assert_eq!((c.operator.1.start, c.operator.1.end), (6, 8));
        assert_eq!((c.value.1.start, c.value.1.end), (8, 13));
        assert_eq!((span.start, span.end), (0, 13));
    }

    #[test]
    fn test_bare_word_in_expression() {
        let (query, _) = parse_query("text AND author=asdf").unwrap();
        let ParsedQuery::And(items) = query else {
            panic!("Expected And at top level");
        };
        assert_eq!(items[0].0, ParsedQuery::Bare(ParsedValue::Text("text".into())));
        assert!(matches!(items[1].0, ParsedQuery::Comparison(_)));
    }

    #[test]
    fn test_lowercase_connective() {
        let (query, _) = parse_query("anyfield=fruit and keywords!=banana").unwrap();
        let ParsedQuery::And(items) = query else {
            panic!("Expected And at top level");
        };
        assert_eq!(comparison(&items[1].0).operator.0, Operator::DoesNotContain);
    }

    #[test]
    fn test_precedence() {
        // "a=1 OR b=2 AND c=3" should parse as "a=1 OR (b=2 AND c=3)"
        let (query, _) = parse_query("a=1 OR b=2 AND c=3").unwrap();
        let ParsedQuery::Or(items) = query else {
            panic!("Expected Or at top level");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0].0, ParsedQuery::Comparison(_)));
        assert!(matches!(&items[1].0, ParsedQuery::And(v) if v.len() == 2));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let (query, _) = parse_query("(a=1 OR b=2) AND c=3").unwrap();
        let ParsedQuery::And(items) = query else {
            panic!("Expected And at top level");
        };
        assert!(matches!(&items[0].0, ParsedQuery::Or(_)));
    }

    #[test]
    fn test_chained_and_is_flattened() {
        let (query, _) = parse_query("a=1 AND b=2 AND c=3").unwrap();
        assert!(matches!(query, ParsedQuery::And(items) if items.len() == 3));
    }

    #[test]
    fn test_not() {
        let (query, _) = parse_query("NOT NOT title=x").unwrap();
        let ParsedQuery::Not(inner) = query else {
            panic!("Expected Not at top level");
        };
        assert!(matches!(inner.0, ParsedQuery::Not(_)));
    }

    #[rstest]
    #[case("a=1 b=2")]
    #[case("(title=x")]
    #[case("title=x AND")]
    #[case("!title=x")]
    #[case("=x")]
    fn test_invalid_queries(#[case] input: &str) {
        assert!(parse_query(input).is_err());
    }

    #[test]
    fn test_unescaped_value() {
        let value = ParsedValue::QuotedText(r#"say \"hi\" \\ \d"#.into());
        assert_eq!(value.unescaped(), r#"say "hi" \ \d"#);
    }

    #[rstest]
    #[case("author=asdf", true)]
    #[case("author==asdf", true)]
    #[case("keywords!=banana", true)]
    #[case(r#"title="systematic review""#, true)]
    #[case("free text author=x", true)]
    #[case("asdf", false)]
    #[case("asdf[", false)]
    #[case(r#""author=asdf""#, false)]
    #[case("author =asdf", false)]
    #[case("author=", false)]
    #[case("123=asdf", false)]
    #[case(r"<([{\^-=$!|]})?*+.> word1 word2.", false)]
    fn test_has_field_comparison(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(has_field_comparison(input), expected);
    }

    #[rstest]
    #[case("title", true)]
    #[case("_x", true)]
    #[case("date-added", true)]
    #[case("1abc", false)]
    #[case("", false)]
    #[case("a/b", false)]
    fn test_is_field_identifier(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_field_identifier(name), expected);
    }
}
