use logos::{Lexer, Logos};

use crate::expression::Operator;

/// Raw tokens used internally by logos
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[token("AND", ignore(case))]
    And,

    #[token("OR", ignore(case))]
    Or,

    #[token("NOT", ignore(case))]
    Not,

    #[token("=")]
    Contains,

    #[token("==")]
    Exact,

    #[token("!=")]
    DoesNotContain,

    #[token("!==")]
    NotExact,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r#""([^"\\]|\\.)*""#, quoted_text_inner_string)]
    QuotedText(String),

    #[regex(r#"[^ \t\r\n\f"()=!]+"#, |lex| lex.slice().to_string())]
    Text(String),
}

fn quoted_text_inner_string(lex: &mut Lexer<RawToken>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

/// Value tokens - used right after a comparison operator, where `=`, `!`
/// and the connective keywords are ordinary text
#[derive(Logos, Debug, PartialEq, Clone)]
enum ValueToken {
    #[regex(r#""([^"\\]|\\.)*""#)]
    Quoted,

    #[regex(r#"[^ \t\r\n\f"()]+"#)]
    Text,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
}

/// The public token type
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    And,
    Or,
    Not,
    Op(Operator),
    LParen,
    RParen,
    QuotedText(String),
    Text(String),
}

/// A context-aware query lexer
pub struct QueryLexer<'source> {
    lexer: Lexer<'source, RawToken>,
    after_operator: bool,
    current_span: std::ops::Range<usize>,
}

impl<'source> QueryLexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: RawToken::lexer(source),
            after_operator: false,
            current_span: 0..0,
        }
    }

    /// Get the span of the last yielded token
    pub fn span(&self) -> std::ops::Range<usize> {
        self.current_span.clone()
    }

    /// Get the slice of the last yielded token
    pub fn slice(&self) -> &'source str {
        &self.lexer.source()[self.current_span.clone()]
    }

    /// Returns an iterator that yields (Result<Token, ()>, Range<usize>)
    pub fn spanned(self) -> SpannedQueryLexer<'source> {
        SpannedQueryLexer { lexer: self }
    }

    fn next_value(&mut self) -> Option<Result<Token, ()>> {
        let mut value_lexer: Lexer<'source, ValueToken> = self.lexer.clone().morph();

        let result = match value_lexer.next()? {
            Ok(ValueToken::Quoted) => {
                let slice = value_lexer.slice();
                Ok(Token::QuotedText(slice[1..slice.len() - 1].to_string()))
            }
            Ok(ValueToken::Text) => Ok(Token::Text(value_lexer.slice().to_string())),
            Ok(ValueToken::Whitespace) => {
                // No value right after the operator, continue in normal mode
                self.lexer = value_lexer.morph();
                return self.next();
            }
            Err(_) => Err(()),
        };

        self.current_span = value_lexer.span();
        self.lexer = value_lexer.morph();
        Some(result)
    }
}

impl<'source> Iterator for QueryLexer<'source> {
    type Item = Result<Token, ()>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.after_operator {
            self.after_operator = false;
            return self.next_value();
        }

        let result = self.lexer.next()?;
        self.current_span = self.lexer.span();

        let token = match result {
            Ok(RawToken::Contains) => Token::Op(Operator::Contains),
            Ok(RawToken::Exact) => Token::Op(Operator::Exact),
            Ok(RawToken::DoesNotContain) => Token::Op(Operator::DoesNotContain),
            Ok(RawToken::NotExact) => Token::Op(Operator::NotExact),
            Ok(RawToken::And) => Token::And,
            Ok(RawToken::Or) => Token::Or,
            Ok(RawToken::Not) => Token::Not,
            Ok(RawToken::LParen) => Token::LParen,
            Ok(RawToken::RParen) => Token::RParen,
            Ok(RawToken::QuotedText(s)) => Token::QuotedText(s),
            Ok(RawToken::Text(s)) => Token::Text(s),
            Err(_) => return Some(Err(())),
        };

        if matches!(token, Token::Op(_)) {
            self.after_operator = true;
        }
        Some(Ok(token))
    }
}

/// Iterator adapter that yields tokens with their spans
pub struct SpannedQueryLexer<'source> {
    lexer: QueryLexer<'source>,
}

impl<'source> Iterator for SpannedQueryLexer<'source> {
    type Item = (Result<Token, ()>, std::ops::Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.lexer.next()?;
        let span = self.lexer.span();
        Some((token, span))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(input: &str) -> Vec<Result<Token, ()>> {
        QueryLexer::new(input).collect()
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(lex("author=asdf"), vec![
            Ok(Token::Text("author".into())),
            Ok(Token::Op(Operator::Contains)),
            Ok(Token::Text("asdf".into())),
        ]);
    }

    #[test]
    fn test_quoted_value() {
        assert_eq!(lex(r#"keywords="one two""#), vec![
            Ok(Token::Text("keywords".into())),
            Ok(Token::Op(Operator::Contains)),
            Ok(Token::QuotedText("one two".into())),
        ]);
    }

    #[test]
    fn test_all_operators() {
        let ops: Vec<_> = lex("a=1 b==2 c!=3 d!==4")
            .into_iter()
            .filter_map(|t| match t {
                Ok(Token::Op(op)) => Some(op),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec![
            Operator::Contains,
            Operator::Exact,
            Operator::DoesNotContain,
            Operator::NotExact,
        ]);
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(lex("a and b OR c Not d"), vec![
            Ok(Token::Text("a".into())),
            Ok(Token::And),
            Ok(Token::Text("b".into())),
            Ok(Token::Or),
            Ok(Token::Text("c".into())),
            Ok(Token::Not),
            Ok(Token::Text("d".into())),
        ]);
    }

    #[test]
    fn test_keyword_prefix_is_text() {
        assert_eq!(lex("android"), vec![Ok(Token::Text("android".into()))]);
    }

    #[test]
    fn test_operator_chars_in_value() {
        assert_eq!(lex("title=a=b!c"), vec![
            Ok(Token::Text("title".into())),
            Ok(Token::Op(Operator::Contains)),
            Ok(Token::Text("a=b!c".into())),
        ]);
    }

    #[test]
    fn test_keyword_as_value() {
        assert_eq!(lex("title=AND"), vec![
            Ok(Token::Text("title".into())),
            Ok(Token::Op(Operator::Contains)),
            Ok(Token::Text("AND".into())),
        ]);
    }

    #[test]
    fn test_value_stops_at_paren() {
        assert_eq!(lex("(title=foo)"), vec![
            Ok(Token::LParen),
            Ok(Token::Text("title".into())),
            Ok(Token::Op(Operator::Contains)),
            Ok(Token::Text("foo".into())),
            Ok(Token::RParen),
        ]);
    }

    #[test]
    fn test_lone_exclamation_is_error() {
        assert!(lex("!foo").iter().any(|t| t.is_err()));
    }

    #[test]
    fn test_spanned_with_operators() {
        let input = "title==x OR year=2020";
        let tokens: Vec<(Token, std::ops::Range<usize>)> = QueryLexer::new(input)
            .spanned()
            .filter_map(|(result, span)| result.ok().map(|t| (t, span)))
            .collect();

        assert_eq!(tokens, vec![
            (Token::Text("title".into()), 0..5),
            (Token::Op(Operator::Exact), 5..7),
            (Token::Text("x".into()), 7..8),
            (Token::Or, 9..11),
            (Token::Text("year".into()), 12..16),
            (Token::Op(Operator::Contains), 16..17),
            (Token::Text("2020".into()), 17..21),
        ]);
    }

    #[test]
    fn test_spanned_quoted_includes_quotes() {
        let input = r#"booktitle="(""#;
        let tokens: Vec<_> = QueryLexer::new(input)
            .spanned()
            .filter_map(|(result, span)| result.ok().map(|t| (t, span)))
            .collect();

        assert_eq!(tokens.last(), Some(&(Token::QuotedText("(".into()), 10..13)));
    }
}
