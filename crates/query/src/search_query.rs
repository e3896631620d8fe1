//! The immutable query value handed around by callers.
//!
//! A [`SearchQuery`] decides its mode once, at construction: text holding a
//! `field<op>value` comparison that also parses as a whole becomes a
//! grammar query with a compiled [`Expression`]; anything else is a plain
//! list of terms that must all occur somewhere in the record.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::accessor::FieldAccessor;
use crate::expression::Expression;
use crate::flags::{SearchFlags, UnknownFlag};
use crate::matcher::{PatternError, ValueMatcher, contains_all, evaluate, evaluate_fields};
use crate::parser::{has_field_comparison, parse_query};
use crate::pattern::{Dialect, pattern_for_words};

#[derive(Debug)]
struct TermList {
    terms: Vec<String>,
    matchers: Vec<ValueMatcher>,
}

#[derive(Debug, Clone)]
enum QueryKind {
    Contains(Arc<TermList>),
    Grammar(Arc<Expression>),
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    raw: String,
    flags: SearchFlags,
    kind: QueryKind,
    /// Terms or positive comparison values, in query order without repeats
    words: Arc<[String]>,
    pattern_error: Option<PatternError>,
}

impl SearchQuery {
    /// Build a query. Never fails: text that does not parse as a field
    /// expression is searched as plain terms.
    pub fn new(raw: impl Into<String>, flags: SearchFlags) -> Self {
        let raw = raw.into();

        let expression = if has_field_comparison(&raw) {
            parse_query(&raw)
                .ok()
                .map(|parsed| Expression::compile(&parsed, flags))
        } else {
            None
        };

        match expression {
            Some(expression) => {
                let mut words: Vec<String> = Vec::new();
                for comparison in expression.positive_comparisons() {
                    if !words.contains(&comparison.value) {
                        words.push(comparison.value.clone());
                    }
                }
                let pattern_error = expression.pattern_error().cloned();
                Self {
                    raw,
                    flags,
                    kind: QueryKind::Grammar(Arc::new(expression)),
                    words: words.into(),
                    pattern_error,
                }
            }
            None => {
                let terms = split_terms(&raw, !flags.is_regular_expression());
                let matchers: Vec<_> = terms
                    .iter()
                    .map(|term| ValueMatcher::new(term, flags))
                    .collect();
                let pattern_error = matchers.iter().find_map(|m| m.error()).cloned();
                Self {
                    raw,
                    flags,
                    words: terms.clone().into(),
                    kind: QueryKind::Contains(Arc::new(TermList { terms, matchers })),
                    pattern_error,
                }
            }
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn flags(&self) -> SearchFlags {
        self.flags
    }

    pub fn is_grammar_based(&self) -> bool {
        matches!(self.kind, QueryKind::Grammar(_))
    }

    pub fn is_contains_based(&self) -> bool {
        matches!(self.kind, QueryKind::Contains(_))
    }

    /// The compiled expression of a grammar query
    pub fn expression(&self) -> Option<&Expression> {
        match &self.kind {
            QueryKind::Grammar(expression) => Some(expression),
            QueryKind::Contains(_) => None,
        }
    }

    /// The term list of a plain query; empty for grammar queries
    pub fn terms(&self) -> &[String] {
        match &self.kind {
            QueryKind::Contains(list) => &list.terms,
            QueryKind::Grammar(_) => &[],
        }
    }

    /// Words to highlight: the terms of a plain query, or the values of the
    /// non-negated comparisons of a grammar query
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// False when the query is a regular expression that does not compile
    pub fn is_valid(&self) -> bool {
        self.pattern_error.is_none()
    }

    pub fn pattern_error(&self) -> Option<&PatternError> {
        self.pattern_error.as_ref()
    }

    /// Whether the record satisfies the query. An invalid query matches
    /// nothing; an empty plain query matches everything.
    pub fn is_match<A>(&self, record: &A) -> bool
    where
        A: FieldAccessor + ?Sized,
    {
        if !self.is_valid() {
            return false;
        }
        match &self.kind {
            QueryKind::Contains(list) => contains_all(&list.matchers, record),
            QueryKind::Grammar(expression) => evaluate(expression, record),
        }
    }

    /// Whether text found outside the record, such as a page of one of its
    /// files, could still make the record match. False when the comparisons
    /// on named fields already rule the record out.
    pub fn fields_allow_match<A>(&self, record: &A) -> bool
    where
        A: FieldAccessor + ?Sized,
    {
        if !self.is_valid() {
            return false;
        }
        match &self.kind {
            QueryKind::Contains(_) => true,
            QueryKind::Grammar(expression) => evaluate_fields(expression, record) != Some(false),
        }
    }

    pub fn pattern_for_words(&self) -> Option<String> {
        pattern_for_words(self, Dialect::Native)
    }

    pub fn javascript_pattern_for_words(&self) -> Option<String> {
        pattern_for_words(self, Dialect::JavaScript)
    }
}

impl PartialEq for SearchQuery {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.flags == other.flags
    }
}

impl Eq for SearchQuery {}

impl Hash for SearchQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
        self.flags.hash(state);
    }
}

/// Renders as `"raw" (case insensitive, plain text) []`
impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" ({}) {}",
            self.raw,
            self.flags.description(),
            self.flags
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFormatError {
    Malformed(String),
    Flag(UnknownFlag),
    /// The description disagrees with the flag list
    Inconsistent(String),
}

impl fmt::Display for QueryFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryFormatError::Malformed(s) => write!(f, "not a rendered query: {s}"),
            QueryFormatError::Flag(e) => e.fmt(f),
            QueryFormatError::Inconsistent(s) => {
                write!(f, "description does not match flags: {s}")
            }
        }
    }
}

impl std::error::Error for QueryFormatError {}

impl From<UnknownFlag> for QueryFormatError {
    fn from(e: UnknownFlag) -> Self {
        QueryFormatError::Flag(e)
    }
}

impl FromStr for SearchQuery {
    type Err = QueryFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || QueryFormatError::Malformed(s.to_string());

        let rest = s.trim().strip_prefix('"').ok_or_else(malformed)?;
        let raw_end = rest.rfind("\" (").ok_or_else(malformed)?;
        let raw = &rest[..raw_end];

        let tail = &rest[raw_end + 3..];
        let description_end = tail.rfind(") [").ok_or_else(malformed)?;
        let description = &tail[..description_end];
        let flags: SearchFlags = tail[description_end + 2..].parse()?;

        if flags.description() != description {
            return Err(QueryFormatError::Inconsistent(description.to_string()));
        }

        Ok(SearchQuery::new(raw, flags))
    }
}

/// Split plain query text into distinct terms on whitespace outside double
/// quotes. Quotes are dropped, `\"` is a literal quote and, when
/// `unescape_backslash` is set, `\\` a literal backslash. Any other
/// backslash sequence is kept as written.
pub fn split_terms(raw: &str, unescape_backslash: bool) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('"') => {
                    current.push('"');
                    chars.next();
                }
                Some('\\') if unescape_backslash => {
                    current.push('\\');
                    chars.next();
                }
                Some('\\') => {
                    current.push_str("\\\\");
                    chars.next();
                }
                _ => current.push('\\'),
            },
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => push_term(&mut terms, &mut current),
            c => current.push(c),
        }
    }
    push_term(&mut terms, &mut current);

    terms
}

fn push_term(terms: &mut Vec<String>, current: &mut String) {
    let term = std::mem::take(current);
    if !term.is_empty() && !terms.contains(&term) {
        terms.push(term);
    }
}
