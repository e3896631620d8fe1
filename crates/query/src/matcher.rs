//! Evaluation of queries against a record's fields

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::accessor::{FieldAccessor, FieldRef, all_field_text};
use crate::expression::{Comparison, Expression};
use crate::flags::SearchFlags;

/// A value that could not be compiled as a regular expression
#[derive(Debug, Clone, PartialEq)]
pub struct PatternError {
    pub pattern: String,
    pub reason: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid regex '{}': {}", self.pattern, self.reason)
    }
}

impl std::error::Error for PatternError {}

/// A single query value prepared for matching under a flag set
#[derive(Debug, Clone)]
pub(crate) enum ValueMatcher {
    /// `needle` is lower-cased unless `case_sensitive`
    Literal { needle: String, case_sensitive: bool },
    /// `exact` is the same pattern anchored at both ends
    Pattern { contains: Regex, exact: Regex },
    Invalid(PatternError),
}

impl ValueMatcher {
    pub(crate) fn new(value: &str, flags: SearchFlags) -> Self {
        let case_sensitive = flags.is_case_sensitive();

        if !flags.is_regular_expression() {
            let needle = if case_sensitive {
                value.to_string()
            } else {
                value.to_lowercase()
            };
            return ValueMatcher::Literal {
                needle,
                case_sensitive,
            };
        }

        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
        };

        match build(value).and_then(|contains| {
            build(&format!("^(?:{value})$")).map(|exact| (contains, exact))
        }) {
            Ok((contains, exact)) => ValueMatcher::Pattern { contains, exact },
            Err(e) => ValueMatcher::Invalid(PatternError {
                pattern: value.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub(crate) fn error(&self) -> Option<&PatternError> {
        match self {
            ValueMatcher::Invalid(e) => Some(e),
            _ => None,
        }
    }

    /// The value occurs somewhere in `haystack`
    pub(crate) fn is_contained_in(&self, haystack: &str) -> bool {
        match self {
            ValueMatcher::Literal {
                needle,
                case_sensitive: true,
            } => haystack.contains(needle.as_str()),
            ValueMatcher::Literal { needle, .. } => {
                haystack.to_lowercase().contains(needle.as_str())
            }
            ValueMatcher::Pattern { contains, .. } => contains.is_match(haystack),
            ValueMatcher::Invalid(_) => false,
        }
    }

    /// The value matches the whole of `candidate`
    pub(crate) fn is_equal_to(&self, candidate: &str) -> bool {
        match self {
            ValueMatcher::Literal {
                needle,
                case_sensitive: true,
            } => candidate == needle,
            ValueMatcher::Literal { needle, .. } => candidate.to_lowercase() == *needle,
            ValueMatcher::Pattern { exact, .. } => exact.is_match(candidate),
            ValueMatcher::Invalid(_) => false,
        }
    }
}

/// Evaluate a compiled expression; `AND`/`OR` short-circuit
pub fn evaluate<A>(expression: &Expression, record: &A) -> bool
where
    A: FieldAccessor + ?Sized,
{
    match expression {
        Expression::Comparison(c) => evaluate_comparison(c, record),
        Expression::And(lhs, rhs) => evaluate(lhs, record) && evaluate(rhs, record),
        Expression::Or(lhs, rhs) => evaluate(lhs, record) || evaluate(rhs, record),
        Expression::Not(inner) => !evaluate(inner, record),
    }
}

/// Evaluate only the comparisons on named fields
///
/// `anyfield` comparisons could also be satisfied by text outside the record
/// (such as a page of a linked file) and count as unknown. `Some(false)` means
/// no such text can make the record match.
pub fn evaluate_fields<A>(expression: &Expression, record: &A) -> Option<bool>
where
    A: FieldAccessor + ?Sized,
{
    match expression {
        Expression::Comparison(c) if matches!(c.field, FieldRef::AnyField) => None,
        Expression::Comparison(c) => Some(evaluate_comparison(c, record)),
        Expression::And(lhs, rhs) => {
            match (evaluate_fields(lhs, record), evaluate_fields(rhs, record)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            }
        }
        Expression::Or(lhs, rhs) => {
            match (evaluate_fields(lhs, record), evaluate_fields(rhs, record)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            }
        }
        Expression::Not(inner) => evaluate_fields(inner, record).map(|matched| !matched),
    }
}

fn evaluate_comparison<A>(comparison: &Comparison, record: &A) -> bool
where
    A: FieldAccessor + ?Sized,
{
    let exact = comparison.operator.is_exact();
    let values = comparison.field.resolve(record, exact);

    let found = values.iter().any(|value| {
        if exact {
            comparison.matcher.is_equal_to(value)
        } else {
            comparison.matcher.is_contained_in(value)
        }
    });

    if comparison.operator.is_negated() {
        !found
    } else {
        found
    }
}

/// Every term must occur in the text of all fields
pub(crate) fn contains_all<A>(terms: &[ValueMatcher], record: &A) -> bool
where
    A: FieldAccessor + ?Sized,
{
    let haystack = all_field_text(record);
    terms.iter().all(|term| term.is_contained_in(&haystack))
}
