use std::fmt;

use crate::accessor::FieldRef;
use crate::flags::SearchFlags;
use crate::matcher::{PatternError, ValueMatcher};
use crate::parser::{ParsedQuery, Spanned};

/// Comparison operators of the field grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`: the value occurs somewhere in the field
    Contains,
    /// `==`: the field (or one keyword) equals the value
    Exact,
    /// `!=`: negation of `=`
    DoesNotContain,
    /// `!==`: negation of `==`
    NotExact,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Contains => "=",
            Operator::Exact => "==",
            Operator::DoesNotContain => "!=",
            Operator::NotExact => "!==",
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, Operator::DoesNotContain | Operator::NotExact)
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Operator::Exact | Operator::NotExact)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub field: FieldRef,
    pub operator: Operator,
    pub value: String,
    pub(crate) matcher: ValueMatcher,
}

impl Comparison {
    pub fn new(field: FieldRef, operator: Operator, value: String, flags: SearchFlags) -> Self {
        let matcher = ValueMatcher::new(&value, flags);
        Self {
            field,
            operator,
            value,
            matcher,
        }
    }

    pub fn pattern_error(&self) -> Option<&PatternError> {
        self.matcher.error()
    }
}

/// Compiled boolean expression of field comparisons
#[derive(Debug, Clone)]
pub enum Expression {
    Comparison(Comparison),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
}

impl Expression {
    /// Compile a parsed query. Bare values become `anyfield=value`.
    pub fn compile(parsed: &Spanned<ParsedQuery>, flags: SearchFlags) -> Self {
        let (query, _span) = parsed;
        match query {
            ParsedQuery::Comparison(c) => Expression::Comparison(Comparison::new(
                FieldRef::parse(&c.field.0),
                c.operator.0,
                c.value.0.unescaped(),
                flags,
            )),
            ParsedQuery::Bare(value) => Expression::Comparison(Comparison::new(
                FieldRef::AnyField,
                Operator::Contains,
                value.unescaped(),
                flags,
            )),
            ParsedQuery::And(items) => Self::fold(items, flags, Expression::And),
            ParsedQuery::Or(items) => Self::fold(items, flags, Expression::Or),
            ParsedQuery::Not(inner) => Expression::Not(Box::new(Self::compile(inner, flags))),
        }
    }

    fn fold(
        items: &[Spanned<ParsedQuery>],
        flags: SearchFlags,
        combine: fn(Box<Expression>, Box<Expression>) -> Expression,
    ) -> Self {
        let mut compiled = items.iter().map(|item| Self::compile(item, flags));
        let first = compiled
            .next()
            .expect("parser never produces an empty connective");
        compiled.fold(first, |lhs, rhs| combine(Box::new(lhs), Box::new(rhs)))
    }

    /// All comparisons in source order
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out, false);
        out
    }

    /// Comparisons that are not negated by their operator or an enclosing `NOT`
    pub fn positive_comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out, true);
        out.retain(|c| !c.operator.is_negated());
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>, skip_not: bool) {
        match self {
            Expression::Comparison(c) => out.push(c),
            Expression::And(lhs, rhs) | Expression::Or(lhs, rhs) => {
                lhs.collect_comparisons(out, skip_not);
                rhs.collect_comparisons(out, skip_not);
            }
            Expression::Not(inner) => {
                if !skip_not {
                    inner.collect_comparisons(out, skip_not);
                }
            }
        }
    }

    /// First invalid pattern in the expression, if any
    pub fn pattern_error(&self) -> Option<&PatternError> {
        self.comparisons()
            .into_iter()
            .find_map(Comparison::pattern_error)
    }
}
