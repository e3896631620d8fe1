pub mod accessor;
pub mod expression;
pub mod flags;
pub mod lexer;
pub mod matcher;
pub mod parser;
pub mod pattern;
pub mod search_query;

pub use accessor::{ANY_FIELD, ANY_KEYWORD, FieldAccessor, FieldRef, KEYWORDS_FIELD};
pub use expression::{Comparison, Expression, Operator};
pub use flags::{SearchFlag, SearchFlags, UnknownFlag};
pub use lexer::{QueryLexer, Token};
pub use matcher::{PatternError, evaluate, evaluate_fields};
pub use parser::{ParseError, has_field_comparison, parse_query, parser};
pub use pattern::{Dialect, pattern_for_words};
pub use search_query::{QueryFormatError, SearchQuery, split_terms};
