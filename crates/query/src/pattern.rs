//! Highlight patterns for the words of a query.
//!
//! Two regex dialects are served: [`Dialect::Native`] understands the
//! `\Q...\E` literal block, [`Dialect::JavaScript`] does not and needs every
//! reserved character escaped on its own.

use crate::search_query::SearchQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Engines with `\Q...\E` quoting (PCRE, Java, Oniguruma)
    Native,
    /// ECMAScript regular expressions, used by embedded web views
    JavaScript,
}

const JAVASCRIPT_RESERVED: &[char] = &[
    '\\', '^', '$', '.', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}', '/',
];

/// Pattern matching any word of the query, each word in its own capturing
/// group and in query order. `None` when there is nothing to highlight.
pub fn pattern_for_words(query: &SearchQuery, dialect: Dialect) -> Option<String> {
    if query.raw().trim().is_empty() {
        return None;
    }

    if query.flags().is_regular_expression() {
        if query.is_contains_based() {
            return Some(format!("({})", query.raw()));
        }
        return join_groups(query.words().iter().map(|word| word.to_string()));
    }

    let quote = match dialect {
        Dialect::Native => quote_block,
        Dialect::JavaScript => escape_javascript,
    };
    join_groups(query.words().iter().map(|word| quote(word)))
}

fn join_groups(words: impl Iterator<Item = String>) -> Option<String> {
    let groups: Vec<_> = words.map(|word| format!("({word})")).collect();
    if groups.is_empty() {
        None
    } else {
        Some(groups.join("|"))
    }
}

/// Wrap in `\Q...\E`, splitting around any `\E` inside the text
pub fn quote_block(text: &str) -> String {
    if !text.contains("\\E") {
        return format!("\\Q{text}\\E");
    }

    let mut out = String::with_capacity(text.len() + 8);
    out.push_str("\\Q");
    let mut rest = text;
    while let Some(index) = rest.find("\\E") {
        out.push_str(&rest[..index]);
        out.push_str("\\E\\\\E\\Q");
        rest = &rest[index + 2..];
    }
    out.push_str(rest);
    out.push_str("\\E");
    out
}

/// Backslash-escape every character reserved in ECMAScript patterns
pub fn escape_javascript(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if JAVASCRIPT_RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{SearchFlag, SearchFlags};

    fn plain(raw: &str) -> SearchQuery {
        SearchQuery::new(raw, SearchFlags::empty())
    }

    fn regex(raw: &str) -> SearchQuery {
        SearchQuery::new(raw, SearchFlags::from(SearchFlag::RegularExpression))
    }

    #[test]
    fn test_single_word() {
        assert_eq!(
            pattern_for_words(&plain("progress"), Dialect::Native).as_deref(),
            Some(r"(\Qprogress\E)")
        );
    }

    #[test]
    fn test_empty_query_has_no_pattern() {
        assert_eq!(pattern_for_words(&plain(""), Dialect::Native), None);
        assert_eq!(pattern_for_words(&plain("   "), Dialect::JavaScript), None);
    }

    #[test]
    fn test_native_escaping() {
        let query = plain(r"<([{\\^-=$!|]})?*+.> word1 word2.");
        assert_eq!(
            pattern_for_words(&query, Dialect::Native).as_deref(),
            Some(r"(\Q<([{\^-=$!|]})?*+.>\E)|(\Qword1\E)|(\Qword2.\E)")
        );
    }

    #[test]
    fn test_javascript_escaping() {
        let query = plain(r"([{\\^$|]})?*+./ word1 word2.");
        assert_eq!(
            pattern_for_words(&query, Dialect::JavaScript).as_deref(),
            Some(r"(\(\[\{\\\^\$\|\]\}\)\?\*\+\.\/)|(word1)|(word2\.)")
        );
    }

    #[test]
    fn test_regex_query_is_used_verbatim() {
        let query = regex(r"[a-c]\d* \d*");
        assert_eq!(
            pattern_for_words(&query, Dialect::Native).as_deref(),
            Some(r"([a-c]\d* \d*)")
        );
        assert_eq!(
            pattern_for_words(&query, Dialect::JavaScript).as_deref(),
            Some(r"([a-c]\d* \d*)")
        );
    }

    #[test]
    fn test_grammar_query_highlights_positive_values() {
        let query = plain("title=deep AND keywords!=banana");
        assert_eq!(
            pattern_for_words(&query, Dialect::JavaScript).as_deref(),
            Some("(deep)")
        );
    }

    #[test]
    fn test_quote_block_with_embedded_end_marker() {
        assert_eq!(quote_block(r"a\Eb"), r"\Qa\E\\E\Qb\E");
    }
}
