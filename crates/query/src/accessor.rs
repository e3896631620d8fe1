//! Read-only view over a record's fields, including the virtual fields
//! `anyfield` and `anykeyword`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Name of the virtual field aggregating every real field
pub const ANY_FIELD: &str = "anyfield";

/// Name of the virtual field aggregating the single keywords
pub const ANY_KEYWORD: &str = "anykeyword";

/// The real field holding the keyword list
pub const KEYWORDS_FIELD: &str = "keywords";

pub const KEYWORD_SEPARATOR: char = ',';

/// Field storage of a record as seen by the matcher
pub trait FieldAccessor {
    /// Value of a real field, looked up by its (lower-case) name
    fn field(&self, name: &str) -> Option<&str>;

    /// All real fields with their values, in a stable order
    fn fields(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_>;
}

impl FieldAccessor for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(self.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl FieldAccessor for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        let mut fields: Vec<_> = self.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        fields.sort_unstable();
        Box::new(fields.into_iter())
    }
}

/// The left hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// A real field, stored lower-case
    Named(String),
    AnyField,
    AnyKeyword,
}

impl FieldRef {
    pub fn parse(name: &str) -> Self {
        let name = name.to_lowercase();
        match name.as_str() {
            ANY_FIELD => FieldRef::AnyField,
            ANY_KEYWORD => FieldRef::AnyKeyword,
            _ => FieldRef::Named(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FieldRef::Named(name) => name,
            FieldRef::AnyField => ANY_FIELD,
            FieldRef::AnyKeyword => ANY_KEYWORD,
        }
    }

    /// Resolve to the values a comparison is tested against.
    ///
    /// `split_keywords` requests the keywords field as its single elements
    /// instead of the whole list; `anykeyword` is always split.
    pub fn resolve<'a, A>(&self, record: &'a A, split_keywords: bool) -> Vec<&'a str>
    where
        A: FieldAccessor + ?Sized,
    {
        let expand = |name: &str, value: &'a str, out: &mut Vec<&'a str>| {
            if split_keywords && name.eq_ignore_ascii_case(KEYWORDS_FIELD) {
                out.extend(split_keywords_list(value));
            } else {
                out.push(value);
            }
        };

        let mut values = Vec::new();
        match self {
            FieldRef::Named(name) => {
                if let Some(value) = record.field(name) {
                    expand(name, value, &mut values);
                }
            }
            FieldRef::AnyField => {
                for (name, value) in record.fields() {
                    expand(name, value, &mut values);
                }
            }
            FieldRef::AnyKeyword => {
                if let Some(value) = record.field(KEYWORDS_FIELD) {
                    values.extend(split_keywords_list(value));
                }
            }
        }
        values
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split a keyword list on the separator, trimming and dropping empty items
pub fn split_keywords_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(KEYWORD_SEPARATOR)
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
}

/// All field values joined with a single space
pub fn all_field_text<A>(record: &A) -> String
where
    A: FieldAccessor + ?Sized,
{
    record
        .fields()
        .map(|(_, value)| value)
        .collect::<Vec<_>>()
        .join(" ")
}
