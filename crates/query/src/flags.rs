use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator};

/// Options changing how query values are matched
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SearchFlag {
    CaseSensitive,
    RegularExpression,
}

impl SearchFlag {
    fn bit(&self) -> u8 {
        match self {
            SearchFlag::CaseSensitive => 0b01,
            SearchFlag::RegularExpression => 0b10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlag(pub String);

impl fmt::Display for UnknownFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown search flag '{}'", self.0)
    }
}

impl std::error::Error for UnknownFlag {}

/// A set of [`SearchFlag`]s, iterated in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SearchFlags {
    bits: u8,
}

impl SearchFlags {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn contains(&self, flag: SearchFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    pub fn with(mut self, flag: SearchFlag) -> Self {
        self.bits |= flag.bit();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.contains(SearchFlag::CaseSensitive)
    }

    pub fn is_regular_expression(&self) -> bool {
        self.contains(SearchFlag::RegularExpression)
    }

    pub fn iter(&self) -> impl Iterator<Item = SearchFlag> + '_ {
        SearchFlag::iter().filter(|flag| self.contains(*flag))
    }

    /// Human readable summary, e.g. `case insensitive, plain text`
    pub fn description(&self) -> String {
        let case = if self.is_case_sensitive() {
            "case sensitive"
        } else {
            "case insensitive"
        };
        let mode = if self.is_regular_expression() {
            "regular expression"
        } else {
            "plain text"
        };
        format!("{case}, {mode}")
    }
}

impl From<SearchFlag> for SearchFlags {
    fn from(flag: SearchFlag) -> Self {
        SearchFlags::empty().with(flag)
    }
}

impl FromIterator<SearchFlag> for SearchFlags {
    fn from_iter<T: IntoIterator<Item = SearchFlag>>(iter: T) -> Self {
        iter.into_iter().fold(SearchFlags::empty(), SearchFlags::with)
    }
}

/// Renders as `[CASE_SENSITIVE, REGULAR_EXPRESSION]`
impl fmt::Display for SearchFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(|flag| flag.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

impl FromStr for SearchFlags {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| UnknownFlag(s.to_string()))?;

        inner
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| SearchFlag::from_str(name).map_err(|_| UnknownFlag(name.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_set_operations() {
        let flags = SearchFlags::from(SearchFlag::RegularExpression);
        assert!(flags.is_regular_expression());
        assert!(!flags.is_case_sensitive());
        assert!(SearchFlags::empty().is_empty());
    }

    #[test]
    fn test_iteration_order_is_fixed() {
        let flags: SearchFlags = [SearchFlag::RegularExpression, SearchFlag::CaseSensitive]
            .into_iter()
            .collect();
        assert_eq!(flags.to_string(), "[CASE_SENSITIVE, REGULAR_EXPRESSION]");
    }

    #[rstest]
    #[case(SearchFlags::empty())]
    #[case(SearchFlags::from(SearchFlag::CaseSensitive))]
    #[case(SearchFlags::from(SearchFlag::RegularExpression))]
    #[case(SearchFlags::from(SearchFlag::CaseSensitive).with(SearchFlag::RegularExpression))]
    fn test_rendered_flags_parse_back(#[case] flags: SearchFlags) {
        assert_eq!(flags.to_string().parse::<SearchFlags>(), Ok(flags));
    }

    #[test]
    fn test_unknown_flag() {
        assert!("[FUZZY]".parse::<SearchFlags>().is_err());
        assert!("CASE_SENSITIVE".parse::<SearchFlags>().is_err());
    }

    #[rstest]
    #[case("CASE_SENSITIVE", SearchFlag::CaseSensitive)]
    #[case("regular_expression", SearchFlag::RegularExpression)]
    fn test_flag_names(#[case] name: &str, #[case] flag: SearchFlag) {
        assert_eq!(name.parse::<SearchFlag>(), Ok(flag));
        assert_eq!(flag.to_string(), name.to_ascii_uppercase());
    }

    #[test]
    fn test_description() {
        assert_eq!(SearchFlags::empty().description(), "case insensitive, plain text");
    }
}
