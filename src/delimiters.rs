//! Tag delimiter configuration.
//!
//! A [`DelimiterRules`] value tells the scanner where tags start and end,
//! which characters split a tag id from its data, and which character marks a
//! closing tag. Two presets are built lazily and shared process-wide:
//!
//! ```text
//! angle():  <color=red>text</color>   <wait 2>   <br/>
//! curly():  {name}   {wait:2.5}   {/style}
//! ```

use crate::ConfigError;
use once_cell::sync::Lazy;

static ANGLE: Lazy<DelimiterRules> = Lazy::new(|| DelimiterRules {
    tag_start: "<".to_string(),
    tag_end: ">".to_string(),
    data_delimiters: vec!['=', ' '],
    close_marker: '/',
});

static CURLY: Lazy<DelimiterRules> = Lazy::new(|| DelimiterRules {
    tag_start: "{".to_string(),
    tag_end: "}".to_string(),
    data_delimiters: vec!['=', ':', ' '],
    close_marker: '/',
});

/// Tag start/end markers, id/data separators and the close marker.
///
/// Immutable once built. Two values are interchangeable when all fields
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterRules {
    tag_start: String,
    tag_end: String,
    data_delimiters: Vec<char>,
    close_marker: char,
}

impl DelimiterRules {
    /// Build and validate a delimiter set.
    ///
    /// Fails when either boundary is empty, or when the close marker or a data
    /// delimiter is part of a tag boundary (the scanner could never tell them
    /// apart).
    pub fn new(
        tag_start: impl Into<String>,
        tag_end: impl Into<String>,
        data_delimiters: impl IntoIterator<Item = char>,
        close_marker: char,
    ) -> Result<Self, ConfigError> {
        let tag_start = tag_start.into();
        let tag_end = tag_end.into();
        let mut unique: Vec<char> = Vec::new();
        for c in data_delimiters {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        let data_delimiters = unique;

        if tag_start.is_empty() {
            return Err(ConfigError::InvalidDelimiters("tag start is empty"));
        }
        if tag_end.is_empty() {
            return Err(ConfigError::InvalidDelimiters("tag end is empty"));
        }
        if tag_start.contains(close_marker) || tag_end.contains(close_marker) {
            return Err(ConfigError::InvalidDelimiters("close marker overlaps a tag boundary"));
        }
        if data_delimiters.contains(&close_marker) {
            return Err(ConfigError::InvalidDelimiters("close marker is also a data delimiter"));
        }
        if data_delimiters.iter().any(|&c| tag_start.contains(c) || tag_end.contains(c)) {
            return Err(ConfigError::InvalidDelimiters("data delimiter overlaps a tag boundary"));
        }

        Ok(Self { tag_start, tag_end, data_delimiters, close_marker })
    }

    /// `<tag=data>` style tags, data split on `=` or space, `/` closes.
    pub fn angle() -> &'static DelimiterRules {
        &ANGLE
    }

    /// `{tag=data}` style tags, data split on `=`, `:` or space, `/` closes.
    pub fn curly() -> &'static DelimiterRules {
        &CURLY
    }

    pub fn tag_start(&self) -> &str {
        &self.tag_start
    }

    pub fn tag_end(&self) -> &str {
        &self.tag_end
    }

    pub fn data_delimiters(&self) -> &[char] {
        &self.data_delimiters
    }

    pub fn close_marker(&self) -> char {
        self.close_marker
    }

    /// Returns true when `c` separates a tag id from its data.
    pub fn is_data_delimiter(&self, c: char) -> bool {
        self.data_delimiters.contains(&c)
    }
}

impl Default for DelimiterRules {
    fn default() -> Self {
        Self::angle().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid_and_distinct() {
        let angle = DelimiterRules::angle();
        let curly = DelimiterRules::curly();

        assert_eq!(angle.tag_start(), "<");
        assert_eq!(angle.tag_end(), ">");
        assert_eq!(curly.tag_start(), "{");
        assert_eq!(curly.tag_end(), "}");
        assert_ne!(angle, curly);

        let rebuilt = DelimiterRules::new("<", ">", ['=', ' '], '/').unwrap();
        assert_eq!(&rebuilt, angle);
    }

    #[test]
    fn rejects_unscannable_rules() {
        let cases: Vec<(Result<DelimiterRules, ConfigError>, &str)> = vec![
            (DelimiterRules::new("", ">", ['='], '/'), "tag start is empty"),
            (DelimiterRules::new("<", "", ['='], '/'), "tag end is empty"),
            (DelimiterRules::new("</", ">", ['='], '/'), "close marker overlaps a tag boundary"),
            (DelimiterRules::new("<", ">", ['=', '/'], '/'), "close marker is also a data delimiter"),
            (DelimiterRules::new("[[", "]]", [']'], '/'), "data delimiter overlaps a tag boundary"),
        ];

        for (result, reason) in cases {
            assert_eq!(result, Err(ConfigError::InvalidDelimiters(reason)));
        }
    }

    #[test]
    fn multi_character_boundaries_are_allowed() {
        let rules = DelimiterRules::new("{{", "}}", ['|'], '/').unwrap();
        assert!(rules.is_data_delimiter('|'));
        assert!(!rules.is_data_delimiter('='));
        assert_eq!(rules.close_marker(), '/');
    }
}
