//! Specificity scoring and wildcard matching.
//!
//! Every rule is bound to an id pattern (plus optional aliases). A pattern is
//! either a *literal* (`name`) or *wildcarded* with `*` at its start and/or
//! end:
//!
//! ```text
//! pattern   matches ids                 category
//! name      "name"                      literal
//! foo*      "foo", "foobar"             prefix
//! *foo      "foo", "barfoo"             suffix
//! *foo*     "foo", "xfooy"              substring
//! *         anything, even ""           catch-all
//! ```
//!
//! ## Scores
//!
//! Higher scores are tried first. Every literal scores above every wildcard:
//!
//! ```text
//! ""           -> 0
//! wildcarded   -> min(len - 2, WILDCARD_CAP), never below 0
//! literal      -> MAX_SHORT - min(len, LITERAL_CAP)
//! case-sensitive rules double their score
//! ```
//!
//! With both caps at 4096 the largest wildcard score (8192, doubled) stays
//! below the smallest literal score (28671), for any pattern length. A rule's
//! specificity is the *minimum* over its pattern and aliases: a rule is only
//! as specific as its most general spelling.

use std::borrow::Cow;

pub const WILDCARD: char = '*';

const MAX_SHORT: i32 = i16::MAX as i32;
const WILDCARD_CAP: i32 = 4096;
const LITERAL_CAP: i32 = 4096;

/// Score a single pattern.
pub fn score(pattern: &str) -> i32 {
    if pattern.is_empty() {
        return 0;
    }

    let len = i32::try_from(pattern.chars().count()).unwrap_or(i32::MAX);
    if pattern.starts_with(WILDCARD) || pattern.ends_with(WILDCARD) {
        (len - 2).clamp(0, WILDCARD_CAP)
    } else {
        MAX_SHORT - len.min(LITERAL_CAP)
    }
}

/// Specificity of a rule bound to `pattern` and `aliases`.
pub fn compute_specificity<S: AsRef<str>>(pattern: &str, aliases: &[S], case_sensitive: bool) -> i32 {
    let base = aliases.iter().map(|alias| score(alias.as_ref())).fold(score(pattern), i32::min);
    if case_sensitive { base * 2 } else { base }
}

/// Returns true when `id` matches `pattern` under wildcard semantics.
pub fn wildcard_match(pattern: &str, id: &str, case_sensitive: bool) -> bool {
    let leading = pattern.starts_with(WILDCARD);
    let trailing = pattern.ends_with(WILDCARD);

    if !leading && !trailing {
        return fold(pattern, case_sensitive) == fold(id, case_sensitive);
    }

    let literal = pattern.trim_matches(WILDCARD);
    if literal.is_empty() {
        return true;
    }

    let literal = fold(literal, case_sensitive);
    let id = fold(id, case_sensitive);
    if leading && trailing {
        id.contains(literal.as_ref())
    } else if leading {
        id.ends_with(literal.as_ref())
    } else {
        id.starts_with(literal.as_ref())
    }
}

fn fold(s: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive || !s.chars().any(char::is_uppercase) { Cow::Borrowed(s) } else { Cow::Owned(s.to_lowercase()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matching() {
        let cases: Vec<(&str, &str, bool)> = vec![
            ("foo*", "foobar", true),
            ("foo*", "foo", true),
            ("foo*", "barfoo", false),
            ("*foo", "barfoo", true),
            ("*foo", "foobar", false),
            ("*foo*", "xfooy", true),
            ("*foo*", "xfoy", false),
            ("*", "anything", true),
            ("*", "", true),
            ("**", "x", true),
            ("name", "name", true),
            ("name", "names", false),
            ("", "", true),
            ("", "x", false),
        ];

        for (pattern, id, expected) in cases {
            assert_eq!(wildcard_match(pattern, id, false), expected, "{pattern:?} vs {id:?}");
        }
    }

    #[test]
    fn case_sensitivity() {
        assert!(wildcard_match("Name", "name", false));
        assert!(wildcard_match("FOO*", "foobar", false));
        assert!(!wildcard_match("Name", "name", true));
        assert!(wildcard_match("Name", "Name", true));
        assert!(!wildcard_match("*Bar", "foobar", true));
    }

    #[test]
    fn scores() {
        assert_eq!(score(""), 0);
        assert_eq!(score("*"), 0);
        assert_eq!(score("*ab"), 1);
        assert_eq!(score("*abc*"), 3);
        assert_eq!(score("name"), MAX_SHORT - 4);
        assert!(score("a") > score("abc"), "shorter literals rank higher");
    }

    #[test]
    fn specificity_takes_minimum_and_doubles_for_case() {
        let aliases = ["n*"];
        assert_eq!(compute_specificity("name", &aliases, false), 0);
        assert_eq!(compute_specificity::<&str>("name", &[], false), MAX_SHORT - 4);
        assert_eq!(compute_specificity::<&str>("name", &[], true), (MAX_SHORT - 4) * 2);
        assert_eq!(compute_specificity::<&str>("*abcd", &[], true), 6);
    }

    #[test]
    fn literal_always_beats_wildcard() {
        let long_literal: String = "x".repeat(20_000);
        let long_wildcard = format!("*{}*", "y".repeat(20_000));

        let literal = compute_specificity::<&str>(&long_literal, &[], false);
        let wildcard = compute_specificity::<&str>(&long_wildcard, &[], true);
        assert!(literal > wildcard, "literal {literal} must outrank wildcard {wildcard}");

        let short_literal = compute_specificity::<&str>("a", &[], false);
        let short_wildcard = compute_specificity::<&str>("*ab", &[], true);
        assert!(short_literal > short_wildcard);
    }
}
