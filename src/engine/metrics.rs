//! Parse traces.
//!
//! [`TagParser::parse_verbose`](crate::TagParser::parse_verbose) records one
//! [`TagTrace`] per completed tag so callers (and the CLI report) can see how
//! each tag was decoded and what it resolved to. The default parse path does
//! not allocate any of this.

use crate::{EventId, OwnedTag};
use std::time::Duration;

/// What a tag resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    /// A replace rule produced this text.
    Replaced(String),
    /// An event rule emitted an event of this type.
    Event(EventId),
    /// No rule matched, or a fallible replacement declined.
    Unmatched,
}

/// One tag seen during a parse.
#[derive(Debug, Clone, PartialEq)]
pub struct TagTrace {
    /// Byte offset of the tag start in the input.
    pub offset: usize,
    /// Raw body between the delimiters, untrimmed.
    pub raw: String,
    pub tag: OwnedTag,
    pub outcome: TagOutcome,
}

/// Details collected by a verbose parse.
#[derive(Debug, Clone, Default)]
pub struct ParseDetails {
    /// Total elapsed time for the pass.
    pub elapsed: Duration,
    /// Every completed tag, in input order.
    pub tags: Vec<TagTrace>,
    /// Byte offset of an unterminated tag start, if one was found.
    pub unterminated_at: Option<usize>,
}

impl ParseDetails {
    pub fn replaced(&self) -> usize {
        self.tags.iter().filter(|t| matches!(t.outcome, TagOutcome::Replaced(_))).count()
    }

    pub fn events(&self) -> usize {
        self.tags.iter().filter(|t| matches!(t.outcome, TagOutcome::Event(_))).count()
    }

    pub fn unmatched(&self) -> usize {
        self.tags.iter().filter(|t| t.outcome == TagOutcome::Unmatched).count()
    }
}
