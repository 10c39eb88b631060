//! The tag scanner.
//!
//! One left-to-right pass over the input with two states:
//!
//! ```text
//!            tag start found and a tag end follows
//!   Copying ───────────────────────────────────────▶ InTag
//!      ▲                                               │
//!      └───────────── tag end consumed ────────────────┘
//! ```
//!
//! While *copying*, escape sequences are decoded and characters accumulate in
//! a pending run that is flushed to both the rich and the visible text. On a
//! complete tag the pending run is flushed, the body is decoded, and the
//! processors are asked in order:
//!
//! ```text
//! ReplaceProcessor::try_replace ── Some(text) ──▶ rich += text, visible += strip_tags(text)
//!          │ None
//!          ▼
//! EventProcessor::try_event ────── Some(event) ─▶ Node::Event
//!          │ None
//!          ▼
//! dropped (nothing is written)
//! ```
//!
//! A tag start with no tag end after it is copied as literal text, and so is
//! everything after it: the scan never fails and always moves forward.

use super::dispatch::{EventProcessor, ReplaceProcessor};
use super::metrics::{ParseDetails, TagOutcome, TagTrace};
use super::tag::{TagData, decode};
use crate::escape::{CustomEscape, StandardEscape, unescape_at};
use crate::{DelimiterRules, Output};
use std::borrow::Cow;
use std::fmt;
use std::time::Instant;

/// Scans input with a fixed delimiter set and escape handler.
///
/// Cheap to build; holds only references.
#[derive(Clone, Copy)]
pub struct TagParser<'a> {
    delimiters: &'a DelimiterRules,
    escape: &'a dyn CustomEscape,
}

impl<'a> TagParser<'a> {
    pub fn new(delimiters: &'a DelimiterRules) -> Self {
        TagParser { delimiters, escape: &StandardEscape }
    }

    /// Use `escape` instead of the standard backslash table for literal text.
    pub fn with_escape(mut self, escape: &'a dyn CustomEscape) -> Self {
        self.escape = escape;
        self
    }

    pub fn delimiters(&self) -> &DelimiterRules {
        self.delimiters
    }

    /// Parse `input` into a fresh [`Output`].
    pub fn parse<C, R, E>(&self, input: &str, replace: &mut R, events: &mut E, context: &mut C) -> Output
    where
        R: ReplaceProcessor + ?Sized,
        E: EventProcessor<C> + ?Sized,
    {
        let mut out = Output::new();
        self.scan(input, replace, events, context, &mut out, None);
        out
    }

    /// Parse `input` into a reused `out`, clearing it first.
    pub fn parse_into<C, R, E>(&self, input: &str, replace: &mut R, events: &mut E, context: &mut C, out: &mut Output)
    where
        R: ReplaceProcessor + ?Sized,
        E: EventProcessor<C> + ?Sized,
    {
        out.clear();
        self.scan(input, replace, events, context, out, None);
    }

    /// Parse `input` and record a trace of every tag.
    pub fn parse_verbose<C, R, E>(
        &self,
        input: &str,
        replace: &mut R,
        events: &mut E,
        context: &mut C,
    ) -> (Output, ParseDetails)
    where
        R: ReplaceProcessor + ?Sized,
        E: EventProcessor<C> + ?Sized,
    {
        let start = Instant::now();
        let mut out = Output::new();
        let mut details = ParseDetails::default();
        self.scan(input, replace, events, context, &mut out, Some(&mut details));
        details.elapsed = start.elapsed();
        (out, details)
    }

    fn scan<C, R, E>(
        &self,
        input: &str,
        replace: &mut R,
        events: &mut E,
        context: &mut C,
        out: &mut Output,
        mut details: Option<&mut ParseDetails>,
    ) where
        R: ReplaceProcessor + ?Sized,
        E: EventProcessor<C> + ?Sized,
    {
        let tag_start = self.delimiters.tag_start();
        let tag_end = self.delimiters.tag_end();
        let mut pending = String::new();
        let mut unterminated = false;
        let mut pos = 0;

        while pos < input.len() {
            let rest = &input[pos..];

            if let Some(consumed) = unescape_at(rest, self.escape, &mut pending) {
                pos += consumed;
                continue;
            }

            if !unterminated && rest.starts_with(tag_start) {
                let body_start = pos + tag_start.len();
                match input[body_start..].find(tag_end) {
                    Some(len) => {
                        flush(&mut pending, out);
                        let raw = &input[body_start..body_start + len];
                        let tag = decode(raw, self.delimiters);
                        let outcome = self.dispatch(&tag, replace, events, context, out);
                        if let Some(details) = details.as_deref_mut() {
                            let tag = tag.to_owned_tag();
                            details.tags.push(TagTrace { offset: pos, raw: raw.to_string(), tag, outcome });
                        }
                        pos = body_start + len + tag_end.len();
                        continue;
                    }
                    None => {
                        tracing::debug!(offset = pos, "unterminated tag, copying the rest as text");
                        unterminated = true;
                        if let Some(details) = details.as_deref_mut() {
                            details.unterminated_at = Some(pos);
                        }
                    }
                }
            }

            // `rest` is non-empty here.
            if let Some(c) = rest.chars().next() {
                pending.push(c);
                pos += c.len_utf8();
            }
        }

        flush(&mut pending, out);
    }

    fn dispatch<C, R, E>(
        &self,
        tag: &TagData<'_>,
        replace: &mut R,
        events: &mut E,
        context: &mut C,
        out: &mut Output,
    ) -> TagOutcome
    where
        R: ReplaceProcessor + ?Sized,
        E: EventProcessor<C> + ?Sized,
    {
        if let Some(text) = replace.try_replace(tag) {
            let visible = strip_tags(&text, self.delimiters);
            out.push_text(&text, &visible);
            return TagOutcome::Replaced(text);
        }

        if let Some(event) = events.try_event(tag, context) {
            let event_type = event.event_type;
            out.push_event(event);
            return TagOutcome::Event(event_type);
        }

        tracing::debug!(id = tag.id, data = tag.data, "no rule matched tag");
        TagOutcome::Unmatched
    }
}

impl fmt::Debug for TagParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagParser").field("delimiters", &self.delimiters).field("escape", &"<escape>").finish()
    }
}

fn flush(pending: &mut String, out: &mut Output) {
    if !pending.is_empty() {
        out.push_text(pending.as_str(), pending.as_str());
        pending.clear();
    }
}

/// Remove complete delimiter-bounded tags from `text`.
///
/// Used to derive the visible form of replacement text. An unterminated tag
/// start is kept, like the scanner does.
pub fn strip_tags<'t>(text: &'t str, delimiters: &DelimiterRules) -> Cow<'t, str> {
    let tag_start = delimiters.tag_start();
    let tag_end = delimiters.tag_end();
    if !text.contains(tag_start) {
        return Cow::Borrowed(text);
    }

    let mut visible = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(tag_start) {
        let after_start = &rest[start + tag_start.len()..];
        match after_start.find(tag_end) {
            Some(end) => {
                visible.push_str(&rest[..start]);
                rest = &after_start[end + tag_end.len()..];
            }
            None => break,
        }
    }
    visible.push_str(rest);
    Cow::Owned(visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_complete_tags_only() {
        let angle = DelimiterRules::angle();
        assert_eq!(strip_tags("plain", angle), "plain");
        assert_eq!(strip_tags("<b>bold</b>", angle), "bold");
        assert_eq!(strip_tags("a <i>b</i> c <", angle), "a b c <");
        assert_eq!(strip_tags("{x}", angle), "{x}");
        assert_eq!(strip_tags("{x}y", DelimiterRules::curly()), "y");
    }
}
