//! Tag data decoding.
//!
//! The scanner hands this module the raw text between a tag start and a tag
//! end. Decoding splits it into an id, a data slice and a close state:
//!
//! ```text
//! raw body        id      data     close state
//! " color=red "   color   red      (none)
//! "/color"        color            OPENING   (ends an open region)
//! "br/"           br               CLOSING   (self-contained)
//! "/x/"           x                BOTH
//! "wait = 2.5"    wait    2.5      (none)
//! ""                               (none)
//! ```
//!
//! The slices borrow from the input. Use [`TagData::to_owned_tag`] to keep a
//! decoded tag past the lifetime of the input buffer.

use crate::DelimiterRules;

bitflags::bitflags! {
    /// Which side(s) of a tag carried the close marker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CloseState: u8 {
        /// Leading marker (`</b>`): closes a previously opened region.
        const OPENING = 1 << 0;
        /// Trailing marker (`<b/>`): self-contained, opens no region.
        const CLOSING = 1 << 1;
        const BOTH = Self::OPENING.bits() | Self::CLOSING.bits();
    }
}

/// One decoded tag. Produced fresh per tag occurrence and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagData<'a> {
    pub id: &'a str,
    pub data: &'a str,
    pub close_state: CloseState,
}

impl<'a> TagData<'a> {
    pub fn new(id: &'a str, data: &'a str) -> Self {
        TagData { id, data, close_state: CloseState::empty() }
    }

    pub fn with_close_state(mut self, close_state: CloseState) -> Self {
        self.close_state = close_state;
        self
    }

    /// True when the tag ends a previously opened region (`</b>`).
    pub fn is_closing(&self) -> bool {
        self.close_state.contains(CloseState::OPENING)
    }

    /// True when the tag carries a trailing close marker (`<b/>`).
    pub fn is_self_closing(&self) -> bool {
        self.close_state.contains(CloseState::CLOSING)
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.data.is_empty()
    }

    /// Copy the borrowed slices so the tag can outlive its input.
    pub fn to_owned_tag(&self) -> OwnedTag {
        OwnedTag { id: self.id.to_string(), data: self.data.to_string(), close_state: self.close_state }
    }
}

/// A [`TagData`] detached from its input buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnedTag {
    pub id: String,
    pub data: String,
    pub close_state: CloseState,
}

impl OwnedTag {
    pub fn as_tag(&self) -> TagData<'_> {
        TagData { id: &self.id, data: &self.data, close_state: self.close_state }
    }
}

/// Decode a raw tag body (delimiters already removed).
pub fn decode<'a>(raw: &'a str, rules: &DelimiterRules) -> TagData<'a> {
    let mut body = raw.trim();
    let mut close_state = CloseState::empty();
    let marker = rules.close_marker();

    if let Some(rest) = body.strip_prefix(marker) {
        close_state |= CloseState::OPENING;
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_suffix(marker) {
        close_state |= CloseState::CLOSING;
        body = rest.trim_end();
    }

    match body.find(|c: char| rules.is_data_delimiter(c)) {
        Some(idx) => {
            let id = body[..idx].trim_end();
            TagData { id, data: split_data(&body[idx..], rules), close_state }
        }
        None => TagData { id: body, data: "", close_state },
    }
}

/// Skip the separator at the start of `rest`: whitespace, at most one
/// non-space delimiter, whitespace. Anything after that belongs to the data.
fn split_data<'a>(rest: &'a str, rules: &DelimiterRules) -> &'a str {
    let rest = rest.trim_start();
    let rest = match rest.chars().next() {
        Some(c) if rules.is_data_delimiter(c) => &rest[c.len_utf8()..],
        _ => rest,
    };
    rest.trim_start()
}
