//! # tagwright
//!
//! A customizable inline markup parser. Input text carries delimiter-bounded
//! tags (`<name>`, `<wait=2.5>`, `</color>`); each tag is resolved against
//! user-registered rules to either substitute text or emit an event.
//!
//! ```
//! use tagwright::{Config, DelimiterRules, EventRule, Node, ReplaceRule, parse};
//!
//! let mut replace: Config<ReplaceRule> = Config::new();
//! replace.add_replace_with("name", "World").unwrap();
//!
//! let mut events: Config<EventRule<()>> = Config::new();
//! events.add_event("wait").unwrap().with_float_data(1.0);
//!
//! let out = parse("Hello <name>!<wait=2.5>", DelimiterRules::angle(), &mut replace, &mut events, &mut ());
//! assert_eq!(out.rich_text, "Hello World!");
//! assert_eq!(out.nodes.len(), 2);
//! assert!(matches!(&out.nodes[1], Node::Event(e) if e.number_arg == 2.5));
//! ```
//!
//! See [`engine`] for how scanning, rule resolution and dispatch fit together.

extern crate self as tagwright;

#[macro_use]
mod macros;
mod api;
mod delimiters;
mod error;
mod event_id;
mod handlers;

pub mod engine;
pub mod escape;

pub use api::{ParseResultVerbose, parse, parse_text, parse_verbose};
pub use delimiters::DelimiterRules;
pub use engine::{
    CloseState, Config, EventArgument, EventBuilder, EventProcessor, EventRule, OwnedTag, ParseDetails,
    ReplaceBuilder, ReplaceProcessor, ReplaceRule, Replacement, TagData, TagOutcome, TagParser, TagRule, TagTrace,
};
pub use error::ConfigError;
pub use event_id::EventId;
pub use handlers::EventHandlers;

use std::any::Any;
use std::sync::Arc;

// --- Output sink -------------------------------------------------------------

/// Payload of an emitted event.
#[derive(Debug, Clone, Default)]
pub struct EventData {
    pub event_type: EventId,
    pub string_arg: String,
    /// Numeric payload; also backs [`bool_arg`](Self::bool_arg).
    pub number_arg: f64,
    /// True when produced by a closing tag (`</id>`).
    pub closing: bool,
    /// Opaque data attached by a rule callback.
    pub extra: Option<Arc<dyn Any + Send + Sync>>,
}

impl EventData {
    pub fn new(event_type: EventId) -> Self {
        EventData { event_type, ..Self::default() }
    }

    pub fn bool_arg(&self) -> bool {
        self.number_arg != 0.0
    }

    pub fn set_bool_arg(&mut self, value: bool) {
        self.number_arg = if value { 1.0 } else { 0.0 };
    }

    /// Downcast [`extra`](Self::extra) to a concrete type.
    pub fn extra<T: Any>(&self) -> Option<&T> {
        self.extra.as_deref().and_then(|extra| extra.downcast_ref::<T>())
    }
}

/// One unit of parsed output.
#[derive(Debug, Clone)]
pub enum Node {
    /// A run of consecutive visible text, counted in chars.
    Text { visible_chars: usize },
    Event(EventData),
}

/// Accumulated result of a parse pass.
///
/// Reusable: [`clear`](Self::clear) keeps the allocations.
#[derive(Debug, Clone, Default)]
pub struct Output {
    /// Text with replacements applied and markup kept.
    pub rich_text: String,
    /// Text with replacements applied and markup stripped.
    pub visible_text: String,
    /// Text runs and events, in input order.
    pub nodes: Vec<Node>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.rich_text.clear();
        self.visible_text.clear();
        self.nodes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rich_text.is_empty() && self.nodes.is_empty()
    }

    /// Append text. Visible chars extend the trailing text node when there is
    /// one, so a run never splits into several nodes.
    pub fn push_text(&mut self, rich: &str, visible: &str) {
        self.rich_text.push_str(rich);
        self.visible_text.push_str(visible);

        let count = visible.chars().count();
        if count == 0 {
            return;
        }
        match self.nodes.last_mut() {
            Some(Node::Text { visible_chars }) => *visible_chars += count,
            _ => self.nodes.push(Node::Text { visible_chars: count }),
        }
    }

    pub fn push_event(&mut self, event: EventData) {
        self.nodes.push(Node::Event(event));
    }

    /// Events paired with the number of visible chars preceding them.
    pub fn events(&self) -> impl Iterator<Item = (usize, &EventData)> + '_ {
        self.nodes
            .iter()
            .scan(0usize, |offset, node| match node {
                Node::Text { visible_chars } => {
                    *offset += visible_chars;
                    Some(None)
                }
                Node::Event(event) => Some(Some((*offset, event))),
            })
            .flatten()
    }
}
