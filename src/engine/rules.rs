//! Replace rules, event rules and their builders.
//!
//! Both rule kinds wrap the same [`RuleBase`]: the id pattern, aliases, case
//! sensitivity, the derived specificity and whether the rule has distinct
//! closing-tag behavior. What differs is the payload:
//!
//! ```text
//! ReplaceRule   tag ──▶ Replacement (text | callback | tag callback | fallible)
//! EventRule     tag ──▶ EventData (type id, argument, mutation callback)
//! ```
//!
//! Rules are registered through [`Config`](crate::Config), which hands back a
//! builder borrowing the freshly pushed rule. Every builder modifier that
//! touches the pattern, aliases or case flag recomputes the specificity before
//! returning, so a rule is never matched with a stale score.

use super::specificity::{compute_specificity, wildcard_match};
use crate::{EventData, EventId, TagData};
use std::fmt;
use std::sync::Arc;

pub type ReplaceFn = Arc<dyn Fn() -> String + Send + Sync>;
pub type TagReplaceFn = Arc<dyn Fn(&TagData<'_>) -> String + Send + Sync>;
pub type TryReplaceFn = Arc<dyn Fn(&TagData<'_>) -> Option<String> + Send + Sync>;
pub type EventFn<C> = Arc<dyn Fn(&TagData<'_>, &mut EventData, &mut C) + Send + Sync>;

// --- Shared rule state -------------------------------------------------------

/// State shared by every rule kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBase {
    pattern: String,
    aliases: Vec<String>,
    case_sensitive: bool,
    specificity: i32,
    handles_closing: bool,
}

impl RuleBase {
    pub fn new(pattern: impl Into<String>) -> Self {
        let mut base = RuleBase {
            pattern: pattern.into(),
            aliases: Vec::new(),
            case_sensitive: false,
            specificity: 0,
            handles_closing: false,
        };
        base.recompute();
        base
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn specificity(&self) -> i32 {
        self.specificity
    }

    pub fn handles_closing(&self) -> bool {
        self.handles_closing
    }

    /// Returns true when `id` matches the pattern or any alias.
    pub fn can_handle(&self, id: &str) -> bool {
        wildcard_match(&self.pattern, id, self.case_sensitive)
            || self.aliases.iter().any(|alias| wildcard_match(alias, id, self.case_sensitive))
    }

    fn set_aliases(&mut self, aliases: Vec<String>) {
        self.aliases = aliases;
        self.recompute();
    }

    fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.specificity = compute_specificity(&self.pattern, &self.aliases, self.case_sensitive);
    }
}

/// Access to the shared base of a rule kind. Lets [`Config`](crate::Config)
/// sort and match any rule kind the same way.
pub trait TagRule {
    fn base(&self) -> &RuleBase;

    fn specificity(&self) -> i32 {
        self.base().specificity()
    }

    fn can_handle(&self, id: &str) -> bool {
        self.base().can_handle(id)
    }
}

// --- Replace rules -----------------------------------------------------------

/// How a replace rule produces its text.
#[derive(Clone)]
pub enum Replacement {
    Text(String),
    Callback(ReplaceFn),
    TagCallback(TagReplaceFn),
    /// May decline; `None` means "no replacement" for a matched rule.
    Fallible(TryReplaceFn),
}

impl Replacement {
    pub fn callback(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Replacement::Callback(Arc::new(f))
    }

    pub fn tag_callback(f: impl Fn(&TagData<'_>) -> String + Send + Sync + 'static) -> Self {
        Replacement::TagCallback(Arc::new(f))
    }

    pub fn fallible(f: impl Fn(&TagData<'_>) -> Option<String> + Send + Sync + 'static) -> Self {
        Replacement::Fallible(Arc::new(f))
    }

    pub fn is_fallible(&self) -> bool {
        matches!(self, Replacement::Fallible(_))
    }

    pub(crate) fn apply(&self, tag: &TagData<'_>) -> Option<String> {
        match self {
            Replacement::Text(text) => Some(text.clone()),
            Replacement::Callback(f) => Some(f()),
            Replacement::TagCallback(f) => Some(f(tag)),
            Replacement::Fallible(f) => f(tag),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Replacement::Callback(_) => f.write_str("Callback(<function>)"),
            Replacement::TagCallback(_) => f.write_str("TagCallback(<function>)"),
            Replacement::Fallible(_) => f.write_str("Fallible(<function>)"),
        }
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Replacement::Text(text.to_string())
    }
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Replacement::Text(text)
    }
}

/// Substitutes text for a matched tag.
#[derive(Debug, Clone)]
pub struct ReplaceRule {
    pub(crate) base: RuleBase,
    pub(crate) replacement: Option<Replacement>,
    pub(crate) closing: Option<Replacement>,
}

impl ReplaceRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        ReplaceRule { base: RuleBase::new(pattern), replacement: None, closing: None }
    }

    pub fn replacement(&self) -> Option<&Replacement> {
        self.replacement.as_ref()
    }

    pub fn closing_replacement(&self) -> Option<&Replacement> {
        self.closing.as_ref()
    }
}

impl TagRule for ReplaceRule {
    fn base(&self) -> &RuleBase {
        &self.base
    }
}

// --- Event rules -------------------------------------------------------------

/// How an event rule turns a tag's data slice into the event payload.
///
/// Each mode carries the default used when the data is empty or does not
/// parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventArgument {
    #[default]
    None,
    String(String),
    Number(f64),
    Bool(bool),
}

/// Emits an [`EventData`] for a matched tag.
pub struct EventRule<C> {
    pub(crate) base: RuleBase,
    pub(crate) event_type: EventId,
    pub(crate) closing_event_type: Option<EventId>,
    pub(crate) argument: EventArgument,
    pub(crate) on_event: Option<EventFn<C>>,
    pub(crate) on_close: Option<EventFn<C>>,
}

impl<C> EventRule<C> {
    pub fn new(pattern: impl Into<String>, event_type: EventId) -> Self {
        EventRule {
            base: RuleBase::new(pattern),
            event_type,
            closing_event_type: None,
            argument: EventArgument::None,
            on_event: None,
            on_close: None,
        }
    }

    pub fn event_type(&self) -> EventId {
        self.event_type
    }

    pub fn closing_event_type(&self) -> Option<EventId> {
        self.closing_event_type
    }

    pub fn argument(&self) -> &EventArgument {
        &self.argument
    }
}

impl<C> TagRule for EventRule<C> {
    fn base(&self) -> &RuleBase {
        &self.base
    }
}

impl<C> fmt::Debug for EventRule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRule")
            .field("base", &self.base)
            .field("event_type", &self.event_type)
            .field("closing_event_type", &self.closing_event_type)
            .field("argument", &self.argument)
            .field("on_event", &self.on_event.as_ref().map(|_| "<function>"))
            .field("on_close", &self.on_close.as_ref().map(|_| "<function>"))
            .finish()
    }
}

// --- Builders ----------------------------------------------------------------

/// Implements the modifiers shared by every rule builder.
macro_rules! base_modifiers {
    () => {
        /// Additional patterns this rule answers to.
        pub fn with_aliases<I, S>(self, aliases: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.rule.base.set_aliases(aliases.into_iter().map(Into::into).collect());
            self
        }

        pub fn case_sensitive(self) -> Self {
            self.rule.base.set_case_sensitive(true);
            self
        }

        pub fn case_insensitive(self) -> Self {
            self.rule.base.set_case_sensitive(false);
            self
        }

        pub fn specificity(&self) -> i32 {
            self.rule.base.specificity()
        }
    };
}

/// Chainable modifiers for a freshly registered [`ReplaceRule`].
#[derive(Debug)]
pub struct ReplaceBuilder<'a> {
    rule: &'a mut ReplaceRule,
}

impl<'a> ReplaceBuilder<'a> {
    pub(crate) fn new(rule: &'a mut ReplaceRule) -> Self {
        ReplaceBuilder { rule }
    }

    base_modifiers!();

    pub fn replace_with(self, replacement: impl Into<Replacement>) -> Self {
        self.rule.replacement = Some(replacement.into());
        self
    }

    /// Distinct replacement for closing tags (`</id>`).
    pub fn close_with(self, replacement: impl Into<Replacement>) -> Self {
        self.rule.closing = Some(replacement.into());
        self.rule.base.handles_closing = true;
        self
    }
}

/// Chainable modifiers for a freshly registered [`EventRule`].
pub struct EventBuilder<'a, C> {
    rule: &'a mut EventRule<C>,
}

impl<'a, C> EventBuilder<'a, C> {
    pub(crate) fn new(rule: &'a mut EventRule<C>) -> Self {
        EventBuilder { rule }
    }

    base_modifiers!();

    /// Pass the tag data through as `string_arg`, `default` when empty.
    pub fn with_string_data(self, default: impl Into<String>) -> Self {
        self.rule.argument = EventArgument::String(default.into());
        self
    }

    /// Parse the tag data into `number_arg`, `default` when empty or invalid.
    pub fn with_float_data(self, default: f64) -> Self {
        self.rule.argument = EventArgument::Number(default);
        self
    }

    /// Parse the tag data as a bool stored in `number_arg`.
    pub fn with_bool_data(self, default: bool) -> Self {
        self.rule.argument = EventArgument::Bool(default);
        self
    }

    /// Callback run on the event before it is emitted.
    pub fn on_event(self, f: impl Fn(&TagData<'_>, &mut EventData, &mut C) + Send + Sync + 'static) -> Self {
        self.rule.on_event = Some(Arc::new(f));
        self
    }

    /// Emit `event_type` instead of the rule's type for closing tags.
    pub fn close_with(self, event_type: impl Into<EventId>) -> Self {
        self.rule.closing_event_type = Some(event_type.into());
        self.rule.base.handles_closing = true;
        self
    }

    /// Like [`close_with`](Self::close_with), with a closing-specific callback.
    pub fn close_with_handler(
        self,
        event_type: impl Into<EventId>,
        f: impl Fn(&TagData<'_>, &mut EventData, &mut C) + Send + Sync + 'static,
    ) -> Self {
        self.rule.on_close = Some(Arc::new(f));
        self.close_with(event_type)
    }
}

impl<C> fmt::Debug for EventBuilder<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBuilder").field("rule", &self.rule).finish()
    }
}
