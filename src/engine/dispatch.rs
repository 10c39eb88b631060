//! Rule evaluation and the processor seams.
//!
//! The scanner does not know about configs; it talks to two traits:
//!
//! - [`ReplaceProcessor`]: "is there text for this tag?"
//! - [`EventProcessor`]: "is there an event for this tag?"
//!
//! `Config<ReplaceRule>` and `Config<EventRule<C>>` implement them by looking
//! the tag id up (walking the parent chain) and evaluating the matched rule.
//! `()` implements both as "never matches", for callers that only need one
//! kind. Runtime code that already holds a decoded tag can call the same
//! methods directly.
//!
//! ## Replace evaluation order
//!
//! ```text
//! fallible main replacement?  ──▶ its result, Some or None
//! closing tag + closing rule?  ──▶ closing replacement
//! main replacement?            ──▶ its text
//! otherwise                    ──▶ ""
//! ```
//!
//! ## Event evaluation
//!
//! ```text
//! type      = closing type for handled closing tags, else the rule's type
//! argument  = parse(tag.data) per EventArgument, default on empty/invalid
//! callback  = closing callback for handled closing tags, else on_event
//! ```

use super::rules::{EventArgument, EventRule, ReplaceRule, TagRule};
use crate::{Config, EventData, TagData};
use std::sync::Arc;

/// Produces replacement text for tags.
pub trait ReplaceProcessor {
    fn try_replace(&mut self, tag: &TagData<'_>) -> Option<String>;
}

/// Produces events for tags.
pub trait EventProcessor<C> {
    fn try_event(&mut self, tag: &TagData<'_>, context: &mut C) -> Option<EventData>;
}

impl ReplaceRule {
    /// Evaluate this rule for `tag`. `None` only comes from a fallible
    /// replacement that declined.
    pub fn evaluate(&self, tag: &TagData<'_>) -> Option<String> {
        if let Some(main) = self.replacement.as_ref().filter(|r| r.is_fallible()) {
            return main.apply(tag);
        }

        if self.base.handles_closing() && tag.is_closing() {
            if let Some(closing) = &self.closing {
                return closing.apply(tag);
            }
        }

        match &self.replacement {
            Some(main) => main.apply(tag),
            None => Some(String::new()),
        }
    }
}

impl<C> EventRule<C> {
    /// Build the event for `tag` and run the mutation callback on it.
    pub fn evaluate(&self, tag: &TagData<'_>, context: &mut C) -> EventData {
        let handled_close = self.base.handles_closing() && tag.is_closing();

        let event_type = match (handled_close, self.closing_event_type) {
            (true, Some(closing)) => closing,
            _ => self.event_type,
        };
        let mut event = EventData::new(event_type);
        event.closing = tag.is_closing();
        self.argument.apply(tag.data, &mut event);

        let callback =
            if handled_close { self.on_close.as_ref().or(self.on_event.as_ref()) } else { self.on_event.as_ref() };
        if let Some(callback) = callback {
            callback(tag, &mut event, context);
        }
        event
    }
}

impl EventArgument {
    /// Fill the payload of `event` from `data`.
    pub(crate) fn apply(&self, data: &str, event: &mut EventData) {
        match self {
            EventArgument::None => {}
            EventArgument::String(default) => {
                event.string_arg = if data.is_empty() { default.clone() } else { data.to_string() };
            }
            EventArgument::Number(default) => {
                event.number_arg = parse_number(data).unwrap_or(*default);
            }
            EventArgument::Bool(default) => {
                event.set_bool_arg(parse_bool(data).unwrap_or(*default));
            }
        }
    }
}

/// Plain decimal numbers only; `inf`/`NaN` spellings are rejected.
fn parse_number(data: &str) -> Option<f64> {
    let re = regex!(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$");
    if !re.is_match(data) {
        return None;
    }
    data.parse::<f64>().ok()
}

fn parse_bool(data: &str) -> Option<bool> {
    if data.eq_ignore_ascii_case("true") {
        Some(true)
    } else if data.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        parse_number(data).map(|n| n != 0.0)
    }
}

// --- Processor implementations ---------------------------------------------

impl ReplaceProcessor for () {
    fn try_replace(&mut self, _tag: &TagData<'_>) -> Option<String> {
        None
    }
}

impl<C> EventProcessor<C> for () {
    fn try_event(&mut self, _tag: &TagData<'_>, _context: &mut C) -> Option<EventData> {
        None
    }
}

impl ReplaceProcessor for Config<ReplaceRule> {
    fn try_replace(&mut self, tag: &TagData<'_>) -> Option<String> {
        let rule = self.lookup(tag.id)?;
        tracing::trace!(id = tag.id, pattern = rule.base().pattern(), "replace rule matched");
        rule.evaluate(tag)
    }
}

impl ReplaceProcessor for Arc<Config<ReplaceRule>> {
    fn try_replace(&mut self, tag: &TagData<'_>) -> Option<String> {
        let rule = self.find(tag.id)?;
        tracing::trace!(id = tag.id, pattern = rule.base().pattern(), "replace rule matched");
        rule.evaluate(tag)
    }
}

impl<C> EventProcessor<C> for Config<EventRule<C>> {
    fn try_event(&mut self, tag: &TagData<'_>, context: &mut C) -> Option<EventData> {
        let rule = self.lookup(tag.id)?;
        tracing::trace!(id = tag.id, pattern = rule.base().pattern(), "event rule matched");
        Some(rule.evaluate(tag, context))
    }
}

impl<C> EventProcessor<C> for Arc<Config<EventRule<C>>> {
    fn try_event(&mut self, tag: &TagData<'_>, context: &mut C) -> Option<EventData> {
        let rule = self.find(tag.id)?;
        tracing::trace!(id = tag.id, pattern = rule.base().pattern(), "event rule matched");
        Some(rule.evaluate(tag, context))
    }
}

impl<P: ReplaceProcessor + ?Sized> ReplaceProcessor for &mut P {
    fn try_replace(&mut self, tag: &TagData<'_>) -> Option<String> {
        (**self).try_replace(tag)
    }
}

impl<C, P: EventProcessor<C> + ?Sized> EventProcessor<C> for &mut P {
    fn try_event(&mut self, tag: &TagData<'_>, context: &mut C) -> Option<EventData> {
        (**self).try_event(tag, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CloseState, EventId, Replacement};
    use pretty_assertions::assert_eq;

    fn closing(id: &str) -> TagData<'_> {
        TagData::new(id, "").with_close_state(CloseState::OPENING)
    }

    #[test]
    fn replace_prefers_closing_text_for_closing_tags() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("b", "<b>").unwrap().close_with("</b>");

        assert_eq!(config.try_replace(&TagData::new("b", "")).as_deref(), Some("<b>"));
        assert_eq!(config.try_replace(&closing("b")).as_deref(), Some("</b>"));
    }

    #[test]
    fn replace_without_closing_rule_reuses_main_text() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("hr", "----").unwrap();
        config.add_replace("blank").unwrap();

        assert_eq!(config.try_replace(&closing("hr")).as_deref(), Some("----"));
        assert_eq!(config.try_replace(&TagData::new("blank", "")).as_deref(), Some(""));
    }

    #[test]
    fn replace_callbacks() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("time", Replacement::callback(|| "noon".to_string())).unwrap();
        config.add_replace_with("upper", Replacement::tag_callback(|tag| tag.data.to_uppercase())).unwrap();
        config
            .add_replace_with("color", Replacement::tag_callback(|tag| format!("<color={}>", tag.data)))
            .unwrap()
            .close_with(Replacement::callback(|| "</color>".to_string()));

        assert_eq!(config.try_replace(&TagData::new("time", "")).as_deref(), Some("noon"));
        assert_eq!(config.try_replace(&TagData::new("upper", "shout")).as_deref(), Some("SHOUT"));
        assert_eq!(config.try_replace(&TagData::new("color", "red")).as_deref(), Some("<color=red>"));
        assert_eq!(config.try_replace(&closing("color")).as_deref(), Some("</color>"));
    }

    #[test]
    fn fallible_replacement_wins_and_may_decline() {
        let mut config: Config<ReplaceRule> = Config::new();
        config
            .add_replace_with("var", Replacement::fallible(|tag| (tag.data == "known").then(|| "value".to_string())))
            .unwrap()
            .close_with("never used");

        assert_eq!(config.try_replace(&TagData::new("var", "known")).as_deref(), Some("value"));
        assert_eq!(config.try_replace(&TagData::new("var", "unknown")), None);
        assert_eq!(config.try_replace(&closing("var")), None);
    }

    #[test]
    fn event_argument_modes() {
        let mut events: Config<EventRule<()>> = Config::new();
        events.add_event("wait").unwrap().with_float_data(1.0);
        events.add_event("speaker").unwrap().with_string_data("narrator");
        events.add_event("skip").unwrap().with_bool_data(true);
        let ctx = &mut ();

        let cases: Vec<(&str, &str, f64)> = vec![
            ("wait", "2.5", 2.5),
            ("wait", "", 1.0),
            ("wait", "soon", 1.0),
            ("wait", "inf", 1.0),
            ("wait", "-.5", -0.5),
            ("skip", "false", 0.0),
            ("skip", "FALSE", 0.0),
            ("skip", "", 1.0),
            ("skip", "0", 0.0),
            ("skip", "maybe", 1.0),
        ];
        for (id, data, expected) in cases {
            let event = events.try_event(&TagData::new(id, data), ctx).unwrap();
            assert_eq!(event.number_arg, expected, "<{id}={data}>");
        }

        let named = events.try_event(&TagData::new("speaker", "Ava"), ctx).unwrap();
        assert_eq!(named.string_arg, "Ava");
        let unnamed = events.try_event(&TagData::new("speaker", ""), ctx).unwrap();
        assert_eq!(unnamed.string_arg, "narrator");
        assert_eq!(unnamed.event_type, EventId::new("speaker"));
    }

    #[test]
    fn event_closing_type_and_callbacks() {
        let mut events: Config<EventRule<Vec<String>>> = Config::new();
        events
            .add_event_with("shake", "shake-start")
            .unwrap()
            .with_float_data(0.5)
            .on_event(|tag, _event, log| log.push(format!("open {}", tag.id)))
            .close_with_handler("shake-stop", |_tag, event, log| {
                event.number_arg = 0.0;
                log.push("close".to_string());
            });

        let mut log = Vec::new();
        let open = events.try_event(&TagData::new("shake", "2"), &mut log).unwrap();
        let close = events.try_event(&closing("shake"), &mut log).unwrap();

        assert_eq!(open.event_type, EventId::new("shake-start"));
        assert_eq!(open.number_arg, 2.0);
        assert!(!open.closing);
        assert_eq!(close.event_type, EventId::new("shake-stop"));
        assert_eq!(close.number_arg, 0.0);
        assert!(close.closing);
        assert_eq!(log, vec!["open shake".to_string(), "close".to_string()]);
    }

    #[test]
    fn unhandled_closing_tags_keep_main_type() {
        let mut events: Config<EventRule<()>> = Config::new();
        events.add_event("pause").unwrap();

        let event = events.try_event(&closing("pause"), &mut ()).unwrap();
        assert_eq!(event.event_type, EventId::new("pause"));
        assert!(event.closing);
    }

    #[test]
    fn shared_configs_dispatch_through_find() {
        let mut base: Config<ReplaceRule> = Config::new();
        base.add_replace_with("name", "World").unwrap();
        base.lock();
        let mut shared = Arc::new(base);

        assert_eq!(shared.try_replace(&TagData::new("NAME", "")).as_deref(), Some("World"));
        assert_eq!(().try_replace(&TagData::new("name", "")), None);
    }
}
