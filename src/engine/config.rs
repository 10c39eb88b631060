//! Rule sets with inheritance.
//!
//! A [`Config`] is an ordered list of rules plus an optional parent to fall
//! back to. Resolution walks the chain child-first:
//!
//! ```text
//! lookup("name")
//!   child:  [name (literal), n* (prefix), * (catch-all)]  ── first match wins
//!      │ no match
//!      ▼
//!   parent: [...]                                        ── same, recursively
//!      │ no match
//!      ▼
//!   None
//! ```
//!
//! ## Ordering
//!
//! Rules are kept sorted by descending specificity; ties keep registration
//! order (the sort is stable). Adding a rule only marks the list dirty; the
//! next [`Config::lookup`] re-sorts. [`Config::find`] works on `&self` (and so
//! on a shared parent) and yields the same rule whether or not the list is
//! currently sorted.
//!
//! ## Locking
//!
//! [`Config::lock`] sorts the rules and freezes the config for good: every
//! later registration fails with [`ConfigError::Locked`]. The intended
//! discipline is to build a base config, lock it, wrap it in an `Arc` and
//! hand it to any number of children as their parent. A `Config` does no
//! internal synchronisation, so it must not be mutated while another thread
//! resolves against it.

use super::rules::{EventBuilder, EventRule, ReplaceBuilder, ReplaceRule, TagRule};
use crate::{ConfigError, EventId};
use std::sync::Arc;

/// An ordered, lazily sorted rule set with an optional parent.
#[derive(Debug)]
pub struct Config<T> {
    rules: Vec<T>,
    parent: Option<Arc<Config<T>>>,
    sorted: bool,
    locked: bool,
}

impl<T> Default for Config<T> {
    fn default() -> Self {
        Config { rules: Vec::new(), parent: None, sorted: true, locked: false }
    }
}

impl<T: TagRule> Config<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty config falling back to `parent`.
    pub fn with_parent(parent: Arc<Config<T>>) -> Self {
        Config { parent: Some(parent), ..Self::default() }
    }

    pub fn parent(&self) -> Option<&Arc<Config<T>>> {
        self.parent.as_ref()
    }

    /// Replace (or clear) the parent.
    pub fn set_parent(&mut self, parent: Option<Arc<Config<T>>>) -> Result<(), ConfigError> {
        self.check_unlocked("<parent>")?;
        self.parent = parent;
        Ok(())
    }

    /// Sort and freeze. Irreversible.
    pub fn lock(&mut self) {
        self.ensure_sorted();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of local rules (the parent is not counted).
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Local rules in their current order.
    pub fn rules(&self) -> &[T] {
        &self.rules
    }

    /// Resolve `id` to the most specific matching rule, sorting first if
    /// needed, then falling back to the parent chain.
    pub fn lookup(&mut self, id: &str) -> Option<&T> {
        self.ensure_sorted();
        let local = self.rules.iter().position(|rule| rule.can_handle(id));
        match local {
            Some(idx) => Some(&self.rules[idx]),
            None => self.parent.as_deref().and_then(|parent| parent.find(id)),
        }
    }

    /// Resolve `id` without sorting. Same answer as [`lookup`](Self::lookup).
    pub fn find(&self, id: &str) -> Option<&T> {
        let local = if self.sorted {
            self.rules.iter().find(|rule| rule.can_handle(id))
        } else {
            // Highest specificity, earliest registration on ties.
            self.rules.iter().filter(|rule| rule.can_handle(id)).fold(None, |best: Option<&T>, rule| match best {
                Some(b) if b.specificity() >= rule.specificity() => Some(b),
                _ => Some(rule),
            })
        };
        local.or_else(|| self.parent.as_deref().and_then(|parent| parent.find(id)))
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.rules.sort_by(|a, b| b.specificity().cmp(&a.specificity()));
            self.sorted = true;
        }
    }

    fn check_unlocked(&self, pattern: &str) -> Result<(), ConfigError> {
        if self.locked {
            tracing::warn!(pattern, "rejected mutation of a locked config");
            return Err(ConfigError::Locked);
        }
        Ok(())
    }

    fn push(&mut self, rule: T) -> Result<&mut T, ConfigError> {
        self.check_unlocked(rule.base().pattern())?;
        self.rules.push(rule);
        self.sorted = false;
        let last = self.rules.len() - 1;
        Ok(&mut self.rules[last])
    }
}

impl Config<ReplaceRule> {
    /// Register a replace rule with no replacement yet (matches produce "").
    pub fn add_replace(&mut self, pattern: impl Into<String>) -> Result<ReplaceBuilder<'_>, ConfigError> {
        let rule = self.push(ReplaceRule::new(pattern))?;
        Ok(ReplaceBuilder::new(rule))
    }

    /// Register a replace rule producing `replacement`.
    pub fn add_replace_with(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<crate::Replacement>,
    ) -> Result<ReplaceBuilder<'_>, ConfigError> {
        Ok(self.add_replace(pattern)?.replace_with(replacement))
    }
}

impl<C> Config<EventRule<C>> {
    /// Register an event rule whose event type is the hash of `pattern`.
    pub fn add_event(&mut self, pattern: impl Into<String>) -> Result<EventBuilder<'_, C>, ConfigError> {
        let pattern = pattern.into();
        let event_type = EventId::new(&pattern);
        self.add_event_with(pattern, event_type)
    }

    /// Register an event rule emitting `event_type`.
    pub fn add_event_with(
        &mut self,
        pattern: impl Into<String>,
        event_type: impl Into<EventId>,
    ) -> Result<EventBuilder<'_, C>, ConfigError> {
        let rule = self.push(EventRule::new(pattern, event_type.into()))?;
        Ok(EventBuilder::new(rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Replacement;

    fn replacement_of(config: &mut Config<ReplaceRule>, id: &str) -> Option<String> {
        match config.lookup(id)?.replacement()? {
            Replacement::Text(text) => Some(text.clone()),
            other => Some(format!("{other:?}")),
        }
    }

    #[test]
    fn most_specific_rule_wins_regardless_of_order() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("*", "catch-all").unwrap();
        config.add_replace_with("na*", "prefix").unwrap();
        config.add_replace_with("name", "literal").unwrap();

        assert_eq!(replacement_of(&mut config, "name").as_deref(), Some("literal"));
        assert_eq!(replacement_of(&mut config, "nap").as_deref(), Some("prefix"));
        assert_eq!(replacement_of(&mut config, "other").as_deref(), Some("catch-all"));
    }

    #[test]
    fn ties_resolve_in_registration_order() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("a*", "first").unwrap();
        config.add_replace_with("ab*", "second").unwrap();
        config.add_replace_with("b*", "third").unwrap();

        // "a*" and "b*" share a score; "ab*" scores higher.
        assert_eq!(replacement_of(&mut config, "abc").as_deref(), Some("second"));
        let patterns: Vec<&str> = config.rules().iter().map(|r| r.base().pattern()).collect();
        assert_eq!(patterns, vec!["ab*", "a*", "b*"]);
    }

    #[test]
    fn case_sensitive_rules_outrank_insensitive_twins() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("Name", "insensitive").unwrap();
        config.add_replace_with("Name", "sensitive").unwrap().case_sensitive();

        assert_eq!(replacement_of(&mut config, "Name").as_deref(), Some("sensitive"));
        assert_eq!(replacement_of(&mut config, "name").as_deref(), Some("insensitive"));
    }

    #[test]
    fn child_shadows_parent() {
        let mut base: Config<ReplaceRule> = Config::new();
        base.add_replace_with("name", "parent").unwrap();
        base.add_replace_with("title", "Captain").unwrap();
        base.lock();
        let base = Arc::new(base);

        let mut child = Config::with_parent(Arc::clone(&base));
        child.add_replace_with("name", "child").unwrap();

        assert_eq!(replacement_of(&mut child, "name").as_deref(), Some("child"));
        assert_eq!(replacement_of(&mut child, "title").as_deref(), Some("Captain"));
        assert_eq!(replacement_of(&mut child, "missing"), None);
    }

    #[test]
    fn parent_catch_all_reached_after_child_misses() {
        let mut base: Config<ReplaceRule> = Config::new();
        base.add_replace_with("*", "fallback").unwrap();
        let base = Arc::new(base);

        let mut child = Config::with_parent(base);
        child.add_replace_with("hero", "Link").unwrap();

        assert_eq!(replacement_of(&mut child, "hero").as_deref(), Some("Link"));
        assert_eq!(replacement_of(&mut child, "villain").as_deref(), Some("fallback"));
    }

    #[test]
    fn find_agrees_with_lookup_before_sorting() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("*", "any").unwrap();
        config.add_replace_with("x*", "x-prefix").unwrap();
        config.add_replace_with("xy*", "xy-prefix-1").unwrap();
        config.add_replace_with("y*", "y-prefix").unwrap();
        config.add_replace_with("xy*", "xy-prefix-2").unwrap();

        let found = config.find("xyz").and_then(|r| r.replacement()).map(|r| format!("{r:?}"));
        let looked_up = config.lookup("xyz").and_then(|r| r.replacement()).map(|r| format!("{r:?}"));
        assert_eq!(found, looked_up);
        assert_eq!(found.as_deref(), Some("Text(\"xy-prefix-1\")"));
    }

    #[test]
    fn locked_config_rejects_mutation() {
        let mut config: Config<ReplaceRule> = Config::new();
        config.add_replace_with("a", "b").unwrap();
        config.lock();

        assert!(config.is_locked());
        assert_eq!(config.add_replace("c").err(), Some(ConfigError::Locked));
        assert_eq!(config.set_parent(None), Err(ConfigError::Locked));
        assert_eq!(config.len(), 1);

        let mut events: Config<EventRule<()>> = Config::new();
        events.lock();
        assert!(matches!(events.add_event("wait"), Err(ConfigError::Locked)));
    }

    #[test]
    fn add_event_hashes_pattern() {
        let mut events: Config<EventRule<()>> = Config::new();
        events.add_event("wait").unwrap();
        events.add_event_with("pause", "wait").unwrap();

        assert_eq!(events.lookup("wait").map(|r| r.event_type()), Some(EventId::new("wait")));
        assert_eq!(events.lookup("pause").map(|r| r.event_type()), Some(EventId::new("wait")));
    }
}
