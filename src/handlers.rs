//! Event execution.
//!
//! Parsing only records events; [`EventHandlers`] runs them. Handlers are
//! keyed by [`EventId`] and, like [`Config`](crate::Config), a handler set
//! may fall back to a shared parent.

use crate::{EventData, EventId, Node, Output};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type HandlerFn<C> = Arc<dyn Fn(&EventData, &mut C) + Send + Sync>;

/// Maps event types to handlers.
pub struct EventHandlers<C> {
    handlers: HashMap<EventId, HandlerFn<C>>,
    parent: Option<Arc<EventHandlers<C>>>,
}

impl<C> Default for EventHandlers<C> {
    fn default() -> Self {
        EventHandlers { handlers: HashMap::new(), parent: None }
    }
}

impl<C> EventHandlers<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Arc<EventHandlers<C>>) -> Self {
        EventHandlers { parent: Some(parent), ..Self::default() }
    }

    /// Register `handler` for `event_type`, replacing any previous local one.
    pub fn register(
        &mut self,
        event_type: impl Into<EventId>,
        handler: impl Fn(&EventData, &mut C) + Send + Sync + 'static,
    ) -> &mut Self {
        self.handlers.insert(event_type.into(), Arc::new(handler));
        self
    }

    pub fn contains(&self, event_type: EventId) -> bool {
        self.get(event_type).is_some()
    }

    fn get(&self, event_type: EventId) -> Option<&HandlerFn<C>> {
        self.handlers.get(&event_type).or_else(|| self.parent.as_deref().and_then(|parent| parent.get(event_type)))
    }

    /// Run the handler for `event`. Returns false when none is registered.
    pub fn execute(&self, event: &EventData, context: &mut C) -> bool {
        match self.get(event.event_type) {
            Some(handler) => {
                handler(event, context);
                true
            }
            None => {
                tracing::debug!(event_type = ?event.event_type, "no handler for event");
                false
            }
        }
    }

    /// Run every event in `output` in order. Returns how many had a handler.
    pub fn execute_all(&self, output: &Output, context: &mut C) -> usize {
        output
            .nodes
            .iter()
            .filter_map(|node| match node {
                Node::Event(event) => Some(event),
                Node::Text { .. } => None,
            })
            .filter(|event| self.execute(event, context))
            .count()
    }
}

impl<C> fmt::Debug for EventHandlers<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&EventId> = self.handlers.keys().collect();
        ids.sort();
        f.debug_struct("EventHandlers").field("handlers", &ids).field("has_parent", &self.parent.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, number: f64) -> EventData {
        let mut event = EventData::new(EventId::new(name));
        event.number_arg = number;
        event
    }

    #[test]
    fn executes_registered_handlers_in_order() {
        let mut handlers: EventHandlers<Vec<String>> = EventHandlers::new();
        handlers.register("wait", |e, log| log.push(format!("wait {}", e.number_arg)));
        handlers.register("shake", |_, log| log.push("shake".to_string()));

        let mut out = Output::new();
        out.push_event(event("shake", 0.0));
        out.push_text("hi", "hi");
        out.push_event(event("wait", 2.5));
        out.push_event(event("unknown", 0.0));

        let mut log = Vec::new();
        assert_eq!(handlers.execute_all(&out, &mut log), 2);
        assert_eq!(log, vec!["shake".to_string(), "wait 2.5".to_string()]);
    }

    #[test]
    fn local_handler_shadows_parent() {
        let mut base: EventHandlers<u32> = EventHandlers::new();
        base.register("a", |_, n| *n += 1);
        base.register("b", |_, n| *n += 10);
        let base = Arc::new(base);

        let mut child = EventHandlers::with_parent(base);
        child.register("a", |_, n| *n += 100);

        let mut total = 0;
        assert!(child.execute(&event("a", 0.0), &mut total));
        assert!(child.execute(&event("b", 0.0), &mut total));
        assert!(!child.execute(&event("c", 0.0), &mut total));
        assert_eq!(total, 110);
        assert!(child.contains(EventId::new("b")));
    }
}
