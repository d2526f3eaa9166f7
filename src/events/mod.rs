//! Event values routed by the dispatcher.
//!
//! Every event carries a dot-namespaced name such as `engine.tick` or
//! `window.key`. The name is the only thing an
//! [`EventDispatcher`](crate::dispatcher::EventDispatcher) looks at: it picks
//! the observer set and nothing else. Payloads live in a closed sum type so
//! observers can match on the kind they care about.
//!
//! Submodules:
//! - [`phase`] – the fixed engine phase events that drive one frame
//! - [`window`] – input coming from the (external) OS window
//!
//! Names beginning with `engine.` are reserved for [`phase`] events. User code
//! that needs its own events uses [`CustomEvent`], which carries an owned name
//! and an arbitrary JSON payload.
pub mod phase;
pub mod window;

use serde::Serialize;

pub use phase::PhaseEvent;
pub use window::WindowEvent;

/// Prefix shared by all reserved engine phase events.
pub const ENGINE_PREFIX: &str = "engine.";

/// A user-defined event with an owned name and a free-form payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

/// Any event that can travel through a dispatcher queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    /// Engine frame phase event (`engine.*`).
    Phase(PhaseEvent),
    /// Event sourced from the OS window (`window.*`).
    Window(WindowEvent),
    /// Application-defined event.
    Custom(CustomEvent),
}

impl Event {
    /// Build a custom event. The name must not use the reserved `engine.` prefix;
    /// this is checked in debug builds only.
    pub fn custom(name: impl Into<String>, payload: serde_json::Value) -> Self {
        let name = name.into();
        debug_assert!(
            !name.starts_with(ENGINE_PREFIX),
            "custom event '{name}' uses the reserved engine prefix"
        );
        Event::Custom(CustomEvent { name, payload })
    }

    /// Routing key of the event.
    pub fn name(&self) -> &str {
        match self {
            Event::Phase(phase) => phase.name(),
            Event::Window(window) => window.name(),
            Event::Custom(custom) => &custom.name,
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name() == name
    }

    /// `true` for events in the reserved `engine.` namespace.
    pub fn is_engine_event(&self) -> bool {
        self.name().starts_with(ENGINE_PREFIX)
    }

    pub fn as_phase(&self) -> Option<PhaseEvent> {
        match self {
            Event::Phase(phase) => Some(*phase),
            _ => None,
        }
    }

    pub fn as_window(&self) -> Option<&WindowEvent> {
        match self {
            Event::Window(window) => Some(window),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomEvent> {
        match self {
            Event::Custom(custom) => Some(custom),
            _ => None,
        }
    }
}

impl From<PhaseEvent> for Event {
    fn from(phase: PhaseEvent) -> Self {
        Event::Phase(phase)
    }
}

impl From<WindowEvent> for Event {
    fn from(window: WindowEvent) -> Self {
        Event::Window(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::window::Action;
    use serde_json::json;

    #[test]
    fn test_names_route_by_kind() {
        assert_eq!(Event::from(PhaseEvent::Tick).name(), "engine.tick");
        let key = Event::from(WindowEvent::Key {
            key: 67,
            action: Action::Press,
        });
        assert_eq!(key.name(), "window.key");
        let custom = Event::custom("game.score", json!({ "points": 10 }));
        assert!(custom.has_name("game.score"));
        assert!(!custom.has_name("game"));
    }

    #[test]
    fn test_engine_namespace() {
        assert!(Event::from(PhaseEvent::Present).is_engine_event());
        assert!(!Event::from(WindowEvent::Close).is_engine_event());
        assert!(!Event::custom("engineering.log", json!(null)).is_engine_event());
    }

    #[test]
    fn test_accessors() {
        let ev = Event::from(PhaseEvent::Render);
        assert_eq!(ev.as_phase(), Some(PhaseEvent::Render));
        assert!(ev.as_window().is_none());
        assert!(ev.as_custom().is_none());

        let ev = Event::custom("game.hit", json!([1, 2]));
        assert_eq!(ev.as_custom().map(|c| c.payload.clone()), Some(json!([1, 2])));
    }

    #[test]
    fn test_serialize_custom() {
        let ev = Event::custom("game.score", json!({ "points": 3 }));
        let text = serde_json::to_string(&ev).unwrap();
        assert_eq!(
            text,
            r#"{"Custom":{"name":"game.score","payload":{"points":3}}}"#
        );
    }
}
