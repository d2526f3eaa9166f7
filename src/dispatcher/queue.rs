use std::collections::VecDeque;

use crate::events::Event;

/// Pending, not yet dispatched events.
///
/// Events normally arrive at the back. Urgent events (a phase completion that
/// must be handled before anything else queued this tick) go to the front.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append in arrival order.
    pub fn push_back(&mut self, event: impl Into<Event>) {
        self.events.push_back(event.into());
    }

    /// Insert ahead of every event already queued.
    pub fn push_front(&mut self, event: impl Into<Event>) {
        self.events.push_front(event.into());
    }

    pub fn pop_front(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Pending events, front first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}
