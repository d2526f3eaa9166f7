//! Event producers and the container that feeds them into a dispatcher.
//!
//! A [`Producer`] is a direct source of events for an
//! [`EventDispatcher`]: the tick pacer, the OS window, a network socket. Once
//! per drive-loop iteration the engine asks every producer in a container to
//! push whatever it has.
//!
//! Submodules:
//! - [`window`] – producer draining window events sent from another thread

pub mod window;

use log::debug;

use crate::dispatcher::EventDispatcher;

/// Source of events for a dispatcher.
pub trait Producer {
    /// Push pending events into `dispatcher` and return how many were pushed.
    ///
    /// `can_block` is advisory: only when it is `true` may the producer wait
    /// (sleep until its next scheduled event, wait for an external source).
    /// When `false` it must return immediately with whatever is available,
    /// possibly nothing.
    fn feed(&mut self, dispatcher: &mut EventDispatcher, can_block: bool) -> usize;
}

/// Named collection of producers, fed in insertion order.
#[derive(Default)]
pub struct EventProducerContainer {
    producers: Vec<(String, Box<dyn Producer>)>,
}

impl EventProducerContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a producer under `name`. Returns `false` if the name is taken.
    pub fn add_producer(&mut self, name: impl Into<String>, producer: impl Producer + 'static) -> bool {
        let name = name.into();
        if self.contains(&name) {
            debug!("Producer '{}' already present", name);
            return false;
        }
        debug!("Added producer '{}'", name);
        self.producers.push((name, Box::new(producer)));
        true
    }

    pub fn remove_producer(&mut self, name: &str) -> bool {
        let before = self.producers.len();
        self.producers.retain(|(existing, _)| existing != name);
        let removed = self.producers.len() != before;
        if removed {
            debug!("Removed producer '{}'", name);
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.producers.iter().any(|(existing, _)| existing == name)
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// Ask every producer to feed `dispatcher`; returns the total fed.
    pub fn feed_dispatcher(&mut self, dispatcher: &mut EventDispatcher, can_block: bool) -> usize {
        self.producers
            .iter_mut()
            .map(|(_, producer)| producer.feed(dispatcher, can_block))
            .sum()
    }
}
