//! Priority event dispatcher.
//!
//! An [`EventDispatcher`] owns, per event name, an ordered set of observer
//! registrations and a FIFO queue of pending events. [`EventDispatcher::dispatch`]
//! drains the queue and routes each event to the observers registered for its
//! name.
//!
//! # Ordering
//!
//! Within one event's observer set, registrations are visited by ascending
//! [`PriorityKey`]; equal keys keep their insertion order. An engine observer
//! in class 0 therefore always runs before any class 1 subsystem observer,
//! whatever order they registered in.
//!
//! # Liveness
//!
//! Observers are held through weak [`ObserverHandle`]s. A registration whose
//! observer has been dropped is discovered when an event is delivered to it,
//! and that single entry is removed. Nothing scans for stale entries eagerly.
//!
//! # Re-entrancy
//!
//! While dispatching, observers get the dispatcher's [`EventQueue`] and may
//! queue more events, which are routed by the same `dispatch` call. They cannot
//! register or unregister on the dispatcher that is delivering to them.

mod queue;

pub use queue::EventQueue;

use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::events::Event;
use crate::observer::{ObserverHandle, ObserverSignal};
use crate::priority::PriorityKey;

/// One observer subscribed to one event.
#[derive(Debug, Clone)]
pub struct Registration {
    pub priority: PriorityKey,
    pub name: String,
    pub handle: ObserverHandle,
}

/// Registrations for one event, sorted by priority then insertion order.
type ObserverSet = SmallVec<[Registration; 4]>;

/// Routes named events to prioritized observers.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    observers: FxHashMap<String, ObserverSet>,
    queue: EventQueue,
    end_requested: bool,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` as `observer_name` for `event_name`.
    ///
    /// With `allow_duplicate == false`, a second registration of the same
    /// observer name for the same event is refused and `false` is returned.
    pub fn register(
        &mut self,
        observer_name: &str,
        event_name: &str,
        priority_class: usize,
        priority: usize,
        handle: ObserverHandle,
        allow_duplicate: bool,
    ) -> bool {
        if !allow_duplicate && self.find(observer_name, event_name).is_some() {
            debug!(
                "Observer '{}' already registered for '{}'; ignoring",
                observer_name, event_name
            );
            return false;
        }

        let key = PriorityKey::pack(priority_class, priority);
        let set = self.observers.entry(event_name.to_string()).or_default();
        insert_sorted(
            set,
            Registration {
                priority: key,
                name: observer_name.to_string(),
                handle,
            },
        );
        debug!(
            "Registered observer '{}' for '{}' (class {}, priority {})",
            observer_name, event_name, priority_class, priority
        );
        true
    }

    /// Register the same observer and priority for several events at once.
    ///
    /// Returns how many registrations were actually inserted.
    pub fn register_many<'a>(
        &mut self,
        observer_name: &str,
        event_names: impl IntoIterator<Item = &'a str>,
        priority_class: usize,
        priority: usize,
        handle: ObserverHandle,
        allow_duplicate: bool,
    ) -> usize {
        let mut inserted = 0;
        for event_name in event_names {
            if self.register(
                observer_name,
                event_name,
                priority_class,
                priority,
                handle.clone(),
                allow_duplicate,
            ) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Remove the first registration of `observer_name` for `event_name`.
    pub fn unregister(&mut self, observer_name: &str, event_name: &str) -> bool {
        let Some(index) = self.find(observer_name, event_name) else {
            return false;
        };
        self.remove_at(event_name, index);
        debug!("Unregistered observer '{}' from '{}'", observer_name, event_name);
        true
    }

    /// Move a registration to a new priority.
    ///
    /// Entries are removed and re-inserted, so a moved entry lands after any
    /// existing entry with the same key. With `include_duplicates`, every
    /// registration under `observer_name` is moved, otherwise only the first.
    pub fn set_priority(
        &mut self,
        observer_name: &str,
        event_name: &str,
        new_priority: PriorityKey,
        include_duplicates: bool,
    ) -> bool {
        let Some(set) = self.observers.get_mut(event_name) else {
            return false;
        };

        let mut moved: SmallVec<[Registration; 2]> = SmallVec::new();
        let mut index = 0;
        while index < set.len() {
            if set[index].name == observer_name {
                moved.push(set.remove(index));
                if !include_duplicates {
                    break;
                }
            } else {
                index += 1;
            }
        }

        if moved.is_empty() {
            return false;
        }

        for mut registration in moved {
            registration.priority = new_priority;
            insert_sorted(set, registration);
        }
        debug!(
            "Observer '{}' on '{}' moved to priority {:?}",
            observer_name,
            event_name,
            new_priority.unpack()
        );
        true
    }

    /// Queue an event behind everything already pending.
    pub fn queue_last(&mut self, event: impl Into<Event>) {
        self.queue.push_back(event);
    }

    /// Queue an event ahead of everything already pending.
    pub fn queue_next(&mut self, event: impl Into<Event>) {
        self.queue.push_front(event);
    }

    /// Drop every pending event.
    pub fn drop_queue(&mut self) {
        if !self.queue.is_empty() {
            debug!("Dropping {} queued events", self.queue.len());
        }
        self.queue.clear();
    }

    /// Route pending events until the queue is empty, including events queued
    /// by observers along the way. Returns how many events were routed.
    pub fn dispatch(&mut self) -> usize {
        self.dispatch_n(usize::MAX)
    }

    /// Route at most `max_count` pending events.
    pub fn dispatch_n(&mut self, max_count: usize) -> usize {
        let mut dispatched = 0;
        while dispatched < max_count {
            let Some(event) = self.queue.pop_front() else {
                break;
            };
            self.dispatch_event(&event);
            dispatched += 1;
        }
        dispatched
    }

    /// Deliver one event to its observers in priority order.
    fn dispatch_event(&mut self, event: &Event) {
        let name = event.name();
        let Some(set) = self.observers.get_mut(name) else {
            trace!("No observers for '{}'; event dropped", name);
            return;
        };

        let queue = &mut self.queue;
        let mut notified = 0;
        let mut end_requested = false;
        let mut index = 0;

        while index < set.len() {
            let Some(observer) = set[index].handle.resolve() else {
                let stale = set.remove(index);
                trace!("Removed stale observer '{}' from '{}'", stale.name, name);
                continue;
            };

            notified += 1;
            trace!("Delivering '{}' to '{}'", name, set[index].name);
            let signal = observer.borrow_mut().on_event(event, queue);
            index += 1;

            match signal {
                ObserverSignal::Continue => {}
                ObserverSignal::EndLoop => end_requested = true,
                ObserverSignal::DropEvent => {
                    trace!("'{}' dropped by '{}'", name, set[index - 1].name);
                    break;
                }
            }
        }

        if set.is_empty() {
            self.observers.remove(name);
        }
        if end_requested {
            debug!("End of loop requested while dispatching '{}'", name);
            self.end_requested = true;
        }
        trace!("'{}' delivered to {} observers", name, notified);
    }

    /// Whether an observer returned [`ObserverSignal::EndLoop`] since the last
    /// [`take_end_request`](Self::take_end_request).
    pub fn end_requested(&self) -> bool {
        self.end_requested
    }

    /// Read and clear the end-of-loop request.
    pub fn take_end_request(&mut self) -> bool {
        std::mem::take(&mut self.end_requested)
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn has_observers(&self, event_name: &str) -> bool {
        self.observers.contains_key(event_name)
    }

    /// Number of registrations for `event_name`, stale ones included.
    pub fn observer_count(&self, event_name: &str) -> usize {
        self.observers.get(event_name).map_or(0, |set| set.len())
    }

    /// Registrations for `event_name` in dispatch order.
    pub fn registrations(&self, event_name: &str) -> impl Iterator<Item = &Registration> {
        self.observers.get(event_name).into_iter().flatten()
    }

    /// Names of all events that currently have an observer set.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.observers.keys().map(String::as_str)
    }

    fn find(&self, observer_name: &str, event_name: &str) -> Option<usize> {
        self.observers
            .get(event_name)?
            .iter()
            .position(|registration| registration.name == observer_name)
    }

    fn remove_at(&mut self, event_name: &str, index: usize) {
        if let Some(set) = self.observers.get_mut(event_name) {
            set.remove(index);
            if set.is_empty() {
                self.observers.remove(event_name);
            }
        }
    }
}

/// Insert after every entry whose key is `<=` the new one (stable multiset).
fn insert_sorted(set: &mut ObserverSet, registration: Registration) {
    let position = set.partition_point(|existing| existing.priority <= registration.priority);
    set.insert(position, registration);
}
