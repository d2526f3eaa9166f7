//! Observer contract and weak observer handles.
//!
//! Observers are owned by whoever created them (a subsystem, the engine, user
//! code) as `Rc<RefCell<_>>`. A dispatcher only ever stores an
//! [`ObserverHandle`], a weak reference that is resolved at dispatch time. When
//! the owner drops its observer the handle stops resolving and the dispatcher
//! removes the registration the next time it tries to deliver to it.
//!
//! # Example
//!
//! ```
//! use framepulse::dispatcher::EventDispatcher;
//! use framepulse::events::{Event, PhaseEvent};
//! use framepulse::observer::{observer_fn, ObserverHandle, ObserverSignal};
//!
//! let mut dispatcher = EventDispatcher::new();
//! let logger = observer_fn(|event, _queue| {
//!     println!("got {}", event.name());
//!     ObserverSignal::Continue
//! });
//! dispatcher.register("logger", "engine.tick", 1, 0, ObserverHandle::new(&logger), false);
//! dispatcher.queue_last(Event::from(PhaseEvent::Tick));
//! assert_eq!(dispatcher.dispatch(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dispatcher::EventQueue;
use crate::events::Event;

/// What an observer wants the dispatcher to do after it handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObserverSignal {
    /// Keep delivering the event to lower-priority observers.
    #[default]
    Continue,
    /// Stop delivering this event; lower-priority observers never see it.
    DropEvent,
    /// Keep delivering, and ask the drive loop to stop once the queue drains.
    EndLoop,
}

/// Receives named events from a dispatcher.
///
/// `queue` is the pending queue of the dispatcher currently delivering, so an
/// observer can schedule follow-up events with
/// [`EventQueue::push_back`] or preempt with [`EventQueue::push_front`].
///
/// A panic inside `on_event` is not caught by the dispatcher.
pub trait Observer {
    fn on_event(&mut self, event: &Event, queue: &mut EventQueue) -> ObserverSignal;
}

/// Strong, owning reference to an observer.
pub type SharedObserver = Rc<RefCell<dyn Observer>>;

/// Weak reference to an observer, resolved only when an event is delivered.
#[derive(Clone)]
pub struct ObserverHandle(Weak<RefCell<dyn Observer>>);

impl ObserverHandle {
    /// Create a handle to a concrete observer without taking ownership.
    pub fn new<T: Observer + 'static>(observer: &Rc<RefCell<T>>) -> Self {
        let shared: SharedObserver = observer.clone();
        ObserverHandle(Rc::downgrade(&shared))
    }

    pub fn from_shared(observer: &SharedObserver) -> Self {
        ObserverHandle(Rc::downgrade(observer))
    }

    /// Upgrade to a live observer, or `None` once the owner released it.
    pub fn resolve(&self) -> Option<SharedObserver> {
        self.0.upgrade()
    }

    pub fn is_expired(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("expired", &self.is_expired())
            .finish()
    }
}

/// Adapter turning a closure into an [`Observer`].
pub struct FnObserver<F>(F);

impl<F> Observer for FnObserver<F>
where
    F: FnMut(&Event, &mut EventQueue) -> ObserverSignal,
{
    fn on_event(&mut self, event: &Event, queue: &mut EventQueue) -> ObserverSignal {
        (self.0)(event, queue)
    }
}

/// Wrap a closure as a shareable observer. The caller keeps the returned `Rc`
/// alive for as long as the observer should receive events.
pub fn observer_fn<F>(f: F) -> Rc<RefCell<FnObserver<F>>>
where
    F: FnMut(&Event, &mut EventQueue) -> ObserverSignal + 'static,
{
    Rc::new(RefCell::new(FnObserver(f)))
}
