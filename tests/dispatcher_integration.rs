//! Dispatcher integration tests: ordering, propagation, liveness, queueing.

use std::cell::RefCell;
use std::rc::Rc;

use framepulse::dispatcher::EventDispatcher;
use framepulse::events::{Event, PhaseEvent};
use framepulse::observer::{ObserverHandle, ObserverSignal, SharedObserver, observer_fn};
use framepulse::priority::PriorityKey;

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(log: &Log, label: &str, signal: ObserverSignal) -> SharedObserver {
    let log = Rc::clone(log);
    let label = label.to_string();
    observer_fn(move |event, _| {
        log.borrow_mut().push(format!("{}:{}", label, event.name()));
        signal
    })
}

fn custom(name: &str) -> Event {
    Event::custom(name, serde_json::Value::Null)
}

#[test]
fn class_beats_priority_whatever_the_registration_order() {
    // (label, class, priority)
    let entries = [("a", 1, 0), ("b", 0, 900), ("c", 1, 5), ("d", 0, 1)];
    let permutations = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];

    for order in permutations {
        let log: Log = Rc::default();
        let mut dispatcher = EventDispatcher::new();
        let mut keep = Vec::new();
        for index in order {
            let (label, class, priority) = entries[index];
            let observer = recorder(&log, label, ObserverSignal::Continue);
            dispatcher.register(label, "game.ping", class, priority, ObserverHandle::from_shared(&observer), false);
            keep.push(observer);
        }

        dispatcher.queue_last(custom("game.ping"));
        dispatcher.dispatch();
        assert_eq!(
            *log.borrow(),
            ["d:game.ping", "b:game.ping", "a:game.ping", "c:game.ping"],
            "registration order {:?}",
            order
        );
    }
}

#[test]
fn equal_priorities_keep_insertion_order() {
    let log: Log = Rc::default();
    let mut dispatcher = EventDispatcher::new();
    let first = recorder(&log, "first", ObserverSignal::Continue);
    let second = recorder(&log, "second", ObserverSignal::Continue);
    dispatcher.register("first", "game.ping", 1, 3, ObserverHandle::from_shared(&first), false);
    dispatcher.register("second", "game.ping", 1, 3, ObserverHandle::from_shared(&second), false);

    dispatcher.queue_last(custom("game.ping"));
    dispatcher.dispatch();
    assert_eq!(*log.borrow(), ["first:game.ping", "second:game.ping"]);
}

#[test]
fn drop_event_halts_propagation_for_that_event_only() {
    let log: Log = Rc::default();
    let mut dispatcher = EventDispatcher::new();
    let high = recorder(&log, "high", ObserverSignal::DropEvent);
    let low = recorder(&log, "low", ObserverSignal::Continue);
    dispatcher.register("high", "game.ping", 1, 0, ObserverHandle::from_shared(&high), false);
    dispatcher.register("low", "game.ping", 1, 1, ObserverHandle::from_shared(&low), false);
    dispatcher.register("low", "game.pong", 1, 1, ObserverHandle::from_shared(&low), false);

    dispatcher.queue_last(custom("game.ping"));
    dispatcher.queue_last(custom("game.pong"));
    assert_eq!(dispatcher.dispatch(), 2);
    assert_eq!(*log.borrow(), ["high:game.ping", "low:game.pong"]);
}

#[test]
fn stale_observer_is_cleaned_up_on_delivery() {
    let log: Log = Rc::default();
    let mut dispatcher = EventDispatcher::new();
    let gone = recorder(&log, "gone", ObserverSignal::Continue);
    let alive = recorder(&log, "alive", ObserverSignal::Continue);
    dispatcher.register("gone", "game.ping", 1, 0, ObserverHandle::from_shared(&gone), false);
    dispatcher.register("alive", "game.ping", 1, 1, ObserverHandle::from_shared(&alive), false);
    drop(gone);

    // still listed until an event reaches it
    assert_eq!(dispatcher.observer_count("game.ping"), 2);

    dispatcher.queue_last(custom("game.ping"));
    dispatcher.dispatch();
    assert_eq!(*log.borrow(), ["alive:game.ping"]);
    assert_eq!(dispatcher.observer_count("game.ping"), 1);
    assert!(!dispatcher.unregister("gone", "game.ping"));
    assert!(dispatcher.unregister("alive", "game.ping"));
    assert!(!dispatcher.has_observers("game.ping"));
}

#[test]
fn queue_last_and_queue_next_ordering() {
    let log: Log = Rc::default();
    let mut dispatcher = EventDispatcher::new();
    let observer = recorder(&log, "o", ObserverSignal::Continue);
    for name in ["game.e1", "game.e2"] {
        dispatcher.register("o", name, 1, 0, ObserverHandle::from_shared(&observer), false);
    }

    dispatcher.queue_last(custom("game.e1"));
    dispatcher.queue_last(custom("game.e2"));
    dispatcher.dispatch();
    assert_eq!(*log.borrow(), ["o:game.e1", "o:game.e2"]);

    log.borrow_mut().clear();
    dispatcher.queue_last(custom("game.e1"));
    dispatcher.queue_next(custom("game.e2"));
    dispatcher.dispatch();
    assert_eq!(*log.borrow(), ["o:game.e2", "o:game.e1"]);
}

#[test]
fn events_queued_by_observers_are_routed_in_the_same_dispatch() {
    let log: Log = Rc::default();
    let mut dispatcher = EventDispatcher::new();
    let chain = observer_fn(|event, queue| {
        if event.as_phase() == Some(PhaseEvent::Tick) {
            queue.push_front(PhaseEvent::Update);
        }
        ObserverSignal::Continue
    });
    let sink = recorder(&log, "sink", ObserverSignal::Continue);
    dispatcher.register("chain", "engine.tick", 0, 0, ObserverHandle::new(&chain), false);
    dispatcher.register("sink", "engine.update", 1, 0, ObserverHandle::from_shared(&sink), false);
    dispatcher.register("sink", "game.after", 1, 0, ObserverHandle::from_shared(&sink), false);

    dispatcher.queue_last(PhaseEvent::Tick);
    dispatcher.queue_last(custom("game.after"));
    assert_eq!(dispatcher.dispatch(), 3);
    assert_eq!(*log.borrow(), ["sink:engine.update", "sink:game.after"]);
}

#[test]
fn dispatch_n_leaves_the_rest_pending() {
    let mut dispatcher = EventDispatcher::new();
    for _ in 0..5 {
        dispatcher.queue_last(custom("game.nobody"));
    }
    assert_eq!(dispatcher.dispatch_n(2), 2);
    assert_eq!(dispatcher.queued_len(), 3);
    assert_eq!(dispatcher.dispatch(), 3);
    assert!(dispatcher.is_queue_empty());
}

#[test]
fn set_priority_moves_an_observer() {
    let log: Log = Rc::default();
    let mut dispatcher = EventDispatcher::new();
    let a = recorder(&log, "a", ObserverSignal::Continue);
    let b = recorder(&log, "b", ObserverSignal::Continue);
    dispatcher.register("a", "game.ping", 1, 0, ObserverHandle::from_shared(&a), false);
    dispatcher.register("b", "game.ping", 1, 1, ObserverHandle::from_shared(&b), false);

    assert!(dispatcher.set_priority("a", "game.ping", PriorityKey::pack(1, 2), false));
    dispatcher.queue_last(custom("game.ping"));
    dispatcher.dispatch();
    assert_eq!(*log.borrow(), ["b:game.ping", "a:game.ping"]);
}

#[test]
fn end_loop_is_latched_and_taken_once() {
    let mut dispatcher = EventDispatcher::new();
    let quitter = observer_fn(|_, _| ObserverSignal::EndLoop);
    dispatcher.register("quit", "window.close", 1, 0, ObserverHandle::new(&quitter), false);
    dispatcher.queue_last(framepulse::events::WindowEvent::Close);
    dispatcher.dispatch();

    assert!(dispatcher.end_requested());
    assert!(dispatcher.take_end_request());
    assert!(!dispatcher.take_end_request());
}
