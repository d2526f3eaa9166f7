//! The engine: dispatchers, producers, and the frame drive loop.
//!
//! The [`Engine`] owns two dispatchers:
//!
//! - the **internal** dispatcher carries phase events (`engine.*`). It is fed
//!   by the internal producer container, which holds the [`TickPacer`].
//! - the **external** dispatcher carries window input and user events. It is
//!   pumped once per frame, when `engine.update` reaches the engine's own
//!   observer, so input is handled before any subsystem updates.
//!
//! The engine's observer ([`FrameSequencer`], class 0) advances the
//! [`FrameState`] machine and queues the next phase event at the front of the
//! internal queue. The [`ObjectManager`] and the [`RendererObserver`] take part
//! from class 1.
//!
//! # Drive loop
//!
//! Each [`Engine::step`] feeds the internal producers (possibly sleeping until
//! the next tick) and drains the internal queue. [`Engine::run`] repeats that
//! until an observer returns [`ObserverSignal::EndLoop`].
//!
//! ```
//! use framepulse::clock::ManualClock;
//! use framepulse::config::EngineConfig;
//! use framepulse::engine::Engine;
//!
//! let mut engine = Engine::with_clock(EngineConfig::new(), ManualClock::new());
//! engine.run_frames(3);
//! assert_eq!(engine.frames_presented(), 3);
//! ```

pub mod frame;
pub mod pacing;

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use log::{debug, error, info, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::dispatcher::{EventDispatcher, EventQueue};
use crate::events::{Event, PhaseEvent};
use crate::objects::ObjectManager;
use crate::observer::{Observer, ObserverHandle, ObserverSignal};
use crate::priority::{ENGINE_CLASS, PipelinePriority};
use crate::producers::{EventProducerContainer, Producer};
use crate::renderer::{HeadlessRenderer, RenderStage, RendererObserver};

pub use frame::FrameState;
pub use pacing::TickPacer;

/// Name of the engine's own observer on the internal dispatcher.
pub const OBSERVER_NAME: &str = "engine.engine";

/// Name of the tick pacer in the internal producer container.
pub const TICK_PRODUCER_NAME: &str = "engine";

/// Events the engine's own observer listens to.
const SEQUENCER_EVENTS: [PhaseEvent; 6] = [
    PhaseEvent::Tick,
    PhaseEvent::Update,
    PhaseEvent::ObjectUpdateDone,
    PhaseEvent::RenderUpdateDone,
    PhaseEvent::RenderDone,
    PhaseEvent::Present,
];

/// The engine's observer: frame state, external input, frame counting.
#[derive(Default)]
pub struct FrameSequencer {
    state: FrameState,
    frames_started: u64,
    frames_presented: u64,
    external: EventDispatcher,
    external_producers: EventProducerContainer,
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frames_started(&self) -> u64 {
        self.frames_started
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn external(&self) -> &EventDispatcher {
        &self.external
    }

    /// Feed external producers without blocking and route everything queued.
    fn pump_external(&mut self) -> usize {
        let fed = self
            .external_producers
            .feed_dispatcher(&mut self.external, false);
        let dispatched = self.external.dispatch();
        if dispatched > 0 {
            trace!("Pumped {} external events ({} fed)", dispatched, fed);
        }
        dispatched
    }

    fn reset(&mut self) {
        self.state = FrameState::Start;
        self.external.drop_queue();
    }
}

impl Observer for FrameSequencer {
    fn on_event(&mut self, event: &Event, queue: &mut EventQueue) -> ObserverSignal {
        match event.as_phase() {
            Some(PhaseEvent::Update) => {
                self.pump_external();
            }
            Some(PhaseEvent::Present) => self.frames_presented += 1,
            _ => {}
        }

        let (next, emitted) = self.state.advance(event);
        if next != self.state {
            trace!("Frame state {:?} -> {:?}", self.state, next);
        }
        if self.state.is_idle() && !next.is_idle() {
            self.frames_started += 1;
        }
        self.state = next;
        if let Some(phase) = emitted {
            queue.push_front(phase);
        }

        if self.external.take_end_request() {
            ObserverSignal::EndLoop
        } else {
            ObserverSignal::Continue
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    internal: EventDispatcher,
    internal_producers: EventProducerContainer,
    sequencer: Rc<RefCell<FrameSequencer>>,
    object_manager: Rc<RefCell<ObjectManager>>,
    renderer: Rc<RefCell<RendererObserver>>,
}

impl Engine {
    /// Engine paced by the system clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Engine paced by `clock`. Subsystems and the tick pacer are wired here;
    /// the first tick period starts on the first [`step`](Self::step).
    pub fn with_clock(config: EngineConfig, clock: impl Clock + 'static) -> Self {
        let tick_seconds = config.tick_seconds();
        let mut internal = EventDispatcher::new();

        let sequencer = Rc::new(RefCell::new(FrameSequencer::new()));
        internal.register_many(
            OBSERVER_NAME,
            SEQUENCER_EVENTS.iter().map(|phase| phase.name()),
            ENGINE_CLASS,
            PipelinePriority::Engine.value(),
            ObserverHandle::new(&sequencer),
            false,
        );

        let object_manager = Rc::new(RefCell::new(
            ObjectManager::new(tick_seconds).with_time_scale(config.time_scale),
        ));
        ObjectManager::subscribe(&object_manager, &mut internal);

        let renderer = Rc::new(RefCell::new(
            RendererObserver::new(HeadlessRenderer, tick_seconds).with_time_scale(config.time_scale),
        ));
        RendererObserver::subscribe(&renderer, &mut internal);

        let mut internal_producers = EventProducerContainer::new();
        let pacer = TickPacer::new(config.tick_period, config.max_consecutive_ticks, clock)
            .start_on_first_feed();
        if !internal_producers.add_producer(TICK_PRODUCER_NAME, pacer) {
            error!("Producer '{}' already present; engine will not tick", TICK_PRODUCER_NAME);
        }

        debug!(
            "Engine wired: tick={:?}, max_consecutive_ticks={}",
            config.tick_period, config.max_consecutive_ticks
        );

        Engine {
            config,
            internal,
            internal_producers,
            sequencer,
            object_manager,
            renderer,
        }
    }

    /// Nothing could ever be routed again: no producers and an empty queue.
    fn is_starved(&self) -> bool {
        if self.internal_producers.is_empty() && self.internal.is_queue_empty() {
            warn!("No internal producers left; stopping the engine loop");
            return true;
        }
        false
    }

    /// One drive-loop iteration: feed internal producers, then drain the
    /// internal queue. Returns how many internal events were routed.
    pub fn step(&mut self, can_block: bool) -> usize {
        let fed = self
            .internal_producers
            .feed_dispatcher(&mut self.internal, can_block);
        let dispatched = self.internal.dispatch();
        trace!("Step: fed {}, dispatched {}", fed, dispatched);
        dispatched
    }

    /// Drive frames until an observer returns [`ObserverSignal::EndLoop`].
    pub fn run(&mut self) {
        while !self.is_starved() {
            self.step(true);
            if self.internal.take_end_request() {
                info!(
                    "Engine loop ended after {} frames",
                    self.frames_presented()
                );
                return;
            }
        }
    }

    /// Drive until `frames` more frames were presented, or until an observer
    /// asks to end. Returns how many frames were presented by this call.
    pub fn run_frames(&mut self, frames: u64) -> u64 {
        let first = self.frames_presented();
        let target = first + frames;
        while self.frames_presented() < target && !self.is_starved() {
            self.step(true);
            if self.internal.take_end_request() {
                info!("Engine loop ended on request");
                break;
            }
        }
        self.frames_presented() - first
    }

    /// Hard reset: drop every pending event and restart the frame protocol.
    pub fn reset(&mut self) {
        self.internal.drop_queue();
        self.internal.take_end_request();
        self.sequencer.borrow_mut().reset();
        debug!("Engine reset");
    }

    pub fn set_renderer(&mut self, stage: impl RenderStage + 'static) {
        self.renderer.borrow_mut().set_stage(stage);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frame_state(&self) -> FrameState {
        self.sequencer.borrow().state()
    }

    pub fn frames_presented(&self) -> u64 {
        self.sequencer.borrow().frames_presented()
    }

    pub fn sequencer(&self) -> Ref<'_, FrameSequencer> {
        self.sequencer.borrow()
    }

    pub fn object_manager(&self) -> Rc<RefCell<ObjectManager>> {
        Rc::clone(&self.object_manager)
    }

    pub fn internal_dispatcher(&self) -> &EventDispatcher {
        &self.internal
    }

    pub fn internal_dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.internal
    }

    pub fn internal_producers_mut(&mut self) -> &mut EventProducerContainer {
        &mut self.internal_producers
    }

    /// Subscribe to an external (window/user) event.
    pub fn register_external_observer(
        &mut self,
        observer_name: &str,
        event_name: &str,
        priority_class: usize,
        priority: usize,
        handle: ObserverHandle,
    ) -> bool {
        self.sequencer.borrow_mut().external.register(
            observer_name,
            event_name,
            priority_class,
            priority,
            handle,
            false,
        )
    }

    pub fn unregister_external_observer(&mut self, observer_name: &str, event_name: &str) -> bool {
        self.sequencer
            .borrow_mut()
            .external
            .unregister(observer_name, event_name)
    }

    /// Add a producer for the external dispatcher, pumped once per frame.
    pub fn add_external_producer(
        &mut self,
        name: impl Into<String>,
        producer: impl Producer + 'static,
    ) -> bool {
        self.sequencer
            .borrow_mut()
            .external_producers
            .add_producer(name, producer)
    }

    pub fn remove_external_producer(&mut self, name: &str) -> bool {
        self.sequencer
            .borrow_mut()
            .external_producers
            .remove_producer(name)
    }

    /// Queue an event for the next external pump.
    pub fn queue_external(&mut self, event: impl Into<Event>) {
        self.sequencer.borrow_mut().external.queue_last(event);
    }
}
