//! Game object ownership and per-tick updates.
//!
//! The [`ObjectManager`] owns every live [`GameObject`] under a unique string
//! key. It is itself an [`Observer`]: subscribed to `engine.update` in the
//! subsystem class, it updates each object once per frame and then reports
//! `engine.om_update.done` so the frame state machine can move on.
//!
//! # Destruction
//!
//! An object asks to be removed by returning [`UpdateResult::Destroy`]. Keys
//! are collected during the pass and removed once the pass is over, so an
//! object is never updated again after it asked to be destroyed.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::dispatcher::{EventDispatcher, EventQueue};
use crate::events::{Event, PhaseEvent, phase};
use crate::frametime::FrameTime;
use crate::observer::{Observer, ObserverHandle, ObserverSignal};
use crate::priority::{PipelinePriority, SUBSYSTEM_CLASS};

/// Name under which the manager registers with the internal dispatcher.
pub const OBSERVER_NAME: &str = "engine.object_manager";

/// Outcome of a single object update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateResult {
    #[default]
    Normal,
    /// Remove the object after the current pass.
    Destroy,
}

/// Anything the object manager can own and tick.
pub trait GameObject {
    fn update(&mut self, time: &FrameTime) -> UpdateResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("object assigned to key '{0}' already exists")]
    KeyExists(String),
}

/// Owns live game objects and updates them on `engine.update`.
pub struct ObjectManager {
    objects: FxHashMap<String, Box<dyn GameObject>>,
    time: FrameTime,
    tick_seconds: f32,
    next_sequence: u64,
}

impl ObjectManager {
    /// `tick_seconds` is the fixed simulation step applied per update.
    pub fn new(tick_seconds: f32) -> Self {
        ObjectManager {
            objects: FxHashMap::default(),
            time: FrameTime::default(),
            tick_seconds,
            next_sequence: 0,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time = self.time.with_time_scale(time_scale);
        self
    }

    /// Create a shared manager already subscribed to `engine.update`.
    pub fn create(dispatcher: &mut EventDispatcher, tick_seconds: f32) -> Rc<RefCell<Self>> {
        let manager = Rc::new(RefCell::new(Self::new(tick_seconds)));
        Self::subscribe(&manager, dispatcher);
        manager
    }

    /// Register `this` for `engine.update` in the subsystem class.
    pub fn subscribe(this: &Rc<RefCell<Self>>, dispatcher: &mut EventDispatcher) -> bool {
        dispatcher.register(
            OBSERVER_NAME,
            phase::UPDATE,
            SUBSYSTEM_CLASS,
            PipelinePriority::ObjectManager.value(),
            ObserverHandle::new(this),
            false,
        )
    }

    /// Take ownership of `object` under `key`.
    ///
    /// Keys are never made unique on the caller's behalf: a collision is an
    /// error and the new object is dropped.
    pub fn create_object(
        &mut self,
        key: impl Into<String>,
        object: impl GameObject + 'static,
    ) -> Result<(), ObjectError> {
        let key = key.into();
        if self.objects.contains_key(&key) {
            return Err(ObjectError::KeyExists(key));
        }
        debug!("Created object '{}'", key);
        self.objects.insert(key, Box::new(object));
        Ok(())
    }

    /// Take ownership of `object` under a fresh `{prefix}_{n}` key and return
    /// the key. The sequence belongs to this manager.
    pub fn spawn(&mut self, prefix: &str, object: impl GameObject + 'static) -> String {
        let key = loop {
            let candidate = format!("{}_{}", prefix, self.next_sequence);
            self.next_sequence += 1;
            if !self.objects.contains_key(&candidate) {
                break candidate;
            }
        };
        trace!("Spawned object '{}'", key);
        self.objects.insert(key.clone(), Box::new(object));
        key
    }

    pub fn remove_object(&mut self, key: &str) -> bool {
        self.objects.remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&dyn GameObject> {
        self.objects.get(key).map(|object| object.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// Keys of all live objects, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn frame_time(&self) -> &FrameTime {
        &self.time
    }

    /// Advance simulation time one step and update every object once.
    ///
    /// Returns how many objects were destroyed.
    pub fn update(&mut self) -> usize {
        self.time.advance(self.tick_seconds);

        let time = self.time;
        let destroyed: Vec<String> = self
            .objects
            .iter_mut()
            .filter_map(|(key, object)| {
                (object.update(&time) == UpdateResult::Destroy).then(|| key.clone())
            })
            .collect();

        for key in &destroyed {
            self.objects.remove(key);
        }
        if !destroyed.is_empty() {
            debug!(
                "Frame {}: destroyed {} objects, {} alive",
                time.frame_count,
                destroyed.len(),
                self.objects.len()
            );
        }
        destroyed.len()
    }
}

impl Observer for ObjectManager {
    fn on_event(&mut self, event: &Event, queue: &mut EventQueue) -> ObserverSignal {
        if event.as_phase() != Some(PhaseEvent::Update) {
            return ObserverSignal::Continue;
        }

        self.update();
        queue.push_front(PhaseEvent::ObjectUpdateDone);
        ObserverSignal::Continue
    }
}
