//! Two-level observer priorities packed into one sortable word.
//!
//! A [`PriorityKey`] combines a coarse *priority class* with a fine-grained
//! *priority* so that a fixed structural order can be enforced by class
//! ("engine core before subsystems before user code") while the priority stays
//! free for tuning inside a class.
//!
//! The class occupies the high half of a `usize`, the priority the low half.
//! Both halves are clamped to [`PriorityKey::HALF_MAX`] before packing, so
//! packing is lossy only by clamping, never by truncation.
//!
//! # Example
//!
//! ```
//! use framepulse::priority::PriorityKey;
//!
//! let engine = PriorityKey::pack(0, 500);
//! let user = PriorityKey::pack(1, 0);
//! assert!(engine < user);
//! assert_eq!(user.unpack(), (1, 0));
//! ```

use serde::Serialize;

/// Priority class reserved for the engine's own phase-advancing observer.
pub const ENGINE_CLASS: usize = 0;

/// Priority class for engine subsystems (object manager, renderer) and user code.
pub const SUBSYSTEM_CLASS: usize = 1;

const HALF_BITS: u32 = usize::BITS / 2;
const LOW_MASK: usize = (1usize << HALF_BITS) - 1;

/// Packed `(priority_class, priority)` pair. Lower keys are dispatched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct PriorityKey(usize);

impl PriorityKey {
    /// Largest value representable in either half.
    pub const HALF_MAX: usize = LOW_MASK;

    /// Pack a class and a priority, clamping each to [`Self::HALF_MAX`].
    pub fn pack(priority_class: usize, priority: usize) -> Self {
        let class = priority_class.min(LOW_MASK);
        let prio = priority.min(LOW_MASK);
        PriorityKey((class << HALF_BITS) | prio)
    }

    /// Split the key back into `(priority_class, priority)`.
    pub fn unpack(self) -> (usize, usize) {
        (self.0 >> HALF_BITS, self.0 & LOW_MASK)
    }

    /// Priority class half of the key.
    pub fn class(self) -> usize {
        self.unpack().0
    }

    /// Fine priority half of the key.
    pub fn priority(self) -> usize {
        self.unpack().1
    }

    /// Raw packed value.
    pub fn raw(self) -> usize {
        self.0
    }

    /// Wrap an already packed value.
    pub fn from_raw(raw: usize) -> Self {
        PriorityKey(raw)
    }
}

/// Fine priorities of the built-in pipeline observers.
///
/// These are used inside their class; user observers in the subsystem class
/// that want to run after the renderer should pick values above
/// `PipelinePriority::Renderer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelinePriority {
    Engine = 0,
    ObjectManager = 100,
    Renderer = 200,
}

impl PipelinePriority {
    pub fn value(self) -> usize {
        self as usize
    }
}
