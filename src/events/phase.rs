//! Engine phase events.
//!
//! One frame is driven through its stages by these events. The tick pacer
//! produces [`PhaseEvent::Tick`]; every other phase event is synthesized by
//! the frame state machine or by the subsystem that finished its part:
//!
//! ```text
//! engine.tick
//!   -> engine.update
//!        -> engine.om_update.done      (object manager)
//!        -> engine.render_update.done  (renderer)
//!   -> engine.render
//!        -> engine.render.done         (renderer)
//!   -> engine.present
//! ```
//!
//! # Related
//!
//! - [`crate::engine::frame::FrameState`] – the state machine consuming these
//! - [`crate::engine::pacing::TickPacer`] – the producer of `engine.tick`

use serde::Serialize;

pub const TICK: &str = "engine.tick";
pub const UPDATE: &str = "engine.update";
pub const OBJECT_UPDATE_DONE: &str = "engine.om_update.done";
pub const RENDER_UPDATE_DONE: &str = "engine.render_update.done";
pub const RENDER: &str = "engine.render";
pub const RENDER_DONE: &str = "engine.render.done";
pub const PRESENT: &str = "engine.present";

/// The fixed set of events that move a frame through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhaseEvent {
    Tick,
    Update,
    ObjectUpdateDone,
    RenderUpdateDone,
    Render,
    RenderDone,
    Present,
}

impl PhaseEvent {
    /// Every phase event, in the order a frame sees them.
    pub const ALL: [PhaseEvent; 7] = [
        PhaseEvent::Tick,
        PhaseEvent::Update,
        PhaseEvent::ObjectUpdateDone,
        PhaseEvent::RenderUpdateDone,
        PhaseEvent::Render,
        PhaseEvent::RenderDone,
        PhaseEvent::Present,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PhaseEvent::Tick => TICK,
            PhaseEvent::Update => UPDATE,
            PhaseEvent::ObjectUpdateDone => OBJECT_UPDATE_DONE,
            PhaseEvent::RenderUpdateDone => RENDER_UPDATE_DONE,
            PhaseEvent::Render => RENDER,
            PhaseEvent::RenderDone => RENDER_DONE,
            PhaseEvent::Present => PRESENT,
        }
    }

    /// Look up a phase event by its routing name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_engine_namespaced_and_unique() {
        let mut names: Vec<&str> = PhaseEvent::ALL.iter().map(|p| p.name()).collect();
        assert!(names.iter().all(|n| n.starts_with("engine.")));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PhaseEvent::ALL.len());
    }

    #[test]
    fn test_from_name() {
        for phase in PhaseEvent::ALL {
            assert_eq!(PhaseEvent::from_name(phase.name()), Some(phase));
        }
        assert_eq!(PhaseEvent::from_name("engine.nope"), None);
    }
}
