//! Frame phase state machine.
//!
//! A frame goes `Start → WaitingForUpdate → WaitingForRender → Start`:
//!
//! - `Start` + `engine.tick`: emit `engine.update`.
//! - `WaitingForUpdate`: collect `engine.om_update.done` and
//!   `engine.render_update.done` in any order; once both arrived emit
//!   `engine.render`.
//! - `WaitingForRender` + `engine.render.done`: emit `engine.present` and go
//!   back to `Start`.
//!
//! Any other `(state, event)` pair leaves the state untouched and emits
//! nothing. In particular a tick that arrives mid-frame is ignored.

use serde::Serialize;

use crate::events::{Event, PhaseEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FrameState {
    #[default]
    Start,
    WaitingForUpdate {
        object_done: bool,
        render_done: bool,
    },
    WaitingForRender,
}

impl FrameState {
    /// Apply `event` and return the next state plus the phase event to queue
    /// (at the front) if the transition produced one.
    pub fn advance(self, event: &Event) -> (FrameState, Option<PhaseEvent>) {
        let Some(phase) = event.as_phase() else {
            return (self, None);
        };

        match (self, phase) {
            (FrameState::Start, PhaseEvent::Tick) => (
                FrameState::WaitingForUpdate {
                    object_done: false,
                    render_done: false,
                },
                Some(PhaseEvent::Update),
            ),
            (FrameState::WaitingForUpdate { render_done, .. }, PhaseEvent::ObjectUpdateDone) => {
                Self::collect_updates(true, render_done)
            }
            (FrameState::WaitingForUpdate { object_done, .. }, PhaseEvent::RenderUpdateDone) => {
                Self::collect_updates(object_done, true)
            }
            (FrameState::WaitingForRender, PhaseEvent::RenderDone) => {
                (FrameState::Start, Some(PhaseEvent::Present))
            }
            (state, _) => (state, None),
        }
    }

    fn collect_updates(object_done: bool, render_done: bool) -> (FrameState, Option<PhaseEvent>) {
        if object_done && render_done {
            (FrameState::WaitingForRender, Some(PhaseEvent::Render))
        } else {
            (
                FrameState::WaitingForUpdate {
                    object_done,
                    render_done,
                },
                None,
            )
        }
    }

    pub fn is_idle(self) -> bool {
        self == FrameState::Start
    }
}
