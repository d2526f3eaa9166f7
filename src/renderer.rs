//! Renderer contract.
//!
//! Drawing is not done here. A backend implements [`RenderStage`] and the
//! engine wraps it in a [`RendererObserver`], which takes part in the frame
//! protocol on the internal dispatcher:
//!
//! - `engine.update` → [`RenderStage::update`], then `engine.render_update.done`
//! - `engine.render` → [`RenderStage::render`], then `engine.render.done`
//! - `engine.present` → [`RenderStage::present`]
//!
//! Completion events are queued at the front so they are handled before any
//! tick that is already waiting.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dispatcher::{EventDispatcher, EventQueue};
use crate::events::{Event, PhaseEvent, phase};
use crate::frametime::FrameTime;
use crate::observer::{Observer, ObserverHandle, ObserverSignal};
use crate::priority::{PipelinePriority, SUBSYSTEM_CLASS};

/// Name under which the renderer registers with the internal dispatcher.
pub const OBSERVER_NAME: &str = "engine.renderer";

/// Backend hooks for the three render phases of a frame.
pub trait RenderStage {
    /// Prepare per-frame render state (camera, uniforms).
    fn update(&mut self, time: &FrameTime);
    /// Issue draw calls.
    fn render(&mut self);
    /// Swap buffers / hand the frame to the display.
    fn present(&mut self);
}

/// Render stage that draws nothing. Lets frames complete without a GPU.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessRenderer;

impl RenderStage for HeadlessRenderer {
    fn update(&mut self, _time: &FrameTime) {}
    fn render(&mut self) {}
    fn present(&mut self) {}
}

/// Observer adapter driving a [`RenderStage`] from phase events.
pub struct RendererObserver {
    stage: Box<dyn RenderStage>,
    time: FrameTime,
    tick_seconds: f32,
}

impl RendererObserver {
    pub fn new(stage: impl RenderStage + 'static, tick_seconds: f32) -> Self {
        RendererObserver {
            stage: Box::new(stage),
            time: FrameTime::default(),
            tick_seconds,
        }
    }

    /// Scale render time the same way simulation time is scaled.
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time = self.time.with_time_scale(time_scale);
        self
    }

    pub fn frame_time(&self) -> &FrameTime {
        &self.time
    }

    /// Swap the backend. Render time keeps running.
    pub fn set_stage(&mut self, stage: impl RenderStage + 'static) {
        self.stage = Box::new(stage);
    }

    /// Register `this` for the render phase events in the subsystem class.
    pub fn subscribe(this: &Rc<RefCell<Self>>, dispatcher: &mut EventDispatcher) -> usize {
        dispatcher.register_many(
            OBSERVER_NAME,
            [phase::UPDATE, phase::RENDER, phase::PRESENT],
            SUBSYSTEM_CLASS,
            PipelinePriority::Renderer.value(),
            ObserverHandle::new(this),
            false,
        )
    }
}

impl Observer for RendererObserver {
    fn on_event(&mut self, event: &Event, queue: &mut EventQueue) -> ObserverSignal {
        match event.as_phase() {
            Some(PhaseEvent::Update) => {
                self.time.advance(self.tick_seconds);
                self.stage.update(&self.time);
                queue.push_front(PhaseEvent::RenderUpdateDone);
            }
            Some(PhaseEvent::Render) => {
                self.stage.render();
                queue.push_front(PhaseEvent::RenderDone);
            }
            Some(PhaseEvent::Present) => self.stage.present(),
            _ => {}
        }
        ObserverSignal::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Calls(Rc<RefCell<Vec<&'static str>>>);

    impl RenderStage for Calls {
        fn update(&mut self, _time: &FrameTime) {
            self.0.borrow_mut().push("update");
        }
        fn render(&mut self) {
            self.0.borrow_mut().push("render");
        }
        fn present(&mut self) {
            self.0.borrow_mut().push("present");
        }
    }

    #[test]
    fn test_phases_call_stage_and_report_done() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut renderer = RendererObserver::new(Calls(Rc::clone(&calls)), 0.016);
        let mut queue = EventQueue::new();

        renderer.on_event(&Event::from(PhaseEvent::Update), &mut queue);
        renderer.on_event(&Event::from(PhaseEvent::Render), &mut queue);
        renderer.on_event(&Event::from(PhaseEvent::Present), &mut queue);
        renderer.on_event(&Event::from(PhaseEvent::Tick), &mut queue);

        assert_eq!(*calls.borrow(), ["update", "render", "present"]);
        let queued: Vec<&str> = queue.iter().map(Event::name).collect();
        assert_eq!(queued, [phase::RENDER_DONE, phase::RENDER_UPDATE_DONE]);
    }

    #[test]
    fn test_time_scale_applies_to_render_time() {
        let mut renderer = RendererObserver::new(HeadlessRenderer, 0.016).with_time_scale(0.5);
        let mut queue = EventQueue::new();
        renderer.on_event(&Event::from(PhaseEvent::Update), &mut queue);
        assert!((renderer.frame_time().delta - 0.008).abs() < 1e-6);
        assert_eq!(renderer.frame_time().frame_count, 1);
    }

    #[test]
    fn test_subscribe_registers_three_phases() {
        let mut dispatcher = EventDispatcher::new();
        let renderer = Rc::new(RefCell::new(RendererObserver::new(HeadlessRenderer, 0.016)));
        assert_eq!(RendererObserver::subscribe(&renderer, &mut dispatcher), 3);
        assert!(dispatcher.has_observers(phase::UPDATE));
        assert!(dispatcher.has_observers(phase::RENDER));
        assert!(dispatcher.has_observers(phase::PRESENT));
        assert!(!dispatcher.has_observers(phase::TICK));
    }
}
