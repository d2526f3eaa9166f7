//! Simulation time as seen by game objects.
//!
//! The object manager advances a [`FrameTime`] by one fixed tick period per
//! `engine.update`, applying `time_scale`. Game objects read it during their
//! update; they never look at the wall clock.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameTime {
    /// Scaled seconds since the first update.
    pub elapsed: f32,
    /// Scaled seconds covered by the current update.
    pub delta: f32,
    pub time_scale: f32,
    /// Number of updates so far.
    pub frame_count: u64,
}

impl Default for FrameTime {
    fn default() -> Self {
        FrameTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl FrameTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Advance by the unscaled step `dt` (seconds).
    pub fn advance(&mut self, dt: f32) {
        let scaled_dt = dt * self.time_scale;
        self.elapsed += scaled_dt;
        self.delta = scaled_dt;
        self.frame_count += 1;
    }
}
