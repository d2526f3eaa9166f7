//! framepulse library.
//!
//! Priority event dispatch and fixed-cadence frame pacing for a game engine.
//! Exposes the dispatcher, producers, object manager and engine loop for use
//! in integration tests and as a reusable library.

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod events;
pub mod frametime;
pub mod game;
pub mod objects;
pub mod observer;
pub mod priority;
pub mod producers;
pub mod renderer;
