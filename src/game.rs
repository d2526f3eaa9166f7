//! Demo game: bullets fired from window input.
//!
//! - `C` (or a `game.spawn` event) fires bullets with a small random spread.
//! - `Q` or closing the window ends the loop.
//!
//! Bullets are [`GameObject`]s owned by the engine's [`ObjectManager`]; they
//! fly until they are `max_distance` away from where they were fired and then
//! ask to be destroyed.

use std::cell::RefCell;
use std::rc::Rc;

use fastrand::Rng;
use log::{debug, info};
use serde::Deserialize;

use crate::dispatcher::EventQueue;
use crate::engine::Engine;
use crate::events::window::{self, keys};
use crate::events::{Event, WindowEvent};
use crate::frametime::FrameTime;
use crate::objects::{GameObject, ObjectManager, UpdateResult};
use crate::observer::{Observer, ObserverHandle, ObserverSignal};
use crate::renderer::RenderStage;

/// Custom event asking the spawner to fire `{"count": n}` bullets.
pub const SPAWN_EVENT: &str = "game.spawn";

const GAME_CLASS: usize = 1;
const BULLET_PREFIX: &str = "bullet";
const BULLET_SPEED: f32 = 240.0;
const BULLET_SPREAD: f32 = 30.0;
const BULLET_GRAVITY: f32 = 20.0;
const BULLET_MAX_DISTANCE: f32 = 400.0;

/// A projectile with constant acceleration.
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub acceleration: [f32; 2],
    origin: [f32; 2],
    max_distance: f32,
}

impl Bullet {
    pub fn new(position: [f32; 2], velocity: [f32; 2], acceleration: [f32; 2], max_distance: f32) -> Self {
        Bullet {
            position,
            velocity,
            acceleration,
            origin: position,
            max_distance,
        }
    }

    pub fn distance_travelled(&self) -> f32 {
        let dx = self.position[0] - self.origin[0];
        let dy = self.position[1] - self.origin[1];
        (dx * dx + dy * dy).sqrt()
    }
}

impl GameObject for Bullet {
    fn update(&mut self, time: &FrameTime) -> UpdateResult {
        let dt = time.delta;
        for axis in 0..2 {
            self.position[axis] += self.velocity[axis] * dt;
            self.velocity[axis] += self.acceleration[axis] * dt;
        }
        if self.distance_travelled() >= self.max_distance {
            UpdateResult::Destroy
        } else {
            UpdateResult::Normal
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpawnRequest {
    #[serde(default = "one")]
    count: usize,
}

fn one() -> usize {
    1
}

/// Sample a random f32 in the range [min, max].
#[inline]
fn random_f32_range(rng: &mut Rng, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range < f32::EPSILON {
        return min;
    }
    min + rng.f32() * range
}

/// Fires bullets into the object manager.
pub struct BulletSpawner {
    objects: Rc<RefCell<ObjectManager>>,
    rng: Rng,
    fired: u64,
}

impl BulletSpawner {
    pub fn new(objects: Rc<RefCell<ObjectManager>>, rng: Rng) -> Self {
        BulletSpawner {
            objects,
            rng,
            fired: 0,
        }
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Fire `count` bullets from the origin, upwards, with random spread.
    pub fn fire(&mut self, count: usize) {
        let mut objects = self.objects.borrow_mut();
        for _ in 0..count {
            let spread = random_f32_range(&mut self.rng, -BULLET_SPREAD, BULLET_SPREAD);
            let bullet = Bullet::new(
                [0.0, 0.0],
                [spread, -BULLET_SPEED],
                [0.0, BULLET_GRAVITY],
                BULLET_MAX_DISTANCE,
            );
            let key = objects.spawn(BULLET_PREFIX, bullet);
            debug!("Fired {}", key);
        }
        self.fired += count as u64;
    }
}

impl Observer for BulletSpawner {
    fn on_event(&mut self, event: &Event, _queue: &mut EventQueue) -> ObserverSignal {
        match event {
            Event::Window(window) if window.is_key_press(keys::C) => self.fire(1),
            Event::Custom(custom) if custom.name == SPAWN_EVENT => {
                match serde_json::from_value::<SpawnRequest>(custom.payload.clone()) {
                    Ok(request) => self.fire(request.count),
                    Err(err) => debug!("Ignoring malformed {}: {}", SPAWN_EVENT, err),
                }
            }
            _ => {}
        }
        ObserverSignal::Continue
    }
}

/// Ends the loop on `Q` or window close.
#[derive(Debug, Default)]
pub struct QuitObserver;

impl Observer for QuitObserver {
    fn on_event(&mut self, event: &Event, _queue: &mut EventQueue) -> ObserverSignal {
        match event.as_window() {
            Some(WindowEvent::Close) => ObserverSignal::EndLoop,
            Some(window) if window.is_key_press(keys::Q) => ObserverSignal::EndLoop,
            _ => ObserverSignal::Continue,
        }
    }
}

/// Render stage that only logs, every `every` presented frames.
pub struct LogRenderer {
    every: u64,
    presented: u64,
    last_time: FrameTime,
}

impl LogRenderer {
    pub fn new(every: u64) -> Self {
        LogRenderer {
            every: every.max(1),
            presented: 0,
            last_time: FrameTime::default(),
        }
    }
}

impl RenderStage for LogRenderer {
    fn update(&mut self, time: &FrameTime) {
        self.last_time = *time;
    }

    fn render(&mut self) {}

    fn present(&mut self) {
        self.presented += 1;
        if self.presented % self.every == 0 {
            info!(
                "Presented frame {} (t={:.2}s)",
                self.presented, self.last_time.elapsed
            );
        }
    }
}

/// Demo observers. Dropping this unsubscribes them on their next event.
pub struct Game {
    spawner: Rc<RefCell<BulletSpawner>>,
    _quit: Rc<RefCell<QuitObserver>>,
}

impl Game {
    /// Wire the demo into `engine`'s external dispatcher.
    pub fn install(engine: &mut Engine, rng: Rng) -> Self {
        let spawner = Rc::new(RefCell::new(BulletSpawner::new(engine.object_manager(), rng)));
        let quit = Rc::new(RefCell::new(QuitObserver));

        engine.register_external_observer("game.spawner", window::KEY, GAME_CLASS, 0, ObserverHandle::new(&spawner));
        engine.register_external_observer("game.spawner", SPAWN_EVENT, GAME_CLASS, 0, ObserverHandle::new(&spawner));
        engine.register_external_observer("game.quit", window::KEY, GAME_CLASS, 10, ObserverHandle::new(&quit));
        engine.register_external_observer("game.quit", window::CLOSE, GAME_CLASS, 10, ObserverHandle::new(&quit));

        Game {
            spawner,
            _quit: quit,
        }
    }

    pub fn bullets_fired(&self) -> u64 {
        self.spawner.borrow().fired()
    }
}
