//! framepulse demo entry point.
//!
//! Runs the engine headless with the bullet demo from [`framepulse::game`].
//! Window input is simulated by a thread that sends key presses through a
//! [`WindowProducer`] channel, the same way a real window thread would.
//!
//! # Main Loop
//!
//! 1. Load `framepulse.ini` (or `--config PATH`), falling back to defaults
//! 2. Build the engine, install the demo observers and the window producer
//! 3. Start the input thread: `--bullets N` presses of `C`, then a window close
//! 4. Run until the demo asks to end, or for `--frames N` frames
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --bullets 10 --trace
//! ```

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};

use framepulse::config::EngineConfig;
use framepulse::dispatcher::EventQueue;
use framepulse::engine::Engine;
use framepulse::events::window::{self, Action, keys};
use framepulse::events::{Event, PhaseEvent, WindowEvent};
use framepulse::game::{Game, LogRenderer};
use framepulse::observer::{Observer, ObserverHandle, ObserverSignal};
use framepulse::producers::window::{WindowEventSender, WindowProducer};

const INPUT_INTERVAL: Duration = Duration::from_millis(50);
const TRACE_CLASS: usize = 9;

/// framepulse demo
#[derive(Parser)]
#[command(version, about = "Headless bullet demo driven by the framepulse event engine")]
struct Cli {
    /// Path to the INI configuration file (default: ./framepulse.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stop after this many presented frames instead of waiting for a quit.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Number of `C` key presses the simulated window sends before closing.
    #[arg(long, value_name = "N", default_value_t = 5)]
    bullets: usize,

    /// Print every routed phase and window event as a JSON line on stdout.
    #[arg(long)]
    trace: bool,
}

/// Writes each event it sees as one line of JSON.
struct TraceObserver<W: Write> {
    out: W,
}

impl<W: Write> Observer for TraceObserver<W> {
    fn on_event(&mut self, event: &Event, _queue: &mut EventQueue) -> ObserverSignal {
        match serde_json::to_string(event) {
            Ok(line) => {
                if let Err(e) = writeln!(self.out, "{}", line) {
                    warn!("Trace output failed: {}", e);
                }
            }
            Err(e) => warn!("Could not serialize {}: {}", event.name(), e),
        }
        ObserverSignal::Continue
    }
}

/// Stand-in for a window thread: presses `C` `bullets` times, then closes.
fn spawn_input_thread(tx: WindowEventSender, bullets: usize) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let presses = (0..bullets).flat_map(|_| {
            [Action::Press, Action::Release].map(|action| WindowEvent::Key { key: keys::C, action })
        });
        for event in presses.chain([WindowEvent::Close]) {
            thread::sleep(INPUT_INTERVAL);
            if tx.send(event).is_err() {
                // engine is gone
                return;
            }
        }
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => EngineConfig::with_path(path),
        None => EngineConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        info!("{}; using defaults", e);
    }

    let mut engine = Engine::new(config);
    engine.set_renderer(LogRenderer::new(60));
    let game = Game::install(&mut engine, fastrand::Rng::new());

    let (producer, tx) = WindowProducer::new(engine.config().window_wait_timeout);
    engine.add_external_producer("window", producer);

    let tracer = cli.trace.then(|| {
        let tracer = Rc::new(RefCell::new(TraceObserver {
            out: std::io::stdout(),
        }));
        let handle = ObserverHandle::new(&tracer);
        engine.internal_dispatcher_mut().register_many(
            "trace",
            PhaseEvent::ALL.iter().map(|phase| phase.name()),
            TRACE_CLASS,
            0,
            handle.clone(),
            false,
        );
        for name in [window::KEY, window::CLOSE] {
            engine.register_external_observer("trace", name, TRACE_CLASS, 0, handle.clone());
        }
        tracer
    });

    let input = spawn_input_thread(tx, cli.bullets);

    info!("Starting framepulse");
    match cli.frames {
        Some(frames) => {
            engine.run_frames(frames);
        }
        None => engine.run(),
    }

    info!(
        "Done: {} frames presented, {} bullets fired, {} still alive",
        engine.frames_presented(),
        game.bullets_fired(),
        engine.object_manager().borrow().len()
    );

    drop(tracer);
    drop(engine);
    if input.join().is_err() {
        warn!("Input thread panicked");
    }
}
