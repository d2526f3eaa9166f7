//! Engine configuration.
//!
//! Pacing settings loaded from an INI configuration file. Defaults are safe
//! to run with, so a missing file is not an error for callers that ignore the
//! result of [`EngineConfig::load_from_file`].
//!
//! # Configuration File Format
//!
//! ```ini
//! [engine]
//! tick_ms = 16
//! max_consecutive_ticks = 32
//! time_scale = 1.0
//!
//! [window]
//! wait_timeout_ms = 4
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_MAX_CONSECUTIVE_TICKS: usize = 32;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_WAIT_TIMEOUT_MS: u64 = 4;
const DEFAULT_CONFIG_PATH: &str = "./framepulse.ini";

/// Engine pacing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Fixed period between two `engine.tick` events.
    pub tick_period: Duration,
    /// Cap on ticks emitted in one feed after a stall.
    pub max_consecutive_ticks: usize,
    /// Scale applied to simulation time.
    pub time_scale: f32,
    /// Longest a window producer may block waiting for input.
    pub window_wait_timeout: Duration,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            tick_period: Duration::from_millis(DEFAULT_TICK_MS),
            max_consecutive_ticks: DEFAULT_MAX_CONSECUTIVE_TICKS,
            time_scale: DEFAULT_TIME_SCALE,
            window_wait_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values keep their current values. Zero periods and a zero tick
    /// cap are ignored. Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [engine] section
        if let Some(ms) = config.getuint("engine", "tick_ms").ok().flatten() {
            if ms > 0 {
                self.tick_period = Duration::from_millis(ms);
            }
        }
        if let Some(max) = config
            .getuint("engine", "max_consecutive_ticks")
            .ok()
            .flatten()
        {
            if max > 0 {
                self.max_consecutive_ticks = max as usize;
            }
        }
        if let Some(scale) = config.getfloat("engine", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }

        // [window] section
        if let Some(ms) = config.getuint("window", "wait_timeout_ms").ok().flatten() {
            self.window_wait_timeout = Duration::from_millis(ms);
        }

        info!(
            "Loaded config: tick={:?}, max_consecutive_ticks={}, time_scale={}, window_wait={:?}",
            self.tick_period, self.max_consecutive_ticks, self.time_scale, self.window_wait_timeout
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [engine] section
        config.set(
            "engine",
            "tick_ms",
            Some(self.tick_period.as_millis().to_string()),
        );
        config.set(
            "engine",
            "max_consecutive_ticks",
            Some(self.max_consecutive_ticks.to_string()),
        );
        config.set("engine", "time_scale", Some(self.time_scale.to_string()));

        // [window] section
        config.set(
            "window",
            "wait_timeout_ms",
            Some(self.window_wait_timeout.as_millis().to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Tick period in seconds, the fixed simulation step.
    pub fn tick_seconds(&self) -> f32 {
        self.tick_period.as_secs_f32()
    }
}
