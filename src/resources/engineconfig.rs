//! Engine configuration resource.
//!
//! Settings for the headless runner, loaded from an INI file. Every key is
//! optional; missing values keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [clock]
//! fixed_delta = 0.0166
//! time_scale = 1.0
//! max_frames = 600
//!
//! [log]
//! trace_scripts = true
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

const DEFAULT_FIXED_DELTA: f32 = 1.0 / 60.0;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_MAX_FRAMES: u64 = 600;
const DEFAULT_TRACE_SCRIPTS: bool = true;
const DEFAULT_CONFIG_PATH: &str = "./engine.ini";

/// Runner configuration.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Seconds advanced per frame.
    pub fixed_delta: f32,
    /// Multiplier applied to `fixed_delta` by the world clock.
    pub time_scale: f32,
    /// Hard stop for the frame loop, even if processes are still alive.
    pub max_frames: u64,
    /// Log every bytecode invocation at info level.
    pub trace_scripts: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            fixed_delta: DEFAULT_FIXED_DELTA,
            time_scale: DEFAULT_TIME_SCALE,
            max_frames: DEFAULT_MAX_FRAMES,
            trace_scripts: DEFAULT_TRACE_SCRIPTS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config)?;

        info!(
            "Loaded config: delta={}, time_scale={}, max_frames={}, trace_scripts={}",
            self.fixed_delta, self.time_scale, self.max_frames, self.trace_scripts
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), String> {
        // [clock] section
        if let Some(delta) = config.getfloat("clock", "fixed_delta")? {
            if delta <= 0.0 {
                return Err(format!("clock.fixed_delta must be positive, got {}", delta));
            }
            self.fixed_delta = delta as f32;
        }
        if let Some(scale) = config.getfloat("clock", "time_scale")? {
            self.time_scale = scale as f32;
        }
        if let Some(frames) = config.getuint("clock", "max_frames")? {
            self.max_frames = frames;
        }

        // [log] section
        if let Some(trace) = config.getbool("log", "trace_scripts")? {
            self.trace_scripts = trace;
        }
        Ok(())
    }

    /// Save configuration to the INI file at `config_path`.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("clock", "fixed_delta", Some(self.fixed_delta.to_string()));
        config.set("clock", "time_scale", Some(self.time_scale.to_string()));
        config.set("clock", "max_frames", Some(self.max_frames.to_string()));
        config.set("log", "trace_scripts", Some(self.trace_scripts.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }
}
