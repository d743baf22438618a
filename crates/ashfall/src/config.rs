//! # Simulation Configuration
//!
//! Tuning loaded once at startup from TOML. Every section and every field is
//! optional; missing values fall back to `ashfall_shared::constants`.
//!
//! ```toml
//! [world]
//! width = 4096.0
//! height = 4096.0
//!
//! [collision]
//! cell_size = 48.0
//!
//! [quadtree]
//! capacity = 8
//! rebuild_interval = 4
//!
//! [movement]
//! max_speed = 220.0
//! ```

use std::path::{Path, PathBuf};

use ashfall_shared::constants::{
    DEFAULT_CELL_SIZE, DEFAULT_EVENT_CAPACITY, DEFAULT_QUADTREE_CAPACITY,
    DEFAULT_QUADTREE_MAX_DEPTH, DEFAULT_REBUILD_INTERVAL, DEFAULT_RUN_SPEED, DEFAULT_TILE_HEIGHT,
    DEFAULT_TILE_WIDTH, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, FACING_THRESHOLD,
    MAX_DELTA_TIME, MAX_FRAME_TIME_US, RUN_SPEED_FRACTION, VELOCITY_EPSILON,
};
use ashfall_shared::math::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has fields of the wrong type.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be zero or positive, got {value}")))
    }
}

/// World extent and event plumbing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width; also the quadtree root width.
    pub width: f32,
    /// World height; also the quadtree root height.
    pub height: f32,
    /// Collision event channel capacity.
    pub event_capacity: usize,
}

impl WorldConfig {
    /// The world rectangle, anchored at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Broad-phase and terrain geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Grid cell edge length.
    pub cell_size: f32,
    /// Terrain tile width.
    pub tile_width: f32,
    /// Terrain tile height.
    pub tile_height: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            tile_width: DEFAULT_TILE_WIDTH,
            tile_height: DEFAULT_TILE_HEIGHT,
        }
    }
}

/// Quadtree shape and rebuild cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// Entries a leaf holds before splitting.
    pub capacity: usize,
    /// Deepest level a leaf may split to.
    pub max_depth: u32,
    /// Minimum frames between rebuilds.
    pub rebuild_interval: u32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUADTREE_CAPACITY,
            max_depth: DEFAULT_QUADTREE_MAX_DEPTH,
            rebuild_interval: DEFAULT_REBUILD_INTERVAL,
        }
    }
}

/// Movement tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Speed cap in units per second. 0 means unlimited.
    pub max_speed: f32,
    /// Friction snaps a velocity to zero once both components fall below this.
    pub velocity_epsilon: f32,
    /// Velocity components below this leave facing unchanged.
    pub facing_threshold: f32,
    /// Fraction of `max_speed` at which walking becomes running.
    pub run_fraction: f32,
    /// Running speed when `max_speed` is unlimited.
    pub run_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 0.0,
            velocity_epsilon: VELOCITY_EPSILON,
            facing_threshold: FACING_THRESHOLD,
            run_fraction: RUN_SPEED_FRACTION,
            run_speed: DEFAULT_RUN_SPEED,
        }
    }
}

/// Frame timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Longest step integrated in one frame, in seconds.
    pub max_delta_time: f32,
    /// Frame budget in microseconds.
    pub max_frame_time_us: u64,
    /// Warn about frames over budget.
    pub enable_timing_logs: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_delta_time: MAX_DELTA_TIME,
            max_frame_time_us: MAX_FRAME_TIME_US,
            enable_timing_logs: false,
        }
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// World extent.
    pub world: WorldConfig,
    /// Collision geometry.
    pub collision: CollisionConfig,
    /// Range index.
    pub quadtree: QuadtreeConfig,
    /// Movement tuning.
    pub movement: MovementConfig,
    /// Frame timing.
    pub timing: TimingConfig,
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML, [`ConfigError::Invalid`] on
    /// out-of-range values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SimulationConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        require_positive("world.width", self.world.width)?;
        require_positive("world.height", self.world.height)?;
        if self.world.event_capacity == 0 {
            return Err(invalid("world.event_capacity", "must be at least 1"));
        }

        require_positive("collision.cell_size", self.collision.cell_size)?;
        require_positive("collision.tile_width", self.collision.tile_width)?;
        require_positive("collision.tile_height", self.collision.tile_height)?;

        if self.quadtree.capacity == 0 {
            return Err(invalid("quadtree.capacity", "must be at least 1"));
        }
        if self.quadtree.rebuild_interval == 0 {
            return Err(invalid("quadtree.rebuild_interval", "must be at least 1"));
        }

        require_non_negative("movement.max_speed", self.movement.max_speed)?;
        require_non_negative("movement.velocity_epsilon", self.movement.velocity_epsilon)?;
        require_non_negative("movement.facing_threshold", self.movement.facing_threshold)?;
        require_non_negative("movement.run_speed", self.movement.run_speed)?;
        require_positive("movement.run_fraction", self.movement.run_fraction)?;
        if self.movement.run_fraction > 1.0 {
            return Err(invalid("movement.run_fraction", "must not exceed 1.0"));
        }

        require_positive("timing.max_delta_time", self.timing.max_delta_time)?;
        Ok(())
    }
}
