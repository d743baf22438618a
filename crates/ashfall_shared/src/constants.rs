//! # Simulation Constants
//!
//! Default tuning values. Every one of these can be overridden through the
//! simulation config; these are what an empty config file resolves to.

// =============================================================================
// TIMING
// =============================================================================

/// Tick rate (updates per second) the friction curve is normalised to.
pub const TICK_RATE: u32 = 60;

/// Fixed timestep matching [`TICK_RATE`], in seconds.
pub const FIXED_TIMESTEP: f32 = 1.0 / TICK_RATE as f32;

/// Largest delta time a single step may integrate (seconds).
///
/// Longer frames (debugger pauses, window drags) are clamped to this.
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Frame budget in microseconds before a step is reported as slow.
pub const MAX_FRAME_TIME_US: u64 = 33_000;

// =============================================================================
// COLLISION
// =============================================================================

/// Default broad-phase grid cell size (world units).
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Default terrain tile width (world units).
pub const DEFAULT_TILE_WIDTH: f32 = 32.0;

/// Default terrain tile height (world units).
pub const DEFAULT_TILE_HEIGHT: f32 = 32.0;

// =============================================================================
// QUADTREE
// =============================================================================

/// Default number of entities a leaf holds before it subdivides.
pub const DEFAULT_QUADTREE_CAPACITY: usize = 16;

/// Default maximum subdivision depth.
pub const DEFAULT_QUADTREE_MAX_DEPTH: u32 = 8;

/// Default number of frames between quadtree rebuilds.
pub const DEFAULT_REBUILD_INTERVAL: u32 = 1;

// =============================================================================
// MOVEMENT
// =============================================================================

/// Velocity component magnitude below which friction snaps to zero.
pub const VELOCITY_EPSILON: f32 = 0.1;

/// Velocity change below which facing is left untouched.
pub const FACING_THRESHOLD: f32 = 0.1;

/// Fraction of max speed at or above which an entity runs instead of walks.
pub const RUN_SPEED_FRACTION: f32 = 0.7;

/// Speed (units per second) above which an entity runs when max speed is unlimited.
pub const DEFAULT_RUN_SPEED: f32 = 150.0;

// =============================================================================
// WORLD
// =============================================================================

/// Default world width (world units).
pub const DEFAULT_WORLD_WIDTH: f32 = 2048.0;

/// Default world height (world units).
pub const DEFAULT_WORLD_HEIGHT: f32 = 2048.0;

/// Default collision event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;
