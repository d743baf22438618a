//! # Simulation Stepper
//!
//! Bundles a [`World`] with the built-in systems, registered in this order:
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────┐
//! │ 0. clamp delta time to timing.max_delta_time                │
//! │ 1. flush pending additions / removals (World::update)       │
//! │ 2. MovementSystem      → bumps the motion generation        │
//! │ 3. TerrainLayerSystem  → ramp layers                        │
//! │ 4. CollisionSystem     → publishes CollisionEvents, bumps   │
//! │                          the generation on separation       │
//! │ 5. SpatialIndexSystem  → lazy quadtree rebuild              │
//! │ 6. record FrameStats, warn if over budget                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Systems added through [`Simulation::world_mut`] run after these.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use ashfall_core::{EntityId, World};
use ashfall_shared::constants::MAX_FRAME_TIME_US;
use ashfall_shared::math::Rect;
use ashfall_spatial::MotionGeneration;

use crate::collision::CollisionSystem;
use crate::config::{ConfigResult, SimulationConfig};
use crate::events::{CollisionEvent, CollisionEventBus, CollisionEventReceiver, CollisionKind};
use crate::movement::MovementSystem;
use crate::spatial_index::SpatialIndexSystem;
use crate::terrain::Terrain;
use crate::terrain_layer::TerrainLayerSystem;

/// What happened in one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// World frame number the step ran as.
    pub frame: u64,
    /// Delta time actually integrated, after clamping.
    pub delta_time: f32,
    /// Wall-clock time of the step in microseconds.
    pub total_us: u64,
    /// Live entities after the step.
    pub entities: usize,
    /// Entities whose position changed.
    pub moved: usize,
    /// Overlapping pairs found by the collision pass.
    pub collisions: usize,
    /// Blocking pairs pushed apart.
    pub resolved: usize,
    /// Collision events lost to a full channel.
    pub events_dropped: u64,
    /// The quadtree was rebuilt this step.
    pub index_rebuilt: bool,
}

/// Running totals over many steps.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Steps recorded.
    pub frames_recorded: u64,
    /// Sum of step times.
    pub total_us_sum: u64,
    /// Fastest step.
    pub min_frame_us: u64,
    /// Slowest step.
    pub max_frame_us: u64,
    /// Steps slower than the budget.
    pub frames_over_budget: u64,
    /// Sum of collisions.
    pub collisions_sum: u64,
    /// Sum of dropped events.
    pub events_dropped_sum: u64,
    budget_us: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator counting steps slower than `budget_us` as over budget.
    #[must_use]
    pub fn new(budget_us: u64) -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            collisions_sum: 0,
            events_dropped_sum: 0,
            budget_us,
        }
    }

    /// Records a step's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.collisions_sum += stats.collisions as u64;
        self.events_dropped_sum += stats.events_dropped;

        if stats.total_us > self.budget_us {
            self.frames_over_budget += 1;
        }
    }

    /// Average step time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Share of steps over budget, in `[0, 1]`.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(MAX_FRAME_TIME_US)
    }
}

/// A world wired to the built-in systems.
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    movement: Rc<RefCell<MovementSystem>>,
    terrain_layer: Rc<RefCell<TerrainLayerSystem>>,
    collision: Rc<RefCell<CollisionSystem>>,
    spatial_index: Rc<RefCell<SpatialIndexSystem>>,
    terrain: Option<Rc<Terrain>>,
    events: CollisionEventBus,
    event_frame: Rc<Cell<u64>>,
    stats: FrameStatsAccumulator,
    last_frame: FrameStats,
}

impl Simulation {
    /// Validates `config` and builds an empty simulation.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`](crate::config::ConfigError::Invalid) if a
    /// value is out of range.
    pub fn new(config: SimulationConfig) -> ConfigResult<Self> {
        config.validate()?;

        let motion = MotionGeneration::new();
        let events = CollisionEventBus::new(config.world.event_capacity);
        let event_frame = Rc::new(Cell::new(0));

        let mut collision =
            CollisionSystem::new(&config.collision).with_motion_generation(motion.clone());
        let sender = events.sender();
        let frame = Rc::clone(&event_frame);
        collision.set_collision_callback(move |a, b| {
            let event = CollisionEvent {
                a: a.id(),
                b: b.id(),
                kind: CollisionKind::classify(a, b),
                frame: frame.get(),
            };
            if !sender.send(event) {
                tracing::trace!(a = %event.a, b = %event.b, "collision event dropped");
            }
        });
        let collision = Rc::new(RefCell::new(collision));

        let movement = Rc::new(RefCell::new(
            MovementSystem::new(config.movement.clone())
                .with_collision(Rc::clone(&collision))
                .with_motion_generation(motion.clone()),
        ));
        let terrain_layer = Rc::new(RefCell::new(TerrainLayerSystem::new(&config.collision)));
        let spatial_index = Rc::new(RefCell::new(SpatialIndexSystem::new(
            config.world.bounds(),
            config.quadtree.clone(),
            motion,
        )));

        let mut world = World::new();
        world.add_system(Rc::clone(&movement));
        world.add_system(Rc::clone(&terrain_layer));
        world.add_system(Rc::clone(&collision));
        world.add_system(Rc::clone(&spatial_index));

        Ok(Self {
            stats: FrameStatsAccumulator::new(config.timing.max_frame_time_us),
            config,
            world,
            movement,
            terrain_layer,
            collision,
            spatial_index,
            terrain: None,
            events,
            event_frame,
            last_frame: FrameStats::default(),
        })
    }

    /// Advances one frame and returns its statistics.
    ///
    /// `delta_time` is clamped to `[0, timing.max_delta_time]`; a non-finite
    /// value integrates nothing.
    pub fn step(&mut self, delta_time: f32) -> FrameStats {
        let delta_time = if delta_time.is_finite() {
            delta_time.clamp(0.0, self.config.timing.max_delta_time)
        } else {
            0.0
        };

        let start = Instant::now();
        let frame = self.world.frame();
        let dropped_before = self.events.dropped();
        let rebuilds_before = self.spatial_index.borrow().rebuild_count();
        self.event_frame.set(frame);

        self.world.update(delta_time);

        let collision = self.collision.borrow().last_stats();
        let stats = FrameStats {
            frame,
            delta_time,
            total_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            entities: self.world.entity_count(),
            moved: self.movement.borrow().moved_last_frame(),
            collisions: collision.collisions,
            resolved: collision.resolved,
            events_dropped: self.events.dropped() - dropped_before,
            index_rebuilt: self.spatial_index.borrow().rebuild_count() != rebuilds_before,
        };

        self.stats.record(stats);
        self.last_frame = stats;

        if self.config.timing.enable_timing_logs && stats.total_us > self.config.timing.max_frame_time_us {
            tracing::warn!(
                frame,
                elapsed_us = stats.total_us,
                budget_us = self.config.timing.max_frame_time_us,
                "frame exceeded budget"
            );
        }
        stats
    }

    /// Replaces the terrain used by collision and ramp handling.
    pub fn set_terrain(&mut self, terrain: Option<Terrain>) {
        self.terrain = terrain.map(Rc::new);
        self.collision.borrow_mut().set_terrain(self.terrain.clone());
        self.terrain_layer.borrow_mut().set_terrain(self.terrain.clone());
    }

    /// Current terrain.
    #[must_use]
    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_deref()
    }

    /// Ids whose rectangle touches `bounds`, as of the last index rebuild.
    #[must_use]
    pub fn query(&self, bounds: &Rect) -> Vec<EntityId> {
        self.spatial_index.borrow().query(bounds)
    }

    /// Receiver for collision events. Clones share one queue.
    #[must_use]
    pub fn events(&self) -> CollisionEventReceiver {
        self.events.receiver()
    }

    /// Handle to the collision system, for predicates such as
    /// [`CollisionSystem::check_collision_bounds`].
    #[must_use]
    pub fn collision(&self) -> Rc<RefCell<CollisionSystem>> {
        Rc::clone(&self.collision)
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably. Entity and system changes follow the usual
    /// deferral rules.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Frames stepped so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.world.frame()
    }

    /// Statistics of the most recent step.
    #[must_use]
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Running totals.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use ashfall_core::{Collider, Position, Velocity};
    use ashfall_shared::FIXED_TIMESTEP;

    use super::*;

    #[test]
    fn test_systems_run_in_pipeline_order() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        let names: Vec<_> = sim.world().system_names().collect();
        assert_eq!(names, vec!["movement", "terrain_layer", "collision", "spatial_index"]);
    }

    #[test]
    fn test_delta_time_is_clamped() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(sim.step(5.0).delta_time, sim.config().timing.max_delta_time);
        assert_eq!(sim.step(-1.0).delta_time, 0.0);
        assert_eq!(sim.step(f32::NAN).delta_time, 0.0);
        assert_eq!(sim.frame(), 3);
        assert_eq!(sim.stats().frames_recorded, 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = SimulationConfig::default();
        config.world.event_capacity = 0;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_collisions_are_published() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let a = sim.world_mut().spawn([Position::new(100.0, 100.0).into(), Collider::solid(10.0, 10.0).into()]);
        let b = sim.world_mut().spawn([
            Position::new(105.0, 100.0).into(),
            Velocity::new(0.0, 0.0).into(),
            Collider::trigger(10.0, 10.0).into(),
        ]);

        let stats = sim.step(FIXED_TIMESTEP);
        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.resolved, 0);

        let events = sim.events().drain();
        assert_eq!(
            events,
            vec![CollisionEvent { a, b, kind: CollisionKind::Trigger, frame: 0 }]
        );
    }

    #[test]
    fn test_accumulator_budget() {
        let mut acc = FrameStatsAccumulator::new(100);
        acc.record(FrameStats { total_us: 50, ..FrameStats::default() });
        acc.record(FrameStats { total_us: 150, ..FrameStats::default() });

        assert_eq!(acc.frames_over_budget, 1);
        assert_eq!(acc.min_frame_us, 50);
        assert_eq!(acc.max_frame_us, 150);
        assert!((acc.avg_frame_ms() - 0.1).abs() < 1e-9);
        assert!((acc.over_budget_ratio() - 0.5).abs() < 1e-9);
    }
}
