//! # Simulation Tests
//!
//! End-to-end frames through [`Simulation`]: movement, ramps, collision,
//! events and the lazily rebuilt quadtree working together.
//!
//! Run with: cargo test -p ashfall --test simulation_test -- --nocapture

use ashfall::{
    Collider, CollisionKind, Dead, Friction, Position, Rect, Simulation, SimulationConfig, Terrain,
    TileType, Velocity, FIXED_TIMESTEP,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DT: f32 = FIXED_TIMESTEP;

fn simulation() -> Simulation {
    Simulation::new(SimulationConfig::default()).unwrap()
}

#[test]
fn test_quadtree_query_matches_brute_force() {
    let config = SimulationConfig::from_toml_str(
        r#"
        [world]
        width = 1000.0
        height = 1000.0

        [quadtree]
        capacity = 16
        "#,
    )
    .unwrap();
    let mut sim = Simulation::new(config).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(1000);
    for _ in 0..1000 {
        let collider = Collider::trigger(rng.gen_range(1.0..20.0), rng.gen_range(1.0..20.0));
        sim.world_mut().spawn([
            Position::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)).into(),
            collider.into(),
        ]);
    }
    let stats = sim.step(DT);
    assert!(stats.index_rebuilt);
    assert_eq!(stats.entities, 1000);

    for bounds in [
        Rect::new(200.0, 200.0, 300.0, 300.0),
        Rect::from_min_max(200.0, 200.0, 300.0, 300.0),
    ] {
        let mut expected: Vec<_> = sim
            .world()
            .entities()
            .filter(|e| e.aabb().is_some_and(|aabb| aabb.touches(&bounds)))
            .map(|e| e.id())
            .collect();
        let mut found = sim.query(&bounds);
        expected.sort();
        found.sort();

        println!("query {bounds:?}: {} entities", found.len());
        assert!(!expected.is_empty());
        assert_eq!(found, expected);
    }
}

#[test]
fn test_head_on_pair_publishes_blocking_event() {
    let mut sim = simulation();
    let first = sim.world_mut().spawn([
        Position::new(0.0, 0.0).into(),
        Velocity::new(5.0, 0.0).into(),
        Collider::solid(10.0, 10.0).into(),
    ]);
    let second = sim.world_mut().spawn([
        Position::new(5.0, 0.0).into(),
        Velocity::new(-5.0, 0.0).into(),
        Collider::solid(10.0, 10.0).into(),
    ]);

    let stats = sim.step(DT);
    assert_eq!(stats.resolved, 1);

    let world = sim.world();
    let first_pos = world.get_entity(first).unwrap().get::<Position>().copied().unwrap();
    let second_pos = world.get_entity(second).unwrap().get::<Position>().copied().unwrap();
    assert!((first_pos.x + 2.5).abs() < 1e-4);
    assert!((second_pos.x - 7.5).abs() < 1e-4);
    for id in [first, second] {
        assert_eq!(world.get_entity(id).unwrap().get::<Velocity>(), Some(&Velocity::new(0.0, 0.0)));
    }

    let events = sim.events().drain();
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].a, events[0].b), (first, second));
    assert_eq!(events[0].kind, CollisionKind::Blocking);

    // Separated pairs stay quiet.
    assert_eq!(sim.step(DT).collisions, 0);
    assert!(sim.events().drain().is_empty());
}

#[test]
fn test_separation_refreshes_quadtree() {
    let mut sim = simulation();
    let a = sim.world_mut().spawn([
        Position::new(100.0, 100.0).into(),
        Collider::solid(10.0, 10.0).into(),
    ]);
    let b = sim.world_mut().spawn([
        Position::new(200.0, 100.0).into(),
        Collider::solid(10.0, 10.0).into(),
    ]);
    assert!(sim.step(DT).index_rebuilt);

    // Teleport without a structural change or any velocity.
    sim.world_mut().insert_component(b, Position::new(105.0, 100.0)).unwrap();
    let stats = sim.step(DT);
    assert_eq!(stats.moved, 0);
    assert_eq!(stats.resolved, 1);
    assert!(stats.index_rebuilt);

    let b_pos = sim.world().get_entity(b).unwrap().get::<Position>().copied().unwrap();
    assert!((b_pos.x - 107.5).abs() < 1e-4);
    assert_eq!(sim.query(&Rect::point(116.0, 105.0)), vec![b]);
    assert_eq!(sim.query(&Rect::point(98.0, 105.0)), vec![a]);
}

#[test]
fn test_friction_decays_to_rest() {
    let mut sim = simulation();
    let id = sim.world_mut().spawn([
        Position::new(100.0, 100.0).into(),
        Velocity::new(10.0, -4.0).into(),
        Friction::new(0.5).into(),
    ]);

    let speed = |sim: &Simulation| {
        sim.world().get_entity(id).and_then(|e| e.get::<Velocity>().copied()).unwrap()
    };

    let mut last = speed(&sim).speed();
    let mut ticks = 0;
    while !speed(&sim).is_zero() {
        sim.step(DT);
        let now = speed(&sim).speed();
        assert!(now < last, "speed rose from {last} to {now}");
        last = now;
        ticks += 1;
        assert!(ticks < 20, "never came to rest");
    }
    assert_eq!(speed(&sim), Velocity::new(0.0, 0.0));
}

#[test]
fn test_dead_entities_never_move() {
    let mut sim = simulation();
    let id = sim.world_mut().spawn([
        Position::new(300.0, 300.0).into(),
        Velocity::new(120.0, -80.0).into(),
        Friction::new(0.2).into(),
        Collider::solid(16.0, 16.0).into(),
        Dead.into(),
    ]);
    // A live body overlapping the corpse takes the whole push.
    let pusher = sim.world_mut().spawn([
        Position::new(310.0, 300.0).into(),
        Velocity::new(-60.0, 0.0).into(),
        Collider::solid(16.0, 16.0).into(),
    ]);

    for _ in 0..30 {
        sim.step(DT);
    }

    let corpse = sim.world().get_entity(id).unwrap();
    assert_eq!(corpse.get::<Position>(), Some(&Position::new(300.0, 300.0)));
    assert_eq!(corpse.get::<Velocity>(), Some(&Velocity::new(120.0, -80.0)));

    let pusher = sim.world().get_entity(pusher).unwrap();
    assert!(pusher.get::<Position>().unwrap().x >= 316.0 - 1e-3);
}

#[test]
fn test_slides_along_wall_column() {
    let mut terrain = Terrain::new(8, 8);
    for ty in 0..8 {
        terrain.set(3, ty, TileType::Wall);
    }

    let mut sim = simulation();
    sim.set_terrain(Some(terrain));
    let id = sim.world_mut().spawn([
        Position::new(78.0, 40.0).into(),
        Velocity::new(240.0, 60.0).into(),
        Collider::solid(16.0, 16.0).into(),
    ]);

    let stats = sim.step(DT);
    assert_eq!(stats.moved, 1);

    let entity = sim.world().get_entity(id).unwrap();
    let pos = entity.get::<Position>().copied().unwrap();
    assert_eq!(pos.x, 78.0);
    assert!((pos.y - 41.0).abs() < 1e-4);
    assert_eq!(entity.get::<Velocity>(), Some(&Velocity::new(0.0, 60.0)));
}

#[test]
fn test_ramp_moves_collider_to_upper_layer() {
    let mut sim = simulation();
    sim.set_terrain(Terrain::from_rows(&["....", ".2..", "...."]));
    assert!(sim.terrain().is_some());

    let climber = sim.world_mut().spawn([
        Position::new(36.0, 36.0).into(),
        Collider::solid(16.0, 16.0).into(),
    ]);
    // Overlaps the climber but stands beside the ramp, on layer 1.
    sim.world_mut().spawn([
        Position::new(44.0, 36.0).into(),
        Collider::solid(40.0, 16.0).with_layer(1).into(),
    ]);

    let stats = sim.step(DT);
    let layer = sim.world().get_entity(climber).unwrap().get::<Collider>().unwrap().layer;
    assert_eq!(layer, 2);
    assert_eq!(stats.collisions, 0);
}

#[test]
fn test_config_file_drives_simulation() {
    let path = std::env::temp_dir().join(format!("ashfall-sim-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        [world]
        event_capacity = 1

        [timing]
        max_delta_time = 0.05
        "#,
    )
    .unwrap();

    let config = SimulationConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    let mut sim = Simulation::new(config).unwrap();
    assert_eq!(sim.step(1.0).delta_time, 0.05);

    // Three overlapping triggers make three pairs; only one event fits.
    for _ in 0..3 {
        sim.world_mut().spawn([Position::new(10.0, 10.0).into(), Collider::trigger(8.0, 8.0).into()]);
    }
    let stats = sim.step(DT);
    assert_eq!(stats.collisions, 3);
    assert_eq!(stats.events_dropped, 2);
    assert_eq!(sim.events().drain().len(), 1);
    assert_eq!(sim.stats().events_dropped_sum, 2);
}
