//! Integration tests for the command pipeline and the tick loop.
//!
//! Exercises: Command → CommandQueue → Dispatcher → handler → EffectQueue
//! → follow system → motion system, through `SimulationEngine`.

use std::cell::RefCell;
use std::rc::Rc;

use fivenations_core::commands::CommandContext;
use fivenations_core::entities::EntityManager;
use fivenations_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

// ── Helpers ────────────────────────────────────────────────────────────

fn catalog() -> UnitCatalog {
    UnitCatalog::from_json(
        r#"{
            "scout":  { "max_velocity": 150.0, "max_acceleration": 90.0, "max_angular_velocity": 12.0,
                        "max_angle_count": 16, "max_target_drag_threshold": 40.0 },
            "hauler": { "max_velocity": 60.0, "max_acceleration": 20.0, "max_angular_velocity": 4.0,
                        "max_angle_count": 8, "max_target_drag_threshold": 80.0 },
            "turret": { "max_velocity": 120.0, "max_acceleration": 60.0, "max_angular_velocity": 8.0,
                        "max_angle_count": 1, "max_target_drag_threshold": 30.0 }
        }"#,
    )
    .unwrap()
}

fn engine_with(config: SimConfig) -> SimulationEngine {
    SimulationEngine::new(config, catalog()).unwrap()
}

fn engine() -> SimulationEngine {
    engine_with(SimConfig::default())
}

fn move_to(targets: &[u64], x: f64, y: f64) -> Command {
    Command::new(ids::ENTITY_MOVE)
        .with_targets(targets.iter().copied())
        .with_field("x", x)
        .with_field("y", y)
}

fn follow(targets: &[u64], leader: u64) -> Command {
    Command::new(ids::ENTITY_FOLLOW)
        .with_targets(targets.iter().copied())
        .with_field("targetEntity", leader)
}

fn tick_until_idle(engine: &mut SimulationEngine, id: u64, limit: u64) -> u64 {
    for n in 1..=limit {
        engine.tick().unwrap();
        if engine.effects(id).unwrap().is_empty() {
            return n;
        }
    }
    panic!("unit {id} still busy after {limit} ticks");
}

/// Records every command it executes
struct Probe(Rc<RefCell<Vec<String>>>);

impl CommandHandler for Probe {
    fn execute(
        &self,
        ctx: &CommandContext<'_>,
        _entities: &mut EntityManager,
    ) -> Result<(), SimError> {
        self.0.borrow_mut().push(ctx.id.to_string());
        Ok(())
    }
}

// ── Movement orders ────────────────────────────────────────────────────

#[test]
fn move_order_arrives_and_stops() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();
    engine.commands().add(move_to(&[1], 600.0, -250.0));

    tick_until_idle(&mut engine, 1, 5_000);

    let motion = engine.motion(1u64).unwrap();
    assert!(motion.is_entity_arrived_at_destination);
    assert!(motion.is_entity_stopped_at_destination);
    assert_eq!(motion.movement.velocity, 0.0);
    let remaining = engine.position(1u64).unwrap().distance(&Vec2::new(600.0, -250.0));
    assert!(remaining <= 40.0 + 1.0, "stopped {remaining:.2} short");
}

#[test]
fn single_facing_unit_never_turns() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "turret", Vec2::ZERO).unwrap();
    engine.commands().add(move_to(&[1], -100.0, 100.0));

    engine.tick().unwrap();
    let motion = engine.motion(1u64).unwrap();
    assert_eq!(motion.rotation.current_consolidated_angle, 0);
    assert_eq!(motion.rotation.target_consolidated_angle, 0);
    assert_eq!(motion.movement.current_angle, motion.movement.target_angle);

    tick_until_idle(&mut engine, 1, 5_000);
    assert_eq!(engine.motion(1u64).unwrap().rotation.current_consolidated_angle, 0);
}

#[test]
fn stop_halts_a_moving_unit() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "hauler", Vec2::ZERO).unwrap();
    engine.commands().add(move_to(&[1], 1_000.0, 0.0));
    engine.run_ticks(600).unwrap();
    assert!(engine.motion(1u64).unwrap().is_moving());

    engine.commands().add(Command::new(ids::ENTITY_STOP).with_targets([1u64]));
    engine.tick().unwrap();
    let halted_at = engine.position(1u64).unwrap();
    assert_eq!(engine.motion(1u64).unwrap().movement.velocity, 0.0);
    assert!(engine.effects(1u64).unwrap().is_empty());

    engine.run_ticks(60).unwrap();
    assert_eq!(engine.position(1u64).unwrap(), halted_at);
}

#[test]
fn custom_movement_sequence_is_installed() {
    let config = SimConfig {
        default_movement_effects: vec![
            "initMovement".into(),
            "accelerateToTarget".into(),
            "moveToTarget".into(),
        ],
        ..SimConfig::default()
    };
    let mut engine = engine_with(config);
    engine.spawn_unit(1u64, "turret", Vec2::ZERO).unwrap();
    engine.commands().add(move_to(&[1], 50.0, 0.0));
    engine.tick().unwrap();
    assert_eq!(
        engine.effects(1u64).unwrap(),
        vec!["accelerateToTarget".to_string(), "moveToTarget".to_string()]
    );
}

#[test]
fn registered_effect_can_be_queued() {
    fn hover(state: &mut MotionState, _ctx: &fivenations_logic::MotionContext) -> bool {
        state.rotation.angular_velocity = 0.0;
        false
    }

    let mut engine = engine();
    assert!(engine.register_effect("hover", hover).is_none());
    engine
        .set_movement_effects(vec!["initMovement".into(), "hover".into()])
        .unwrap();
    assert!(engine.set_movement_effects(vec!["warp".into()]).is_err());

    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();
    engine.commands().add(move_to(&[1], 10.0, 10.0));
    assert_eq!(tick_until_idle(&mut engine, 1, 10), 2);
}

// ── Dispatch ───────────────────────────────────────────────────────────

#[test]
fn commands_dispatch_in_fifo_order() {
    let mut engine = engine();
    let log = Rc::new(RefCell::new(Vec::new()));
    for id in ["A", "B", "C"] {
        engine.register_command(id, Probe(Rc::clone(&log)));
    }
    let announced = Rc::new(RefCell::new(Vec::new()));
    for id in ["A", "B", "C"] {
        let sink = Rc::clone(&announced);
        engine.notifier().subscribe(id, move |id| sink.borrow_mut().push(id.to_string()));
    }

    for id in ["A", "B", "C"] {
        engine.commands().add(Command::new(id));
    }
    engine.tick().unwrap();

    assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
    assert_eq!(*announced.borrow(), vec!["A", "B", "C"]);
}

#[test]
fn random_interleavings_keep_fifo_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut engine = engine();
    let log = Rc::new(RefCell::new(Vec::new()));
    let names: Vec<String> = (0..8).map(|n| format!("probe/{n}")).collect();
    for name in &names {
        engine.register_command(name.clone(), Probe(Rc::clone(&log)));
    }

    for _ in 0..20 {
        let batch: Vec<String> = (0..rng.gen_range(1..30))
            .map(|_| names[rng.gen_range(0..names.len())].clone())
            .collect();
        let sender = engine.sender();
        for (n, id) in batch.iter().enumerate() {
            // mix direct adds with the cross-thread handle; both join the tail
            if n % 2 == 0 {
                engine.commands().add(Command::new(id.clone()));
            } else {
                sender.send(Command::new(id.clone()));
            }
        }
        log.borrow_mut().clear();
        engine.tick().unwrap();
        assert_eq!(*log.borrow(), batch);
    }
}

#[test]
fn unknown_command_halts_draining() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();
    let stops = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&stops);
    engine.notifier().subscribe(ids::ENTITY_STOP, move |_| *sink.borrow_mut() += 1);

    engine.commands().add(Command::new("entity/cloak").with_targets([1u64]));
    engine.commands().add(Command::new(ids::ENTITY_STOP).with_targets([1u64]));

    let err = engine.tick().unwrap_err();
    assert!(matches!(err, SimError::CommandNotFound(ref id) if id == "entity/cloak"));
    assert_eq!(*stops.borrow(), 0);

    // The stop is still queued and runs next tick
    engine.tick().unwrap();
    assert_eq!(*stops.borrow(), 1);
}

#[test]
fn motion_continues_when_dispatch_fails() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "turret", Vec2::ZERO).unwrap();
    engine.commands().add(move_to(&[1], 500.0, 0.0));
    engine.run_ticks(30).unwrap();
    let before = engine.position(1u64).unwrap();

    engine.commands().add(Command::new("entity/cloak"));
    assert!(engine.tick().is_err());

    let after = engine.position(1u64).unwrap();
    assert!(after.x > before.x, "unit did not move during the failed tick");
}

#[test]
fn commands_without_id_are_skipped_by_default() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();
    let anonymous: Command = serde_json::from_value(json!({ "targets": [1] })).unwrap();
    engine.commands().add(anonymous);
    engine.commands().add(move_to(&[1], 20.0, 0.0));
    engine.tick().unwrap();
    assert!(!engine.effects(1u64).unwrap().is_empty());
}

#[test]
fn strict_policy_rejects_malformed_commands() {
    let config = SimConfig {
        malformed_input: MalformedInputPolicy::Reject,
        ..SimConfig::default()
    };
    let mut engine = engine_with(config);
    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();

    engine.commands().add(Command::new(ids::ENTITY_FOLLOW).with_targets([1u64]));
    assert!(matches!(engine.tick(), Err(SimError::MalformedCommand { .. })));

    engine.commands().add(Command::default());
    assert!(matches!(engine.tick(), Err(SimError::MalformedCommand { .. })));
}

#[test]
fn commands_parse_from_producer_json() {
    let mut engine = engine();
    engine.spawn_unit(4u64, "scout", Vec2::ZERO).unwrap();
    let command: Command = serde_json::from_str(
        r#"{ "id": "entity/move", "targets": [4], "data": { "x": 30, "y": 40 }, "resetActivityQueue": true }"#,
    )
    .unwrap();
    engine.commands().add(command);
    engine.tick().unwrap();
    assert_eq!(engine.motion(4u64).unwrap().movement.target_initial_distance, 50.0);
}

// ── Follow ─────────────────────────────────────────────────────────────

#[test]
fn follow_without_data_changes_nothing() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();
    engine.spawn_unit(2u64, "scout", Vec2::new(300.0, 0.0)).unwrap();
    engine.commands().add(move_to(&[1], 100.0, 100.0));
    engine.tick().unwrap();
    let effects = engine.effects(1u64).unwrap();
    let motion = engine.motion(1u64).unwrap();

    engine.commands().add(
        Command::new(ids::ENTITY_FOLLOW)
            .with_targets([1u64])
            .reset_activity_queue(true),
    );
    engine
        .commands()
        .add(Command::new(ids::ENTITY_FOLLOW).with_field("targetEntity", 2));
    engine.tick().unwrap();

    assert_eq!(engine.following(1u64), None);
    // the order kept running: one more effect tick, nothing replaced
    let now = engine.effects(1u64).unwrap();
    assert!(effects.ends_with(&now));
    assert_eq!(
        engine.motion(1u64).unwrap().movement.target_initial_distance,
        motion.movement.target_initial_distance
    );
}

#[test]
fn follower_closes_on_moving_leader() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "hauler", Vec2::ZERO).unwrap();
    engine.spawn_unit(2u64, "scout", Vec2::new(-500.0, -500.0)).unwrap();
    engine.commands().add(move_to(&[1], 400.0, 0.0));
    engine.commands().add(follow(&[2], 1));

    engine.run_ticks(60 * 30).unwrap();

    let gap = engine
        .position(1u64)
        .unwrap()
        .distance(&engine.position(2u64).unwrap());
    assert!(gap < 100.0, "follower is {gap:.1} away");
    assert_eq!(engine.following(2u64), Some(EntityId(1)));
}

#[test]
fn move_order_cancels_follow() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();
    engine.spawn_unit(2u64, "scout", Vec2::new(400.0, 0.0)).unwrap();
    engine.commands().add(follow(&[1], 2));
    engine.run_ticks(10).unwrap();
    engine.commands().add(move_to(&[1], -200.0, 0.0));
    engine.tick().unwrap();
    assert_eq!(engine.following(1u64), None);
}

#[test]
fn follow_unknown_leader_is_fatal() {
    let mut engine = engine();
    engine.spawn_unit(1u64, "scout", Vec2::ZERO).unwrap();
    engine.commands().add(follow(&[1], 42));
    let err = engine.tick().unwrap_err();
    assert!(matches!(err, SimError::UnknownEntity(EntityId(42))));
    assert!(err.is_not_found());
}
