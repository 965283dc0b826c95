//! Five Nations Headless Simulation Harness
//!
//! Drives the command pipeline and the motion effects through the real tick
//! loop, with the shipped unit data. No rendering, no input, no networking.
//!
//! Usage:
//!   cargo run -p fivenations-simtest
//!   cargo run -p fivenations-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p fivenations-simtest

use std::cell::RefCell;
use std::rc::Rc;

use fivenations_core::prelude::*;
use fivenations_logic::effects::{init_movement, movement_sequence};
use fivenations_logic::{Effect, MotionContext};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Unit data and config (same JSON the game client ships) ──────────────
const UNITS_JSON: &str = include_str!("../../../data/units.json");
const CONFIG_JSON: &str = include_str!("../../../data/sim_config.json");

/// Upper bound for any single movement order in the shipped data
const ORDER_TICK_LIMIT: u64 = 60 * 60;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Five Nations Simulation Harness ===\n");
    info!("Harness starting (verbose: {})", verbose);

    let mut results = Vec::new();

    // 1. Unit data and config
    let data = validate_data(&mut results);

    // 2. Effect registry and sector maths
    results.extend(validate_effects());

    if let Some((config, catalog)) = data {
        // 3. One movement order per unit type
        results.extend(validate_movement_orders(&config, &catalog, verbose));

        // 4. Command pipeline
        results.extend(validate_command_pipeline(&config, &catalog));

        // 5. Follow behaviour
        results.extend(validate_follow(&config, &catalog, verbose));

        // 6. Randomised order stress
        results.extend(validate_random_orders(&config, &catalog, verbose));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn engine(config: &SimConfig, catalog: &UnitCatalog) -> Result<SimulationEngine, SimError> {
    SimulationEngine::new(config.clone(), catalog.clone())
}

/// Failing result for a step the checks depend on
fn setup_failed(name: &str, error: SimError) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: format!("setup failed: {}", error),
    }
}

fn move_order(targets: &[u64], x: f64, y: f64) -> Command {
    Command::new(ids::ENTITY_MOVE)
        .with_targets(targets.iter().copied())
        .with_field("x", x)
        .with_field("y", y)
}

// ── 1. Data ─────────────────────────────────────────────────────────────

fn validate_data(results: &mut Vec<TestResult>) -> Option<(SimConfig, UnitCatalog)> {
    println!("--- Unit Data & Config ---");

    let catalog = match UnitCatalog::from_json(UNITS_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "units_parse".into(),
                passed: false,
                detail: format!("units.json rejected: {}", e),
            });
            return None;
        }
    };
    results.push(TestResult {
        name: "units_parse".into(),
        passed: catalog.len() >= 5,
        detail: format!("{} unit types loaded", catalog.len()),
    });

    let config = match SimConfig::from_json(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("sim_config.json rejected: {}", e),
            });
            return None;
        }
    };
    results.push(TestResult {
        name: "config_parse".into(),
        passed: config.tick_rate > 0.0 && config.follow_distance > 0.0,
        detail: format!("{} Hz, follow distance {}", config.tick_rate, config.follow_distance),
    });

    let registry = EffectRegistry::with_builtins();
    let known = registry.validate(config.default_movement_effects.iter().map(String::as_str));
    results.push(TestResult {
        name: "config_effects_registered".into(),
        passed: known.is_ok(),
        detail: match known {
            Ok(()) => config.default_movement_effects.join(" → "),
            Err(e) => e.to_string(),
        },
    });

    info!("Loaded {} unit types at {} Hz", catalog.len(), config.tick_rate);
    Some((config, catalog))
}

// ── 2. Effects ──────────────────────────────────────────────────────────

fn validate_effects() -> Vec<TestResult> {
    println!("--- Effects & Sectors ---");
    let mut results = Vec::new();

    let registry = EffectRegistry::with_builtins();
    let missing: Vec<_> = Effect::ALL
        .iter()
        .filter(|e| registry.get(e.name()).is_err())
        .map(|e| e.name())
        .collect();
    results.push(TestResult {
        name: "effects_builtins_resolve".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            format!("{} built-ins registered", Effect::ALL.len())
        } else {
            format!("missing: {}", missing.join(", "))
        },
    });

    results.push(TestResult {
        name: "effects_empty_name_not_found".into(),
        passed: registry.get("").is_err() && registry.get("warpJump").is_err(),
        detail: "empty and unknown names fail lookup".into(),
    });

    // Eight facings, target due east: sector 6, six steps right or two left
    let mut state = MotionState::from_profile(&UnitProfile {
        max_angle_count: 8,
        ..UnitProfile::default()
    });
    init_movement(
        &mut state,
        &MotionContext {
            position: Vec2::ZERO,
            target: Vec2::new(100.0, 0.0),
        },
    );
    let r = &state.rotation;
    results.push(TestResult {
        name: "sectors_due_east_of_eight".into(),
        passed: r.target_consolidated_angle == 6
            && r.step_number_to_right == 6
            && r.step_number_to_left == 2,
        detail: format!(
            "sector {} right {} left {}",
            r.target_consolidated_angle, r.step_number_to_right, r.step_number_to_left
        ),
    });

    let m = &state.movement;
    results.push(TestResult {
        name: "init_drag_threshold_halved".into(),
        passed: (m.target_drag_threshold - 50.0).abs() < 1e-9
            && (m.target_initial_distance - 100.0).abs() < 1e-9,
        detail: format!(
            "initial distance {:.1}, drag threshold {:.1}",
            m.target_initial_distance, m.target_drag_threshold
        ),
    });

    results
}

// ── 3. Movement Orders ──────────────────────────────────────────────────

fn validate_movement_orders(
    config: &SimConfig,
    catalog: &UnitCatalog,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Movement Orders ---");
    let mut results = Vec::new();
    let destination = Vec2::new(400.0, -150.0);

    for unit_type in catalog.unit_types() {
        let Some(profile) = catalog.get(unit_type).copied() else {
            continue;
        };
        let mut engine = match engine(config, catalog) {
            Ok(e) => e,
            Err(e) => {
                results.push(setup_failed(&format!("order_{}", unit_type), e));
                continue;
            }
        };
        if let Err(e) = engine.spawn_unit(1u64, unit_type, Vec2::ZERO) {
            results.push(setup_failed(&format!("order_{}", unit_type), e));
            continue;
        }
        engine.commands().add(move_order(&[1], destination.x, destination.y));

        let mut ticks = 0;
        let mut error = None;
        while ticks < ORDER_TICK_LIMIT {
            if let Err(e) = engine.tick() {
                error = Some(e);
                break;
            }
            ticks += 1;
            if engine.effects(1u64).is_some_and(|q| q.is_empty()) {
                break;
            }
        }
        let position = engine.position(1u64).unwrap_or(Vec2::ZERO);
        let motion = engine.motion(1u64).unwrap_or_default();

        if profile.max_velocity <= 0.0 {
            results.push(TestResult {
                name: format!("order_{}_immobile", unit_type),
                passed: error.is_none() && position == Vec2::ZERO,
                detail: format!("stayed at ({:.1}, {:.1})", position.x, position.y),
            });
            continue;
        }

        let remaining = position.distance(&destination);
        results.push(TestResult {
            name: format!("order_{}_completes", unit_type),
            passed: error.is_none() && ticks < ORDER_TICK_LIMIT,
            detail: match error {
                Some(e) => e.to_string(),
                None => format!("{} ticks ({:.2}s)", ticks, ticks as f64 * config.tick_delta()),
            },
        });
        results.push(TestResult {
            name: format!("order_{}_stops_near_target", unit_type),
            passed: motion.is_entity_arrived_at_destination
                && motion.is_entity_stopped_at_destination
                && motion.movement.velocity == 0.0
                && remaining <= profile.max_target_drag_threshold + 5.0,
            detail: format!(
                "{:.1} from target (drag threshold {:.1})",
                remaining, profile.max_target_drag_threshold
            ),
        });

        if verbose {
            println!(
                "  {:12} arrived after {:5} ticks at ({:7.1}, {:7.1})",
                unit_type, ticks, position.x, position.y
            );
        }
    }

    results
}

// ── 4. Command Pipeline ─────────────────────────────────────────────────

fn validate_command_pipeline(config: &SimConfig, catalog: &UnitCatalog) -> Vec<TestResult> {
    println!("--- Command Pipeline ---");
    let mut results = Vec::new();

    // Needs a unit that both moves and turns
    let Some(unit_type) = catalog
        .unit_types()
        .find(|t| catalog.get(t).is_some_and(|p| p.max_velocity > 0.0 && p.has_rotation()))
        .map(str::to_string)
    else {
        return results;
    };
    let mut engine = match engine(config, catalog) {
        Ok(e) => e,
        Err(e) => {
            results.push(setup_failed("pipeline_engine", e));
            return results;
        }
    };
    for id in 1..=3u64 {
        if let Err(e) = engine.spawn_unit(id, &unit_type, Vec2::new(id as f64 * 50.0, 0.0)) {
            results.push(setup_failed("pipeline_spawn", e));
            return results;
        }
    }
    debug!("Pipeline checks use {}", unit_type);

    // FIFO dispatch, one announcement per executed command
    let announced = Rc::new(RefCell::new(Vec::new()));
    for id in [ids::ENTITY_MOVE, ids::ENTITY_STOP, ids::ENTITY_FOLLOW] {
        let sink = Rc::clone(&announced);
        engine
            .notifier()
            .subscribe(id, move |id| sink.borrow_mut().push(id.to_string()));
    }
    engine.commands().add(move_order(&[1], 500.0, 500.0));
    engine.commands().add(Command::default());
    engine.commands().add(Command::new(ids::ENTITY_STOP).with_targets([2u64]));
    engine.commands().add(
        Command::new(ids::ENTITY_FOLLOW)
            .with_targets([3u64])
            .with_field("targetEntity", 1),
    );
    let ok = engine.tick().is_ok();
    let seen = announced.borrow().clone();
    results.push(TestResult {
        name: "pipeline_fifo_and_notify".into(),
        passed: ok && seen == vec![ids::ENTITY_MOVE, ids::ENTITY_STOP, ids::ENTITY_FOLLOW],
        detail: format!("announced {:?}", seen),
    });

    // Unknown id halts the drain; motion still ticks
    announced.borrow_mut().clear();
    let before = engine.motion(1u64).unwrap_or_default();
    engine.commands().add(Command::new("entity/teleport"));
    engine.commands().add(Command::new(ids::ENTITY_STOP).with_targets([1u64]));
    let halted = matches!(engine.tick(), Err(SimError::CommandNotFound(_)));
    let after = engine.motion(1u64).unwrap_or_default();
    results.push(TestResult {
        name: "pipeline_unknown_id_fatal".into(),
        passed: halted && announced.borrow().is_empty() && engine.commands().len() == 1,
        detail: format!("{} command(s) left queued", engine.commands().len()),
    });
    results.push(TestResult {
        name: "pipeline_motion_survives_failure".into(),
        passed: after != before,
        detail: "motion state advanced during failed tick".into(),
    });
    engine.reset();

    // Follow without data is a silent no-op
    let queue_before = engine.effects(2u64);
    engine.commands().add(
        Command::new(ids::ENTITY_FOLLOW)
            .with_targets([2u64])
            .reset_activity_queue(true),
    );
    let ok = engine.tick().is_ok();
    results.push(TestResult {
        name: "pipeline_follow_without_data_ignored".into(),
        passed: ok
            && engine.following(2u64).is_none()
            && engine.effects(2u64).map(|q| q.len()) <= queue_before.map(|q| q.len()),
        detail: "no error, no follow installed".into(),
    });

    // Producers on other threads
    let handles: Vec<_> = (0..4u64)
        .map(|producer| {
            let sender = engine.sender();
            std::thread::spawn(move || {
                for n in 0..25 {
                    let (x, y) = (n as f64 * 10.0, producer as f64 * 10.0);
                    sender.send(move_order(&[producer % 3 + 1], x, y));
                }
            })
        })
        .collect();
    let joined = handles.into_iter().all(|h| h.join().is_ok());
    announced.borrow_mut().clear();
    let ok = engine.tick().is_ok();
    let moves = announced.borrow().iter().filter(|id| *id == ids::ENTITY_MOVE).count();
    results.push(TestResult {
        name: "pipeline_cross_thread_producers".into(),
        passed: joined && ok && moves == 100,
        detail: format!("{} moves dispatched from 4 threads", moves),
    });

    results
}

// ── 5. Follow ───────────────────────────────────────────────────────────

fn validate_follow(config: &SimConfig, catalog: &UnitCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Follow ---");
    let mut results = Vec::new();

    let mut movers: Vec<(&str, f64)> = catalog
        .unit_types()
        .filter_map(|t| catalog.get(t).map(|p| (t, p.max_velocity)))
        .filter(|(_, v)| *v > 0.0)
        .collect();
    movers.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (Some(&(slow, _)), Some(&(fast, _))) = (movers.first(), movers.last()) else {
        return results;
    };

    let mut engine = match engine(config, catalog) {
        Ok(e) => e,
        Err(e) => {
            results.push(setup_failed("follow_engine", e));
            return results;
        }
    };
    let spawned = engine
        .spawn_unit(1u64, slow, Vec2::new(0.0, 0.0))
        .and_then(|()| engine.spawn_unit(2u64, fast, Vec2::new(-600.0, 300.0)));
    if let Err(e) = spawned {
        results.push(setup_failed("follow_spawn", e));
        return results;
    }
    engine.commands().add(move_order(&[1], 300.0, 200.0));
    engine.commands().add(
        Command::new(ids::ENTITY_FOLLOW)
            .with_targets([2u64])
            .with_field("targetEntity", 1),
    );

    let mut error = None;
    for _ in 0..ORDER_TICK_LIMIT {
        if let Err(e) = engine.tick() {
            error = Some(e);
            break;
        }
    }
    let leader = engine.position(1u64).unwrap_or(Vec2::ZERO);
    let follower = engine.position(2u64).unwrap_or(Vec2::ZERO);
    let gap = leader.distance(&follower);
    let reach =
        catalog.get(fast).map_or(0.0, |p| p.max_target_drag_threshold) + config.follow_distance;
    results.push(TestResult {
        name: "follow_converges".into(),
        passed: error.is_none() && gap <= reach * 2.0,
        detail: format!("{} trailing {} by {:.1}", fast, slow, gap),
    });
    if verbose {
        println!(
            "  leader ({:.1}, {:.1}) follower ({:.1}, {:.1})",
            leader.x, leader.y, follower.x, follower.y
        );
    }

    let released = engine.despawn(1u64).and_then(|()| engine.tick());
    results.push(TestResult {
        name: "follow_dropped_with_target".into(),
        passed: released.is_ok() && engine.following(2u64).is_none(),
        detail: match released {
            Ok(()) => "follower released when its target despawned".into(),
            Err(e) => e.to_string(),
        },
    });

    results
}

// ── 6. Random Orders ────────────────────────────────────────────────────

fn validate_random_orders(
    config: &SimConfig,
    catalog: &UnitCatalog,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Random Orders ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0x5f17_e5);

    let types: Vec<&str> = catalog
        .unit_types()
        .filter(|t| catalog.get(t).is_some_and(|p| p.max_velocity > 0.0))
        .collect();
    if types.is_empty() {
        return results;
    }
    let mut engine = match engine(config, catalog) {
        Ok(e) => e,
        Err(e) => {
            results.push(setup_failed("random_engine", e));
            return results;
        }
    };

    let units = 64u64;
    for id in 0..units {
        let unit_type = types[rng.gen_range(0..types.len())];
        let position = Vec2::new(rng.gen_range(-1000.0..1000.0), rng.gen_range(-1000.0..1000.0));
        if let Err(e) = engine.spawn_unit(id, unit_type, position) {
            results.push(setup_failed("random_spawn", e));
            return results;
        }
    }

    let mut errors = 0;
    for round in 0..5 {
        for id in 0..units {
            if rng.gen_bool(0.5) {
                let x = rng.gen_range(-1000.0..1000.0);
                let y = rng.gen_range(-1000.0..1000.0);
                engine.commands().add(move_order(&[id], x, y).reset_activity_queue(true));
            } else if rng.gen_bool(0.2) {
                engine.commands().add(Command::new(ids::ENTITY_STOP).with_targets([id]));
            }
        }
        for _ in 0..rng.gen_range(30..240) {
            if let Err(e) = engine.tick() {
                debug!("Round {} tick failed: {}", round, e);
                errors += 1;
            }
        }
        if verbose {
            println!("  round {}: tick {}", round, engine.tick_count());
        }
    }
    // Let the slowest unit cross the whole map
    for _ in 0..ORDER_TICK_LIMIT * 12 {
        if engine.tick().is_err() {
            errors += 1;
        }
        if (0..units).all(|id| engine.effects(id).is_some_and(|q| q.is_empty())) {
            break;
        }
    }

    let finite = (0..units).all(|id| {
        engine
            .position(id)
            .is_some_and(|p| p.x.is_finite() && p.y.is_finite())
    });
    let idle = (0..units)
        .filter(|id| engine.effects(*id).is_some_and(|q| q.is_empty()))
        .count();
    results.push(TestResult {
        name: "random_no_errors".into(),
        passed: errors == 0,
        detail: format!("{} failed ticks over {} ticks", errors, engine.tick_count()),
    });
    results.push(TestResult {
        name: "random_positions_finite".into(),
        passed: finite,
        detail: format!("{} units", units),
    });
    results.push(TestResult {
        name: "random_all_settle".into(),
        passed: idle as u64 == units,
        detail: format!("{}/{} units idle", idle, units),
    });

    // The default order is the full six-effect sequence
    results.push(TestResult {
        name: "random_default_sequence".into(),
        passed: config.default_movement_effects == movement_sequence(),
        detail: format!("{} effects per order", config.default_movement_effects.len()),
    });

    results
}
