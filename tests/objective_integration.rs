//! Objective-mode integration tests
//!
//! The commitment window that keeps a bot on its objective, and objective
//! behaviors winning arbitration through the engine.

use arena_bots::ai::behaviors::{Commitment, COMMITMENT_BONUS, COMMITMENT_WINDOW};
use arena_bots::ai::{ArbitrationEngine, BehaviorKind, BehaviorState, Loadout, PersonalityProfile};
use arena_bots::core::{EntityId, Vec2};
use arena_bots::world::{BaseState, FlagState, PlayerState, Registry, WorldSnapshot, ZoneKind, ZoneState};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Zone {
    A,
    B,
}

#[test]
fn test_commitment_constants() {
    assert_eq!(COMMITMENT_WINDOW, 8.0);
    assert_eq!(COMMITMENT_BONUS, 25.0);
}

#[test]
fn test_commitment_retains_zone_a_inside_window() {
    let mut commitment = Commitment::default();
    assert_eq!(commitment.choose(&[(Zone::A, 30.0), (Zone::B, 28.0)], 0.0), Some(Zone::A));

    // B is 20 points better at t=3 but A is still committed
    assert_eq!(commitment.choose(&[(Zone::A, 30.0), (Zone::B, 50.0)], 3.0), Some(Zone::A));
    assert_eq!(commitment.choose(&[(Zone::A, 30.0), (Zone::B, 50.0)], 6.0), Some(Zone::A));

    // Keeping A did not renew the window
    assert_eq!(commitment.choose(&[(Zone::A, 30.0), (Zone::B, 50.0)], 8.5), Some(Zone::B));
}

#[test]
fn test_commitment_yields_to_invalid_or_much_better() {
    let mut commitment = Commitment::default();
    commitment.choose(&[(Zone::A, 30.0), (Zone::B, 28.0)], 0.0);
    assert_eq!(commitment.choose(&[(Zone::A, 30.0), (Zone::B, 56.0)], 3.0), Some(Zone::B));

    let mut commitment = Commitment::default();
    commitment.choose(&[(Zone::A, 30.0), (Zone::B, 28.0)], 0.0);
    assert_eq!(commitment.choose(&[(Zone::B, 10.0)], 3.0), Some(Zone::B));
    assert_eq!(commitment.choose(&[], 4.0), None);
}

fn engine_bot(engine: &ArbitrationEngine) -> arena_bots::ai::Bot {
    let registry = Registry::with_defaults();
    let personality = PersonalityProfile::default();
    let loadout = Loadout::resolve(&registry, &personality, Some("rifle"), None).unwrap();
    engine.enroll(EntityId(1), personality, loadout).unwrap()
}

#[test]
fn test_flag_carrier_runs_home_without_firing() {
    let mut engine = ArbitrationEngine::with_seed(8).unwrap();
    let mut bot = engine_bot(&engine);

    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    world.players.push(PlayerState::new(EntityId(2), 2, Vec2::new(150.0, 0.0)));
    world.flags.push(FlagState {
        id: EntityId(40),
        team: 2,
        home: Vec2::new(1000.0, 0.0),
        position: Vec2::ZERO,
        carrier: Some(EntityId(1)),
        at_home: false,
    });
    world.flags.push(FlagState {
        id: EntityId(41),
        team: 1,
        home: Vec2::new(-1000.0, 0.0),
        position: Vec2::new(-1000.0, 0.0),
        carrier: None,
        at_home: true,
    });

    let command = engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::FlagCarry));
    assert!(!command.fire);
    assert!(command.sprint);
    assert!(command.movement.x < 0.0);
}

#[test]
fn test_zone_control_picks_a_zone() {
    let mut engine = ArbitrationEngine::with_seed(8).unwrap();
    let mut bot = engine_bot(&engine);

    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    for (id, x) in [(60, -300.0), (61, 600.0)] {
        world.zones.push(ZoneState {
            id: EntityId(id),
            kind: ZoneKind::Hill,
            position: Vec2::new(x, 0.0),
            radius: 100.0,
            controlling_team: None,
            contested: false,
            active: true,
        });
    }

    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::ZoneControl));
    let committed = match bot.behavior(BehaviorKind::ZoneControl) {
        Some(BehaviorState::ZoneControl(zone)) => zone.committed(),
        _ => None,
    };
    assert_eq!(committed, Some(EntityId(60)));
}

#[test]
fn test_disabled_modes_score_zero() {
    let mut engine = ArbitrationEngine::with_seed(8).unwrap();
    let mut bot = engine_bot(&engine);
    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::Idle));
}

#[test]
fn test_interceptor_keeps_moving_inside_optimal_range() {
    let mut engine = ArbitrationEngine::with_seed(8).unwrap();
    let mut bot = engine_bot(&engine);

    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    world.players.push(PlayerState::new(EntityId(2), 2, Vec2::new(300.0, 0.0)));
    world.bases.push(BaseState {
        id: EntityId(31),
        team: 1,
        owner: None,
        position: Vec2::ZERO,
        radius: 60.0,
        health: 500.0,
        max_health: 500.0,
        active: true,
    });

    // Rifle optimal range is 420: the intruder is already close enough to fight
    for step in 1..=60 {
        world.time = step as f32 * 0.05;
        let command = engine.tick(&mut bot, &world, 0.05).unwrap();
        assert_eq!(bot.active_behavior(), Some(BehaviorKind::Defense));
        assert!(
            command.movement.length() > 0.05,
            "stopped at step {}: {:?}",
            step,
            command.movement
        );
    }
}
