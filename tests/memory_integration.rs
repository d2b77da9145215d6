//! Memory integration tests
//!
//! TTL boundaries for both memory kinds, and memory-driven pursuit once a
//! target drops out of sight.

use arena_bots::ai::{ArbitrationEngine, BehaviorKind, Loadout, MemoryStore, PersonalityProfile};
use arena_bots::core::{EntityId, Vec2};
use arena_bots::world::{PlayerState, Registry, WorldSnapshot, ZoneKind, ZoneState};

const EPSILON: f32 = 0.01;

#[test]
fn test_entity_ttl_boundary() {
    let mut store = MemoryStore::new(10.0, 30.0);
    let t0 = 5.0;
    store.observe(&PlayerState::new(EntityId(2), 2, Vec2::new(40.0, 0.0)), t0);

    assert!(store.recall(EntityId(2), t0 + 10.0 - EPSILON).is_some());
    assert!(store.recall(EntityId(2), t0 + 10.0 + EPSILON).is_none());
}

#[test]
fn test_objective_ttl_boundary() {
    let mut store = MemoryStore::new(10.0, 30.0);
    let t0 = 5.0;
    store.mark_contested(EntityId(60), Vec2::ZERO, t0);

    assert!(store.was_contested(EntityId(60), t0 + 30.0 - EPSILON));
    assert!(!store.was_contested(EntityId(60), t0 + 30.0 + EPSILON));
}

#[test]
fn test_sweep_evicts_each_kind_at_its_own_ttl() {
    let mut store = MemoryStore::new(10.0, 30.0);
    store.observe(&PlayerState::new(EntityId(2), 2, Vec2::ZERO), 0.0);
    store.mark_contested(EntityId(60), Vec2::ZERO, 0.0);
    assert_eq!(store.len(), 2);

    assert_eq!(store.sweep(10.0 + EPSILON), 1);
    assert_eq!(store.len(), 1);
    assert_eq!(store.sweep(30.0 + EPSILON), 1);
    assert!(store.is_empty());
}

#[test]
fn test_timestamps_never_move_backwards() {
    let mut store = MemoryStore::new(10.0, 30.0);
    let player = PlayerState::new(EntityId(2), 2, Vec2::ZERO);
    store.observe(&player, 8.0);
    store.observe(&player, 3.0);
    assert_eq!(store.recall(EntityId(2), 8.0).map(|m| m.last_seen), Some(8.0));
}

#[test]
fn test_bot_remembers_contested_zone() {
    let registry = Registry::with_defaults();
    let personality = PersonalityProfile::default();
    let loadout = Loadout::resolve(&registry, &personality, Some("rifle"), None).unwrap();
    let mut engine = ArbitrationEngine::with_seed(2).unwrap();
    let mut bot = engine.enroll(EntityId(1), personality, loadout).unwrap();

    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    world.zones.push(ZoneState {
        id: EntityId(60),
        kind: ZoneKind::Hill,
        position: Vec2::new(400.0, 0.0),
        radius: 100.0,
        controlling_team: None,
        contested: true,
        active: true,
    });
    engine.tick(&mut bot, &world, 0.1);
    assert!(bot.memory().was_contested(EntityId(60), 29.0));
}

#[test]
fn test_lost_target_is_chased_until_timeout() {
    let registry = Registry::with_defaults();
    let personality = PersonalityProfile::default();
    let loadout = Loadout::resolve(&registry, &personality, Some("rifle"), None).unwrap();
    let mut engine = ArbitrationEngine::with_seed(4).unwrap();
    let mut bot = engine.enroll(EntityId(1), personality, loadout).unwrap();

    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    world.players.push(PlayerState::new(EntityId(2), 2, Vec2::new(300.0, 0.0)));

    let dt = 0.1;
    let mut step = |world: &mut WorldSnapshot| {
        let command = engine.tick(&mut bot, world, dt).unwrap();
        world.time += dt;
        (command, bot.active_behavior(), bot.clock())
    };

    for _ in 0..6 {
        let (_, active, _) = step(&mut world);
        assert_eq!(active, Some(BehaviorKind::Combat));
    }

    // Out of perception range: only memory knows where it went
    world.players[1].position = Vec2::new(1500.0, 0.0);
    let mut chased = None;
    while chased.is_none() {
        let (command, active, clock) = step(&mut world);
        if clock >= 2.0 {
            assert_eq!(active, Some(BehaviorKind::Combat));
            chased = Some(command);
        }
    }
    let movement = chased.map(|c| c.movement).unwrap_or_default();
    assert!(movement.x > 0.5, "heading for last known position: {:?}", movement);

    // Past the 3 s combat timeout Combat lets go
    let mut active = None;
    for _ in 0..30 {
        let (_, now_active, clock) = step(&mut world);
        active = now_active;
        if clock >= 4.5 {
            break;
        }
    }
    assert_eq!(active, Some(BehaviorKind::Idle));
}
