//! Arbitration integration tests
//!
//! Drive the engine end-to-end through `tick` and check the hysteresis band,
//! the empty-catalog fallback and the command guarantees.

use arena_bots::ai::{
    arbitrate, ArbitrationEngine, Behavior, BehaviorKind, BehaviorState, DecisionContext, Incumbent, Loadout,
    MemoryStore, PersonalityProfile, Selection, TargetSelector,
};
use arena_bots::core::{AiConfig, EntityId, Vec2};
use arena_bots::world::{LootKind, LootStationState, PlayerState, Registry, WeaponClass, WeaponStats, WorldSnapshot};

fn rifle() -> Loadout {
    let registry = Registry::with_defaults();
    Loadout::resolve(&registry, &PersonalityProfile::default(), Some("rifle"), None).unwrap()
}

/// Weapon with a 300 unit range
fn carbine() -> Loadout {
    let weapon = WeaponStats {
        name: "carbine".into(),
        class: WeaponClass::Rifle,
        range: 300.0,
        projectile_speed: 1500.0,
        accuracy: 0.75,
        magazine_size: 25,
        fire_interval: 0.12,
        reload_time: 2.0,
    };
    Loadout::new(weapon, None).unwrap()
}

fn health_station(position: Vec2) -> LootStationState {
    LootStationState {
        id: EntityId(80),
        kind: LootKind::Health,
        position,
        value: 0.5,
        available: true,
        respawn_in: 0.0,
    }
}

#[test]
fn test_hysteresis_band_is_exactly_twenty_five() {
    let incumbent = Some(Incumbent { index: 0, continues: true });
    assert_eq!(arbitrate(&[50, 74], incumbent, 15, 10), Some(Selection::Stay(0)));
    assert_eq!(
        arbitrate(&[50, 76], incumbent, 15, 10),
        Some(Selection::Switch { from: Some(0), to: 1 })
    );
}

#[test]
fn test_combat_scenario_priority_and_selection() {
    let config = AiConfig::default();
    let personality = PersonalityProfile::default();
    let loadout = carbine();
    let memory = MemoryStore::new(config.entity_ttl, config.objective_ttl);
    let selector = TargetSelector::new(&config);

    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    let mut enemy = PlayerState::new(EntityId(2), 2, Vec2::new(100.0, 0.0));
    enemy.health = 50.0;
    world.players.push(enemy);

    let ctx = DecisionContext {
        me: &world.players[0],
        world: &world,
        personality: &personality,
        loadout: &loadout,
        memory: &memory,
        selector: &selector,
        clock: 0.0,
        perception_range: config.perception_range,
        previous_movement: Vec2::ZERO,
    };
    let combat = BehaviorState::new(BehaviorKind::Combat).priority(&ctx);
    let idle = BehaviorState::new(BehaviorKind::Idle).priority(&ctx);
    assert!(combat >= 85, "combat priority {}", combat);
    assert!(idle <= 15, "idle priority {}", idle);

    let mut engine = ArbitrationEngine::with_seed(3).unwrap();
    let mut bot = engine.enroll(EntityId(1), personality.clone(), loadout.clone()).unwrap();
    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::Combat));
}

#[test]
fn test_combat_takes_over_from_idle_when_enemy_appears() {
    let mut engine = ArbitrationEngine::with_seed(3).unwrap();
    let mut bot = engine.enroll(EntityId(1), PersonalityProfile::default(), carbine()).unwrap();
    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));

    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::Idle));

    world.time = 0.1;
    world.players.push(PlayerState::new(EntityId(2), 2, Vec2::new(100.0, 0.0)));
    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::Combat));
}

#[test]
fn test_incumbent_holds_inside_band_and_yields_past_it() {
    // Idle runs at 15. Health loot need scores 70 * deficit + 5.
    let mut engine = ArbitrationEngine::with_seed(5).unwrap();
    let mut bot = engine.enroll(EntityId(1), PersonalityProfile::default(), rifle()).unwrap();
    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
    world.loot_stations.push(health_station(Vec2::new(300.0, 0.0)));

    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::Idle));

    // 40 is not more than 15 + 25
    world.players[0].health = 50.0;
    world.time = 0.1;
    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::Idle));

    // 44 is
    world.players[0].health = 44.0;
    world.time = 0.2;
    engine.tick(&mut bot, &world, 0.1).unwrap();
    assert_eq!(bot.active_behavior(), Some(BehaviorKind::LootSeeking));
}

#[test]
fn test_empty_catalog_emits_neutral() {
    let mut engine = ArbitrationEngine::new(AiConfig::default(), &[], 1).unwrap();
    let mut bot = engine.enroll(EntityId(1), PersonalityProfile::default(), rifle()).unwrap();
    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::new(10.0, 20.0)));
    world.players.push(PlayerState::new(EntityId(2), 2, Vec2::new(60.0, 20.0)));

    for step in 0..3 {
        world.time = step as f32 * 0.1;
        let command = engine.tick(&mut bot, &world, 0.1).unwrap();
        assert_eq!(command.movement, Vec2::ZERO);
        assert!(!command.fire);
        assert!(bot.active_behavior().is_none());
    }
}

#[test]
fn test_empty_magazine_forces_reload() {
    let mut engine = ArbitrationEngine::with_seed(9).unwrap();
    let mut bot = engine.enroll(EntityId(1), PersonalityProfile::default(), rifle()).unwrap();
    let mut world = WorldSnapshot::new(0.0);
    let mut me = PlayerState::new(EntityId(1), 1, Vec2::ZERO);
    me.ammo = 0;
    world.players.push(me);
    world.players.push(PlayerState::new(EntityId(2), 2, Vec2::new(80.0, 0.0)));

    for step in 0..10 {
        world.time = step as f32 * 0.02;
        let command = engine.tick(&mut bot, &world, 0.02).unwrap();
        assert!(command.reload);
        assert!(!command.fire);
    }
}

#[test]
fn test_inactive_or_missing_player_emits_nothing() {
    let mut engine = ArbitrationEngine::with_seed(1).unwrap();
    let mut bot = engine.enroll(EntityId(1), PersonalityProfile::default(), rifle()).unwrap();
    let mut world = WorldSnapshot::new(0.0);
    assert!(engine.tick(&mut bot, &world, 0.05).is_none());

    let mut me = PlayerState::new(EntityId(1), 1, Vec2::ZERO);
    me.active = false;
    world.players.push(me);
    assert!(engine.tick(&mut bot, &world, 0.05).is_none());
    assert_eq!(bot.decisions(), 0);
}

#[test]
fn test_commands_held_between_decisions() {
    let mut engine = ArbitrationEngine::with_seed(1).unwrap();
    let mut bot = engine.enroll(EntityId(1), PersonalityProfile::default(), rifle()).unwrap();
    let mut world = WorldSnapshot::new(0.0);
    world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));

    // 0.05 s decision interval at 0.02 s ticks: decide, hold, hold, decide
    let expected = [1, 1, 1, 2];
    for decisions in expected {
        engine.tick(&mut bot, &world, 0.02).unwrap();
        assert_eq!(bot.decisions(), decisions);
    }
}

#[test]
fn test_same_seed_same_commands() {
    let run = || {
        let mut engine = ArbitrationEngine::with_seed(11).unwrap();
        let mut bot = engine.enroll(EntityId(1), PersonalityProfile::default(), rifle()).unwrap();
        let mut world = WorldSnapshot::new(0.0);
        world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
        world.players.push(PlayerState::new(EntityId(2), 2, Vec2::new(250.0, 40.0)));
        (0..20)
            .map(|step| {
                world.time = step as f32 * 0.05;
                engine.tick(&mut bot, &world, 0.05).unwrap()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
