//! Director integration tests
//!
//! Buffered commands, removal mid-tick and registration errors.

use arena_bots::ai::{ArbitrationEngine, BehaviorKind, PersonalityProfile};
use arena_bots::core::{BotError, EntityId, Vec2};
use arena_bots::simulation::{BotDirector, BotSpec};
use arena_bots::world::{PlayerState, Registry, WeaponClass, WeaponStats, WorldSnapshot};

fn director() -> BotDirector {
    BotDirector::new(ArbitrationEngine::with_seed(21).unwrap(), Registry::with_defaults())
}

fn arena(ids: &[u32]) -> WorldSnapshot {
    let mut world = WorldSnapshot::new(0.0);
    for (i, &id) in ids.iter().enumerate() {
        let team = (i % 2 + 1) as u8;
        world.players.push(PlayerState::new(EntityId(id), team, Vec2::new(i as f32 * 120.0, 0.0)));
    }
    world
}

#[test]
fn test_commands_drain_in_id_order() {
    let mut director = director();
    let ids = [9, 3, 5, 1];
    for id in ids {
        director.add_bot(BotSpec::new(EntityId(id), PersonalityProfile::default())).unwrap();
    }
    let world = arena(&ids);

    assert_eq!(director.decide(&world, 0.05), 4);
    let drained: Vec<u32> = director.drain_commands().into_iter().map(|(id, _)| id.0).collect();
    assert_eq!(drained, vec![1, 3, 5, 9]);
    assert!(director.drain_commands().is_empty());
}

#[test]
fn test_buffered_commands_do_not_leak_into_snapshot() {
    let mut director = director();
    for id in [1, 2] {
        director.add_bot(BotSpec::new(EntityId(id), PersonalityProfile::default())).unwrap();
    }
    let world = arena(&[1, 2]);
    let before = world.players.clone();
    director.decide(&world, 0.05);
    for (a, b) in before.iter().zip(&world.players) {
        assert_eq!(a.position, b.position);
    }
}

#[test]
fn test_removed_bot_loses_pending_command() {
    let mut director = director();
    for id in [1, 2] {
        director.add_bot(BotSpec::new(EntityId(id), PersonalityProfile::default())).unwrap();
    }
    let world = arena(&[1, 2]);
    director.decide(&world, 0.05);

    assert!(director.remove_bot(EntityId(2)).is_some());
    assert!(director.remove_bot(EntityId(2)).is_none());
    let drained = director.drain_commands();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].0, EntityId(1));

    // The player is still in the snapshot; the bot is gone
    assert_eq!(director.run_tick(&world, 0.05).len(), 1);
}

#[test]
fn test_registration_errors() {
    let mut director = director();
    director.add_bot(BotSpec::new(EntityId(1), PersonalityProfile::default())).unwrap();
    assert!(matches!(
        director.add_bot(BotSpec::new(EntityId(1), PersonalityProfile::default())),
        Err(BotError::DuplicateBot(_))
    ));
    assert!(matches!(
        director.add_bot(BotSpec::new(EntityId(2), PersonalityProfile::default()).with_utility("jetpack")),
        Err(BotError::UnknownUtility(_))
    ));
    assert!(matches!(
        BotSpec::from_preset(EntityId(3), director.registry(), "nobody"),
        Err(BotError::UnknownPreset(_))
    ));
}

#[test]
fn test_zero_magazine_rejected_at_construction() {
    let mut registry = Registry::with_defaults();
    let broken = WeaponStats {
        name: "jammed".into(),
        class: WeaponClass::Rifle,
        range: 500.0,
        projectile_speed: 1000.0,
        accuracy: 0.5,
        magazine_size: 0,
        fire_interval: 0.1,
        reload_time: 1.0,
    };
    assert!(matches!(registry.add_weapon(broken), Err(BotError::InvalidWeapon { .. })));

    let parsed = Registry::from_toml_str(
        r#"
        [[weapons]]
        name = "jammed"
        class = "rifle"
        range = 500.0
        projectile_speed = 1000.0
        accuracy = 0.5
        magazine_size = 0
        fire_interval = 0.1
        reload_time = 1.0
        "#,
    );
    assert!(matches!(parsed, Err(BotError::InvalidWeapon { .. })));
}

#[test]
fn test_every_bot_has_a_behavior_after_first_tick() {
    let mut director = director();
    let ids = [1, 2, 3, 4, 5, 6];
    for id in ids {
        director.add_bot(BotSpec::new(EntityId(id), PersonalityProfile::default())).unwrap();
    }
    let mut world = arena(&ids);
    for step in 0..20 {
        world.time = step as f32 * 0.05;
        director.run_tick(&world, 0.05);
        for id in ids {
            assert!(director.active_behavior(EntityId(id)).is_some());
        }
    }
    // Teams alternate 120 units apart: everyone is in a fight
    assert_eq!(director.active_behavior(EntityId(1)), Some(BehaviorKind::Combat));
}
