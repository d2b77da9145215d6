//! Headless Arena Runner
//!
//! Runs a bot-only match on toy kinematics and prints a JSON summary.
//! Movement, hits and pickups here are deliberately crude; they only exist
//! to feed the decision engine a changing world.

use std::collections::BTreeMap;
use std::path::Path;

use arena_bots::ai::{ArbitrationEngine, BehaviorKind, Command, PersonalityProfile};
use arena_bots::core::{AiConfig, EntityId, Seconds, Vec2, WorldBounds};
use arena_bots::simulation::{BotDirector, BotSpec};
use arena_bots::world::{
    load_personality, BaseState, LootKind, LootStationState, PlayerState, Registry, WorldSnapshot,
    ZoneKind, ZoneState,
};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

const WALK_SPEED: f32 = 220.0;
const SPRINT_FACTOR: f32 = 1.5;
const HIT_RADIUS: f32 = 40.0;
const SHOT_DAMAGE: f32 = 12.0;
const RESPAWN_DELAY: Seconds = 3.0;
const PICKUP_RADIUS: f32 = 30.0;
const LOOT_RESPAWN: Seconds = 10.0;
const PRESETS: [&str; 4] = ["default", "berserker", "sniper", "guardian"];

/// Headless Arena Runner - bot-only matches for tuning
#[derive(Parser, Debug)]
#[command(name = "arena_runner")]
#[command(about = "Run a bot-only arena match and output a summary")]
struct Args {
    /// Number of bots, split across two teams
    #[arg(long, default_value_t = 8)]
    bots: u32,

    /// Ticks to simulate
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Personality preset for every bot (loaded from data/personalities/);
    /// presets rotate when absent
    #[arg(long)]
    personality: Option<String>,

    /// Everyone against everyone
    #[arg(long)]
    ffa: bool,
}

/// Per-bot line of the summary
#[derive(Serialize)]
struct BotSummary {
    id: u32,
    team: u8,
    personality: String,
    weapon: String,
    kills: u32,
    deaths: u32,
    decisions: u64,
    final_behavior: Option<BehaviorKind>,
    /// Ticks spent in each behavior
    behavior_ticks: BTreeMap<String, u64>,
}

/// JSON output structure
#[derive(Serialize)]
struct MatchResult {
    ticks: u64,
    seed: u64,
    bots: Vec<BotSummary>,
    zone_holder: Option<u8>,
}

/// Runner-side state the snapshot does not carry
#[derive(Default)]
struct Ledger {
    last_shot: Seconds,
    reload_done: Option<Seconds>,
    respawn_at: Option<Seconds>,
    utility_ready_at: Seconds,
    behavior_ticks: BTreeMap<String, u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arena_bots=info".parse().unwrap_or_else(|_| tracing::Level::INFO.into())),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let registry = Registry::load(Path::new("data/weapons.toml")).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load data/weapons.toml: {}", e);
        eprintln!("Using built-in weapon tables");
        Registry::with_defaults()
    });

    let engine = match ArbitrationEngine::new(AiConfig::default(), &BehaviorKind::ALL, seed) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let mut director = BotDirector::new(engine, registry);
    let mut world = spawn_world(&args, &mut rng);
    let mut names = BTreeMap::new();

    for player in &world.players {
        let preset = args
            .personality
            .clone()
            .unwrap_or_else(|| PRESETS[player.id.0 as usize % PRESETS.len()].to_string());
        let personality = load_personality(&preset).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load personality '{}': {}", preset, e);
            eprintln!("Using default personality");
            PersonalityProfile::default()
        });
        if let Err(e) = director.add_bot(BotSpec::new(player.id, personality)) {
            eprintln!("Error: could not add bot {}: {}", player.id, e);
            std::process::exit(1);
        }
        names.insert(player.id, preset);
    }

    tracing::info!(bots = director.len(), seed, ticks = args.ticks, "match started");

    let mut ledgers: BTreeMap<EntityId, Ledger> = world.players.iter().map(|p| (p.id, Ledger::default())).collect();
    for _ in 0..args.ticks {
        let commands = director.run_tick(&world, args.dt);
        world.time += args.dt;
        apply_commands(&mut world, &director, &commands, &mut ledgers, args.dt);
        advance_world(&mut world, &director, &mut ledgers, args.dt);
        for (&id, ledger) in ledgers.iter_mut() {
            if let Some(kind) = director.active_behavior(id) {
                *ledger.behavior_ticks.entry(kind.to_string()).or_default() += 1;
            }
        }
    }

    let bots = world
        .players
        .iter()
        .map(|p| {
            let bot = director.bot(p.id);
            BotSummary {
                id: p.id.0,
                team: p.team,
                personality: names.get(&p.id).cloned().unwrap_or_default(),
                weapon: bot.map(|b| b.loadout().weapon.name.clone()).unwrap_or_default(),
                kills: p.kills,
                deaths: p.deaths,
                decisions: bot.map_or(0, |b| b.decisions()),
                final_behavior: director.active_behavior(p.id),
                behavior_ticks: ledgers.remove(&p.id).map(|l| l.behavior_ticks).unwrap_or_default(),
            }
        })
        .collect();
    let result = MatchResult {
        ticks: args.ticks,
        seed,
        bots,
        zone_holder: world.zones.first().and_then(|z| z.controlling_team),
    };
    tracing::info!(seed, "match finished");

    match args.format.as_str() {
        "json" => print_json(&result),
        "text" => {
            println!("Match Result");
            println!("============");
            println!("Ticks: {}  Seed: {}", result.ticks, result.seed);
            println!("Zone holder: {:?}", result.zone_holder);
            println!();
            for bot in &result.bots {
                println!(
                    "#{:<3} team {} {:<10} {:<8} K/D {}/{}  now {:?}",
                    bot.id,
                    bot.team,
                    bot.personality,
                    bot.weapon,
                    bot.kills,
                    bot.deaths,
                    bot.final_behavior
                );
            }
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            print_json(&result);
        }
    }
}

fn print_json(result: &MatchResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize result: {}", e),
    }
}

/// Two team bases, a hill in the middle and a few pickups
fn spawn_world(args: &Args, rng: &mut ChaCha8Rng) -> WorldSnapshot {
    let mut world = WorldSnapshot::new(0.0);
    world.bounds = WorldBounds::new(Vec2::new(-1500.0, -1000.0), Vec2::new(1500.0, 1000.0));

    for i in 0..args.bots {
        let team = if args.ffa { 0 } else { (i % 2 + 1) as u8 };
        let side = if team == 2 { 1.0 } else { -1.0 };
        let position = Vec2::new(
            side * rng.gen_range(900.0..1300.0),
            rng.gen_range(-700.0..700.0),
        );
        world.players.push(PlayerState::new(EntityId(i + 1), team, position));
    }

    world.zones.push(ZoneState {
        id: EntityId(500),
        kind: ZoneKind::Hill,
        position: Vec2::ZERO,
        radius: 150.0,
        controlling_team: None,
        contested: false,
        active: true,
    });
    if !args.ffa {
        for (id, team, x) in [(600, 1, -1350.0), (601, 2, 1350.0)] {
            world.bases.push(BaseState {
                id: EntityId(id),
                team,
                owner: None,
                position: Vec2::new(x, 0.0),
                radius: 80.0,
                health: 2000.0,
                max_health: 2000.0,
                active: true,
            });
        }
    }
    for (id, kind, position) in [
        (700, LootKind::Health, Vec2::new(0.0, 600.0)),
        (701, LootKind::Health, Vec2::new(0.0, -600.0)),
        (702, LootKind::Ammo, Vec2::new(-600.0, 0.0)),
        (703, LootKind::Ammo, Vec2::new(600.0, 0.0)),
    ] {
        world.loot_stations.push(LootStationState {
            id: EntityId(id),
            kind,
            position,
            value: 0.5,
            available: true,
            respawn_in: 0.0,
        });
    }
    world
}

fn apply_commands(
    world: &mut WorldSnapshot,
    director: &BotDirector,
    commands: &[(EntityId, Command)],
    ledgers: &mut BTreeMap<EntityId, Ledger>,
    dt: Seconds,
) {
    let now = world.time;
    let mut hits: Vec<(EntityId, Vec2, f32)> = Vec::new();

    for (id, command) in commands {
        let (Some(bot), Some(ledger)) = (director.bot(*id), ledgers.get_mut(id)) else {
            continue;
        };
        let weapon = &bot.loadout().weapon;
        let Some(player) = world.players.iter_mut().find(|p| p.id == *id) else {
            continue;
        };

        let speed = WALK_SPEED * if command.sprint { SPRINT_FACTOR } else { 1.0 };
        player.velocity = command.movement * speed;
        player.position = world.bounds.clamp(player.position + player.velocity * dt);

        if command.reload && ledger.reload_done.is_none() {
            ledger.reload_done = Some(now + weapon.reload_time);
        }
        if command.secondary && player.utility_ready {
            player.utility_ready = false;
            ledger.utility_ready_at = now + bot.loadout().utility.as_ref().map_or(10.0, |u| u.cooldown);
        }
        let can_shoot = ledger.reload_done.is_none() && now - ledger.last_shot >= weapon.fire_interval;
        if command.fire && can_shoot && player.ammo > 0 {
            player.ammo -= 1;
            ledger.last_shot = now;
            if player.position.distance(command.aim) <= weapon.range {
                hits.push((player.id, command.aim, SHOT_DAMAGE));
            }
        }
    }

    for (shooter, aim, damage) in hits {
        let shooter_team = world.player(shooter).map_or(0, |p| p.team);
        let victim = world
            .players
            .iter_mut()
            .filter(|p| {
                p.active
                    && p.id != shooter
                    && (shooter_team == 0 || p.team != shooter_team)
                    && p.position.distance(aim) <= HIT_RADIUS
            })
            .min_by(|a, b| a.position.distance(aim).total_cmp(&b.position.distance(aim)));
        let Some(victim) = victim else { continue };
        victim.health -= damage;
        if victim.health > 0.0 {
            continue;
        }
        victim.active = false;
        victim.deaths += 1;
        let victim_id = victim.id;
        if let Some(ledger) = ledgers.get_mut(&victim_id) {
            ledger.respawn_at = Some(now + RESPAWN_DELAY);
        }
        if let Some(killer) = world.players.iter_mut().find(|p| p.id == shooter) {
            killer.kills += 1;
        }
        tracing::debug!(killer = %shooter, victim = %victim_id, "kill");
    }
}

/// Reloads, respawns, pickups and zone ownership
fn advance_world(
    world: &mut WorldSnapshot,
    director: &BotDirector,
    ledgers: &mut BTreeMap<EntityId, Ledger>,
    dt: Seconds,
) {
    let now = world.time;
    let spawn = world.bounds.center();

    for player in world.players.iter_mut() {
        let (Some(bot), Some(ledger)) = (director.bot(player.id), ledgers.get_mut(&player.id)) else {
            continue;
        };
        let magazine = bot.loadout().weapon.magazine_size;
        if ledger.reload_done.is_some_and(|t| now >= t) {
            player.ammo = magazine;
            ledger.reload_done = None;
        }
        if !player.utility_ready && now >= ledger.utility_ready_at {
            player.utility_ready = true;
        }
        if ledger.respawn_at.is_some_and(|t| now >= t) {
            let side = if player.team == 2 { 1.0 } else { -1.0 };
            player.position = Vec2::new(spawn.x + side * 1200.0, spawn.y);
            player.health = player.max_health;
            player.ammo = magazine;
            player.active = true;
            ledger.respawn_at = None;
            ledger.reload_done = None;
        }
    }

    for station in world.loot_stations.iter_mut() {
        if !station.available {
            station.respawn_in = (station.respawn_in - dt).max(0.0);
            station.available = station.respawn_in <= 0.0;
            continue;
        }
        let taker = world
            .players
            .iter_mut()
            .find(|p| p.active && p.position.distance(station.position) <= PICKUP_RADIUS);
        if let Some(player) = taker {
            match station.kind {
                LootKind::Health => player.health = player.max_health,
                LootKind::Armor => player.max_health = (player.max_health + 10.0).min(150.0),
                LootKind::Ammo | LootKind::Weapon => {
                    if let Some(bot) = director.bot(player.id) {
                        player.ammo = bot.loadout().weapon.magazine_size;
                    }
                }
            }
            station.available = false;
            station.respawn_in = LOOT_RESPAWN;
        }
    }

    for zone in world.zones.iter_mut() {
        let mut teams: Vec<u8> = world
            .players
            .iter()
            .filter(|p| p.active && zone.contains(p.position))
            .map(|p| p.team)
            .collect();
        teams.sort_unstable();
        teams.dedup();
        zone.contested = teams.len() > 1;
        if let [team] = teams.as_slice() {
            zone.controlling_team = Some(*team);
        }
    }
}
