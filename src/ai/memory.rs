//! Per-bot memory of other entities (partial observability)
//!
//! A bot only remembers what it has seen. Entries carry the simulation time
//! of the last sighting and disappear once older than their TTL, both from
//! queries (immediately) and from storage (at the next sweep).

use ahash::AHashMap;

use crate::core::types::{EntityId, Seconds, Vec2};
use crate::world::snapshot::PlayerState;

/// Mean speed (units/s) above which an entity is considered aggressive
const AGGRESSIVE_SPEED: f32 = 150.0;
/// Mean speed below which an entity that has been seen enough is defensive
const DEFENSIVE_SPEED: f32 = 50.0;
/// Sightings needed before behavior flags are trusted
const MIN_SAMPLES_FOR_FLAGS: u32 = 5;
/// Kill/death ratio that marks an entity as aggressive on its own
const AGGRESSIVE_KD: f32 = 1.5;
/// Fraction of the gap to the observed threat level closed per sighting
const THREAT_NUDGE: f32 = 0.25;
/// Time constant of the recent kill/death tallies
const KD_WINDOW: Seconds = 15.0;

/// Running aggregate of an entity's movement (Welford incremental mean)
#[derive(Debug, Clone, Default)]
pub struct BehaviorPattern {
    pub samples: u32,
    pub mean_position: Vec2,
    pub mean_speed: f32,
    /// Sum of squared speed deviations (Welford M2)
    speed_m2: f32,
    pub aggressive: bool,
    pub defensive: bool,
}

impl BehaviorPattern {
    fn record(&mut self, position: Vec2, speed: f32, kd_ratio: f32) {
        self.samples += 1;
        let n = self.samples as f32;
        self.mean_position += (position - self.mean_position) / n;
        let delta = speed - self.mean_speed;
        self.mean_speed += delta / n;
        self.speed_m2 += delta * (speed - self.mean_speed);

        self.aggressive = self.mean_speed >= AGGRESSIVE_SPEED || kd_ratio >= AGGRESSIVE_KD;
        self.defensive = !self.aggressive
            && self.samples >= MIN_SAMPLES_FOR_FLAGS
            && self.mean_speed < DEFENSIVE_SPEED;
    }

    /// Sample variance of observed speed
    pub fn speed_variance(&self) -> f32 {
        if self.samples < 2 {
            return 0.0;
        }
        self.speed_m2 / (self.samples - 1) as f32
    }
}

/// What a bot remembers about one entity
#[derive(Debug, Clone)]
pub struct EntityMemory {
    pub last_position: Vec2,
    pub last_velocity: Vec2,
    pub last_seen: Seconds,
    /// Bounded [0, 1] estimate of how dangerous the entity is
    pub threat: f32,
    pub pattern: BehaviorPattern,
    /// Lifetime counters at the previous sighting
    kills_seen: u32,
    deaths_seen: u32,
    /// Kills and deaths witnessed since first sighting, decaying over `KD_WINDOW`
    recent_kills: f32,
    recent_deaths: f32,
}

impl EntityMemory {
    /// Kill/death ratio over what this bot has recently witnessed
    pub fn recent_kd(&self) -> f32 {
        self.recent_kills / self.recent_deaths.max(1.0)
    }

    /// Fold in the score change since the previous sighting
    fn tally(&mut self, player: &PlayerState, now: Seconds) {
        let decay = (-(now - self.last_seen).max(0.0) / KD_WINDOW).exp();
        // Counters going down means a new round; nothing was witnessed
        let kills = player.kills.saturating_sub(self.kills_seen);
        let deaths = player.deaths.saturating_sub(self.deaths_seen);
        self.recent_kills = self.recent_kills * decay + kills as f32;
        self.recent_deaths = self.recent_deaths * decay + deaths as f32;
        self.kills_seen = player.kills;
        self.deaths_seen = player.deaths;
    }
}

/// Observation that an objective was being fought over
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveMemory {
    pub position: Vec2,
    pub last_contested: Seconds,
}

/// Time-decayed observations held by a single bot
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entities: AHashMap<EntityId, EntityMemory>,
    objectives: AHashMap<EntityId, ObjectiveMemory>,
    entity_ttl: Seconds,
    objective_ttl: Seconds,
    last_sweep: Seconds,
}

impl MemoryStore {
    pub fn new(entity_ttl: Seconds, objective_ttl: Seconds) -> Self {
        Self {
            entities: AHashMap::new(),
            objectives: AHashMap::new(),
            entity_ttl,
            objective_ttl,
            last_sweep: 0.0,
        }
    }

    /// Record a sighting of a player at simulation time `now`
    ///
    /// The score a player had before it was first seen is a baseline, not
    /// recent form: only kills and deaths witnessed since then count.
    pub fn observe(&mut self, player: &PlayerState, now: Seconds) {
        let speed = player.velocity.length();
        let entry = self.entities.entry(player.id).or_insert_with(|| EntityMemory {
            last_position: player.position,
            last_velocity: player.velocity,
            last_seen: now,
            threat: 0.0,
            pattern: BehaviorPattern::default(),
            kills_seen: player.kills,
            deaths_seen: player.deaths,
            recent_kills: 0.0,
            recent_deaths: 0.0,
        });
        entry.tally(player, now);
        let kd_ratio = entry.recent_kd();

        let observed_threat = 0.5 * (kd_ratio / 3.0).min(1.0)
            + 0.3 * player.health_fraction()
            + 0.2 * (speed / 300.0).min(1.0);

        entry.last_position = player.position;
        entry.last_velocity = player.velocity;
        // Timestamps never move backwards even if a stale snapshot slips in
        entry.last_seen = entry.last_seen.max(now);
        entry.threat = (entry.threat + THREAT_NUDGE * (observed_threat - entry.threat)).clamp(0.0, 1.0);
        entry.pattern.record(player.position, speed, kd_ratio);
    }

    /// Remember that an objective was contested at `now`
    pub fn mark_contested(&mut self, objective: EntityId, position: Vec2, now: Seconds) {
        let entry = self.objectives.entry(objective).or_insert(ObjectiveMemory {
            position,
            last_contested: now,
        });
        entry.position = position;
        entry.last_contested = entry.last_contested.max(now);
    }

    /// Memory of an entity if it is still fresh at `now`
    pub fn recall(&self, id: EntityId, now: Seconds) -> Option<&EntityMemory> {
        self.entities
            .get(&id)
            .filter(|m| now - m.last_seen <= self.entity_ttl)
    }

    /// Whether the objective was seen contested within the objective TTL
    pub fn was_contested(&self, objective: EntityId, now: Seconds) -> bool {
        self.objectives
            .get(&objective)
            .is_some_and(|m| now - m.last_contested <= self.objective_ttl)
    }

    /// All fresh entity memories
    pub fn fresh_entities(&self, now: Seconds) -> impl Iterator<Item = (EntityId, &EntityMemory)> {
        let ttl = self.entity_ttl;
        self.entities
            .iter()
            .filter(move |(_, m)| now - m.last_seen <= ttl)
            .map(|(id, m)| (*id, m))
    }

    /// Drop expired entries if the sweep interval has elapsed; returns evictions
    pub fn sweep_if_due(&mut self, now: Seconds, interval: Seconds) -> usize {
        if now - self.last_sweep < interval {
            return 0;
        }
        self.sweep(now)
    }

    /// Drop every expired entry
    pub fn sweep(&mut self, now: Seconds) -> usize {
        self.last_sweep = now;
        let before = self.entities.len() + self.objectives.len();
        let entity_ttl = self.entity_ttl;
        let objective_ttl = self.objective_ttl;
        self.entities.retain(|_, m| now - m.last_seen <= entity_ttl);
        self.objectives.retain(|_, m| now - m.last_contested <= objective_ttl);
        before - (self.entities.len() + self.objectives.len())
    }

    /// Number of stored (possibly stale, not yet swept) entries
    pub fn len(&self) -> usize {
        self.entities.len() + self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
