//! Per-bot state: personality, equipment, memory, behavior instances,
//! decision timing and movement smoothing

use crate::ai::behaviors::{BehaviorKind, BehaviorState};
use crate::ai::command::Command;
use crate::ai::context::Loadout;
use crate::ai::memory::MemoryStore;
use crate::ai::personality::PersonalityProfile;
use crate::core::config::AiConfig;
use crate::core::error::Result;
use crate::core::types::{clamp_unit, same_team, EntityId, Seconds, Vec2};
use crate::world::snapshot::WorldSnapshot;

/// Movement below this length counts as standing still
const STOPPED: f32 = 0.05;

/// Damps per-tick direction changes by blending toward the requested movement
#[derive(Debug, Clone)]
pub struct MotionSmoother {
    previous: Vec2,
    target: Vec2,
    /// Fraction of the gap closed per tick, in (0, 1]
    blend: f32,
}

impl MotionSmoother {
    pub fn new(blend: f32) -> Self {
        Self {
            previous: Vec2::ZERO,
            target: Vec2::ZERO,
            blend: blend.clamp(0.01, 1.0),
        }
    }

    /// Blend factor for a personality: faster reactions turn quicker
    pub fn for_personality(config: &AiConfig, personality: &PersonalityProfile) -> Self {
        Self::new(config.base_blend + config.reaction_blend_bonus * personality.reaction_speed())
    }

    /// Next smoothed movement toward `target`
    ///
    /// A blend that would cancel out to (almost) nothing while the target
    /// asks for movement snaps to the target instead.
    pub fn smooth(&mut self, target: Vec2) -> Vec2 {
        self.target = target;
        let mut next = self.previous.lerp(target, self.blend);
        if next.length() < STOPPED && target.length() >= STOPPED {
            next = target;
        }
        self.previous = clamp_unit(next);
        self.previous
    }

    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }
}

/// One AI-controlled player
#[derive(Debug, Clone)]
pub struct Bot {
    pub(crate) id: EntityId,
    pub(crate) personality: PersonalityProfile,
    pub(crate) loadout: Loadout,
    pub(crate) memory: MemoryStore,
    /// One instance per catalog entry, in catalog order
    pub(crate) behaviors: Vec<BehaviorState>,
    /// Index into `behaviors`; set from the first decision on
    pub(crate) active: Option<usize>,
    /// Time left until the next full decision
    pub(crate) cooldown: Seconds,
    /// Accumulated simulation time; drives every periodic pattern
    pub(crate) clock: Seconds,
    /// Time since the previous full decision
    pub(crate) since_decision: Seconds,
    pub(crate) decisions: u64,
    pub(crate) motion: MotionSmoother,
    pub(crate) last_command: Option<Command>,
}

impl Bot {
    /// Build a bot with fresh behavior instances for `catalog`
    ///
    /// Fails if the loadout carries invalid static configuration.
    pub fn new(
        id: EntityId,
        personality: PersonalityProfile,
        loadout: Loadout,
        config: &AiConfig,
        catalog: &[BehaviorKind],
    ) -> Result<Self> {
        let loadout = Loadout::new(loadout.weapon, loadout.utility)?;
        Ok(Self {
            id,
            motion: MotionSmoother::for_personality(config, &personality),
            personality,
            loadout,
            memory: MemoryStore::new(config.entity_ttl, config.objective_ttl),
            behaviors: catalog.iter().map(|&kind| BehaviorState::new(kind)).collect(),
            active: None,
            cooldown: 0.0,
            clock: 0.0,
            since_decision: 0.0,
            decisions: 0,
            last_command: None,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn personality(&self) -> &PersonalityProfile {
        &self.personality
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn clock(&self) -> Seconds {
        self.clock
    }

    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    pub fn last_command(&self) -> Option<&Command> {
        self.last_command.as_ref()
    }

    /// Kind of the active behavior, if a decision has been made
    pub fn active_behavior(&self) -> Option<BehaviorKind> {
        self.active
            .and_then(|i| self.behaviors.get(i))
            .map(|b| b.kind())
    }

    pub fn behavior(&self, kind: BehaviorKind) -> Option<&BehaviorState> {
        self.behaviors.iter().find(|b| b.kind() == kind)
    }

    /// Record what this bot can see in `world`; returns memory entries evicted
    pub fn observe(&mut self, world: &WorldSnapshot, perception_range: f32, sweep_interval: Seconds) -> usize {
        let now = world.time;
        let Some(me) = world.player(self.id) else {
            return 0;
        };
        let origin = me.position;
        let team = me.team;

        for other in &world.players {
            if other.id != self.id && other.active && other.position.distance(origin) <= perception_range {
                self.memory.observe(other, now);
            }
        }
        for zone in world.control_points.iter().chain(&world.zones) {
            if zone.active && zone.contested && zone.position.distance(origin) <= perception_range {
                self.memory.mark_contested(zone.id, zone.position, now);
            }
        }
        // A flag or item moving in hostile hands is a fight too
        for flag in &world.flags {
            let hostile_carrier = flag
                .carrier
                .and_then(|id| world.player(id))
                .is_some_and(|p| p.id != self.id && !same_team(team, p.team));
            if hostile_carrier && flag.position.distance(origin) <= perception_range {
                self.memory.mark_contested(flag.id, flag.position, now);
            }
        }

        let evicted = self.memory.sweep_if_due(now, sweep_interval);
        if evicted > 0 {
            tracing::debug!(bot = %self.id, evicted, "memory sweep");
        }
        evicted
    }
}
