//! Loot seeking: go pick up what the bot actually needs
//!
//! Need is driven by the bot's own state (health, ammo). A collector walks
//! to an available station; a camper waits by one that is about to respawn.

use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::objective::{Commitment, RoleClock, DISTANCE_PENALTY, THREAT_RADIUS};
use crate::ai::behaviors::skirmish::Skirmish;
use crate::ai::behaviors::{to_priority, Behavior};
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{patrol_point, phase_offset, steer_to};
use crate::ai::targeting::TargetQuery;
use crate::core::types::{EntityId, Seconds, Vec2};
use crate::world::snapshot::{LootKind, LootStationState};

const REEVALUATE_EVERY: Seconds = 2.5;
const MAX_PRIORITY: f32 = 80.0;
/// Needs below this are not worth a detour
const MIN_NEED: f32 = 0.2;
/// Stations respawning sooner than this are worth waiting at
const CAMP_WINDOW: Seconds = 5.0;
const SEARCH_RADIUS: f32 = 1200.0;
const CAMP_RING: f32 = 60.0;
const ENGAGE_RANGE: f32 = 450.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootRole {
    Collector,
    Camper,
}

#[derive(Debug, Clone)]
pub struct LootSeeking {
    commitment: Commitment<EntityId>,
    roles: RoleClock,
    role: LootRole,
    skirmish: Skirmish,
}

impl Default for LootSeeking {
    fn default() -> Self {
        Self {
            commitment: Commitment::default(),
            roles: RoleClock::new(REEVALUATE_EVERY),
            role: LootRole::Collector,
            skirmish: Skirmish::default(),
        }
    }
}

/// How much the bot wants what a station offers, in [0, 1]
pub fn need_for(ctx: &DecisionContext, kind: LootKind) -> f32 {
    match kind {
        LootKind::Health => 1.0 - ctx.health_fraction(),
        LootKind::Ammo => 1.0 - ctx.ammo_fraction().min(1.0),
        LootKind::Armor => 0.3 * (1.0 - ctx.personality.risk_tolerance()),
        // Loadouts are fixed at spawn; a weapon pickup gives this bot nothing
        LootKind::Weapon => 0.0,
    }
}

/// Stations that are up, or coming back soon enough to wait for
fn reachable<'a>(ctx: &DecisionContext<'a>) -> impl Iterator<Item = &'a LootStationState> + 'a {
    let me = ctx.position();
    ctx.world.loot_stations.iter().filter(move |s| {
        (s.available || s.respawn_in <= CAMP_WINDOW) && s.position.distance(me) <= SEARCH_RADIUS
    })
}

impl LootSeeking {
    pub fn role(&self) -> LootRole {
        self.role
    }

    pub fn committed(&self) -> Option<EntityId> {
        self.commitment.current()
    }

    fn options(ctx: &DecisionContext) -> Vec<(EntityId, f32)> {
        reachable(ctx)
            .filter_map(|s| {
                let need = need_for(ctx, s.kind);
                if need < MIN_NEED {
                    return None;
                }
                let waiting = if s.available { 0.0 } else { s.respawn_in * 4.0 };
                let danger = ctx.threat_density(s.position, THREAT_RADIUS) * 10.0;
                let distance = ctx.position().distance(s.position) * DISTANCE_PENALTY * 2.5;
                Some((s.id, need * 100.0 - distance - danger - waiting))
            })
            .collect()
    }
}

impl Behavior for LootSeeking {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.world.loot_stations.is_empty() {
            return 0;
        }
        let need = reachable(ctx)
            .map(|s| need_for(ctx, s.kind))
            .fold(0.0_f32, f32::max);
        if need < MIN_NEED {
            return 0;
        }
        let caution = 10.0 * (1.0 - ctx.personality.risk_tolerance());
        to_priority((need * 70.0 + caution).min(MAX_PRIORITY))
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        self.priority(ctx) > 0
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        let me = ctx.position();
        let still_valid = self
            .commitment
            .current()
            .is_some_and(|id| reachable(ctx).any(|s| s.id == id));
        if !still_valid {
            self.roles.force();
        }
        if self.roles.due(ctx.clock) {
            self.commitment.choose(&Self::options(ctx), ctx.clock);
        }

        let engagement = self
            .skirmish
            .engage(ctx, rng, TargetQuery::new(ENGAGE_RANGE, ctx.weapon().range), false);
        let Some(station) = self
            .commitment
            .current()
            .and_then(|id| ctx.world.loot_stations.iter().find(|s| s.id == id))
        else {
            return Skirmish::command_or_move(engagement, ctx, rng, Vec2::ZERO, me);
        };

        let patient = ctx.personality.patience() > 0.5;
        self.role = if !station.available && patient {
            LootRole::Camper
        } else {
            LootRole::Collector
        };

        let movement = match self.role {
            // Walk onto the station; pickup happens on contact
            LootRole::Collector => steer_to(me, station.position, 5.0),
            LootRole::Camper => {
                let phase = phase_offset(ctx.me.id.0);
                let spot = patrol_point(station.position, CAMP_RING, ctx.clock, 0.2, phase);
                steer_to(me, spot, 10.0)
            }
        };
        Skirmish::command_or_move(engagement, ctx, rng, movement, station.position)
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.roles.force();
    }
}
