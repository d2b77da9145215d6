//! Direct combat: pick a target, then retreat, pursue, back off or strafe
//!
//! Target phase keeps the current target while it stays valid and inside the
//! persistence radius, otherwise rescoring every visible player and turret.
//! A target that drops out of sight is chased to its last remembered position
//! until the combat timeout runs out.

use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::{to_priority, Behavior};
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{
    aim_at, fighting_movement, keep_moving, retreat_from, should_fire, should_reload, steer_to, ReloadInputs,
};
use crate::ai::targeting::{Candidate, CandidateKind, KindFilter, TargetQuery};
use crate::core::types::{EntityId, Seconds, Vec2};

/// Keep the current target while it stays within this distance
const PERSISTENCE_RADIUS: f32 = 800.0;
/// No priority at all beyond this distance
const ENGAGE_CUTOFF: f32 = 500.0;
/// Priority floor applies under this distance
const CLOSE_RANGE: f32 = 200.0;
const CLOSE_PRIORITY: f32 = 85.0;
/// Priority lost between CLOSE_RANGE and ENGAGE_CUTOFF
const PRIORITY_FALLOFF: f32 = 50.0;
const AGGRESSION_BONUS: f32 = 10.0;
/// Chase a lost target's last known position for this long
const COMBAT_TIMEOUT: Seconds = 3.0;
const RETREAT_HEALTH: f32 = 0.3;
/// Health lost inside `DAMAGE_WINDOW` that counts as a sudden hit
const SUDDEN_DAMAGE: f32 = 0.25;
const DAMAGE_WINDOW: Seconds = 1.5;
const CAUTIOUS_PATIENCE: f32 = 0.6;
/// Never throw a grenade closer than this
const GRENADE_MIN_DISTANCE: f32 = 80.0;

#[derive(Debug, Clone, Copy)]
struct HealthMark {
    at: Seconds,
    fraction: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Combat {
    target: Option<EntityId>,
    /// Bot clock when the target was last visible
    last_seen: Seconds,
    last_shot: Option<Seconds>,
    retreat_until: Option<Seconds>,
    health_mark: Option<HealthMark>,
}

impl Combat {
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn is_retreating(&self, clock: Seconds) -> bool {
        self.retreat_until.is_some_and(|until| clock < until)
    }

    fn query(ctx: &DecisionContext, current: Option<EntityId>) -> TargetQuery {
        TargetQuery::new(PERSISTENCE_RADIUS.min(ctx.perception_range), ctx.weapon().range)
            .with_kinds(KindFilter::COMBATANTS)
            .with_current(current)
    }

    /// Current target if still valid, otherwise the best visible one
    fn acquire(&self, ctx: &DecisionContext) -> Option<(Candidate, f32)> {
        let me = ctx.position();
        let cutoff = PERSISTENCE_RADIUS.min(ctx.perception_range);
        if let Some(id) = self.target {
            if let Some(c) = ctx.selector.resolve(ctx.me, ctx.world, id) {
                let distance = me.distance(c.position);
                if distance <= cutoff && c.kind != CandidateKind::Base {
                    return Some((c, distance));
                }
            }
        }
        ctx.selector
            .select(ctx.me, ctx.world, &Self::query(ctx, self.target))
            .map(|best| (best.candidate, best.distance))
    }

    /// Last known position of a lost target while the timeout hasn't expired
    fn pursuit_point(&self, ctx: &DecisionContext) -> Option<Vec2> {
        let id = self.target?;
        if ctx.clock - self.last_seen > COMBAT_TIMEOUT {
            return None;
        }
        ctx.memory.recall(id, ctx.now()).map(|m| m.last_position)
    }

    fn update_retreat(&mut self, ctx: &DecisionContext) {
        let health = ctx.health_fraction();
        let mark = match self.health_mark {
            Some(mark) if ctx.clock - mark.at <= DAMAGE_WINDOW => mark,
            _ => {
                let mark = HealthMark { at: ctx.clock, fraction: health };
                self.health_mark = Some(mark);
                mark
            }
        };
        let sudden = mark.fraction - health >= SUDDEN_DAMAGE
            && ctx.personality.patience() > CAUTIOUS_PATIENCE;

        if (health < RETREAT_HEALTH || sudden) && !self.is_retreating(ctx.clock) {
            let duration = 2.0 + (1.0 - ctx.personality.risk_tolerance()) * 2.0;
            self.retreat_until = Some(ctx.clock + duration);
            self.health_mark = None;
        }
    }

    fn movement(&self, ctx: &DecisionContext, target: Vec2, distance: f32, retreating: bool) -> (Vec2, bool) {
        if retreating {
            return (retreat_from(ctx.position(), target, &ctx.world.bounds), true);
        }
        let sprint = distance > ctx.weapon().optimal_range() * 2.0;
        (fighting_movement(ctx, target, distance), sprint)
    }

    fn use_secondary(ctx: &DecisionContext, distance: f32, retreating: bool) -> bool {
        let Some(utility) = &ctx.loadout.utility else {
            return false;
        };
        if !ctx.me.utility_ready {
            return false;
        }
        if utility.kind.is_defensive() {
            retreating
        } else {
            distance <= utility.range && distance > GRENADE_MIN_DISTANCE
        }
    }
}

impl Behavior for Combat {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        let query = TargetQuery::new(ENGAGE_CUTOFF, ctx.weapon().range).with_kinds(KindFilter::COMBATANTS);
        let me = ctx.position();
        let nearest = ctx
            .selector
            .candidates(ctx.me, ctx.world, &query)
            .iter()
            .map(|c| me.distance(c.position))
            .min_by(f32::total_cmp);
        let Some(distance) = nearest else {
            return 0;
        };

        let base = if distance < CLOSE_RANGE {
            CLOSE_PRIORITY
        } else {
            CLOSE_PRIORITY - PRIORITY_FALLOFF * (distance - CLOSE_RANGE) / (ENGAGE_CUTOFF - CLOSE_RANGE)
        };
        to_priority(base + ctx.personality.aggressiveness() * AGGRESSION_BONUS)
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        self.acquire(ctx).is_some() || self.pursuit_point(ctx).is_some()
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        let me = ctx.position();
        self.update_retreat(ctx);
        let retreating = self.is_retreating(ctx.clock);

        let Some((target, distance)) = self.acquire(ctx) else {
            let reload = should_reload(ReloadInputs::from_context(ctx, retreating, None));
            if let Some(last_known) = self.pursuit_point(ctx) {
                let movement = keep_moving(steer_to(me, last_known, 30.0), ctx.previous_movement, rng);
                return Command::moving(movement, last_known).with_reload(reload);
            }
            self.target = None;
            let movement = keep_moving(Vec2::ZERO, ctx.previous_movement, rng);
            return Command::moving(movement, me + movement * 100.0).with_reload(reload);
        };

        if self.target != Some(target.id) {
            self.last_shot = None;
        }
        self.target = Some(target.id);
        self.last_seen = ctx.clock;

        let (movement, sprint) = self.movement(ctx, target.position, distance, retreating);
        let movement = keep_moving(movement, ctx.previous_movement, rng);

        let aim = aim_at(ctx, target.position, target.velocity, rng);
        let reload = should_reload(ReloadInputs::from_context(ctx, retreating, Some(distance)));
        let fire = !reload && should_fire(ctx, distance, self.last_shot, rng);
        if fire {
            self.last_shot = Some(ctx.clock);
        }

        Command::moving(movement, aim)
            .with_fire(fire)
            .with_reload(reload)
            .with_sprint(sprint)
            .with_secondary(Self::use_secondary(ctx, distance, retreating))
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.health_mark = None;
    }

    fn on_exit(&mut self) {
        self.retreat_until = None;
    }
}
