//! Base defense: sentries walk a ring, interceptors chase intruders on a leash
//!
//! In team modes a bot defends its team's bases; in free-for-all only the
//! bases it owns.

use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::objective::{Commitment, RoleClock, DISTANCE_PENALTY};
use crate::ai::behaviors::skirmish::Skirmish;
use crate::ai::behaviors::{to_priority, Behavior};
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{fighting_movement, patrol_point, phase_offset, steer_to};
use crate::ai::targeting::{KindFilter, TargetQuery};
use crate::core::types::{direction, EntityId, Seconds, Vec2, FREE_FOR_ALL};
use crate::world::snapshot::BaseState;

const REEVALUATE_EVERY: Seconds = 3.0;
/// Interceptors never stray further than this from the base they guard
const LEASH: f32 = 700.0;
/// Enemies inside this radius of a base make it threatened
const THREAT_RADIUS: f32 = 600.0;
const SENTRY_RING: f32 = 120.0;
const SENTRY_ENGAGE: f32 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefenseRole {
    Sentry,
    Interceptor,
}

#[derive(Debug, Clone)]
pub struct Defense {
    commitment: Commitment<EntityId>,
    roles: RoleClock,
    role: DefenseRole,
    skirmish: Skirmish,
}

impl Default for Defense {
    fn default() -> Self {
        Self {
            commitment: Commitment::default(),
            roles: RoleClock::new(REEVALUATE_EVERY),
            role: DefenseRole::Sentry,
            skirmish: Skirmish::default(),
        }
    }
}

/// Bases this bot is responsible for
fn owned_bases<'a>(ctx: &DecisionContext<'a>) -> impl Iterator<Item = &'a BaseState> + 'a {
    let me = ctx.me;
    ctx.world.bases.iter().filter(move |b| {
        b.active
            && if me.team == FREE_FOR_ALL {
                b.owner == Some(me.id)
            } else {
                b.team == me.team
            }
    })
}

fn intruders(ctx: &DecisionContext, base: &BaseState, radius: f32) -> usize {
    ctx.world.enemies_near(ctx.me, base.position, radius).count()
}

impl Defense {
    pub fn role(&self) -> DefenseRole {
        self.role
    }

    pub fn committed(&self) -> Option<EntityId> {
        self.commitment.current()
    }

    fn options(ctx: &DecisionContext) -> Vec<(EntityId, f32)> {
        owned_bases(ctx)
            .map(|b| {
                let threat = intruders(ctx, b, THREAT_RADIUS) as f32 * 20.0;
                let damage = (1.0 - b.health_fraction()) * 30.0;
                let distance = ctx.position().distance(b.position) * DISTANCE_PENALTY * 0.5;
                (b.id, threat + damage - distance)
            })
            .collect()
    }
}

impl Behavior for Defense {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.world.bases.is_empty() {
            return 0;
        }
        let bases: Vec<&BaseState> = owned_bases(ctx).collect();
        if bases.is_empty() {
            return 0;
        }
        let p = ctx.personality;
        let mut score = 35.0 + p.patience() * 15.0 + p.cover_usage() * 10.0;
        if bases.iter().any(|b| intruders(ctx, b, THREAT_RADIUS) > 0) {
            score += 30.0;
        }
        if bases.iter().any(|b| b.health_fraction() < 0.5) {
            score += 15.0;
        }
        to_priority(score.min(90.0))
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        owned_bases(ctx).next().is_some()
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        let me = ctx.position();
        let still_valid = self
            .commitment
            .current()
            .is_some_and(|id| owned_bases(ctx).any(|b| b.id == id));
        if !still_valid {
            self.roles.force();
        }
        let reevaluate = self.roles.due(ctx.clock);
        if reevaluate {
            self.commitment.choose(&Self::options(ctx), ctx.clock);
        }
        let Some(base) = self.commitment.current().and_then(|id| ctx.world.base(id)) else {
            let query = TargetQuery::new(SENTRY_ENGAGE, ctx.weapon().range);
            let engagement = self.skirmish.engage(ctx, rng, query, false);
            return Skirmish::command_or_move(engagement, ctx, rng, Vec2::ZERO, me);
        };

        // Intruders flip the role at once; calming down waits for the clock
        if intruders(ctx, base, LEASH) > 0 {
            self.role = DefenseRole::Interceptor;
        } else if reevaluate {
            self.role = DefenseRole::Sentry;
        }

        let mobility = ctx.personality.mobility();
        let phase = phase_offset(ctx.me.id.0);
        match self.role {
            DefenseRole::Sentry => {
                let spot = patrol_point(base.position, base.radius + SENTRY_RING, ctx.clock, mobility, phase);
                let query = TargetQuery::new(SENTRY_ENGAGE, ctx.weapon().range);
                let engagement = self.skirmish.engage(ctx, rng, query, false);
                Skirmish::command_or_move(engagement, ctx, rng, steer_to(me, spot, 10.0), spot)
            }
            DefenseRole::Interceptor => {
                let query = TargetQuery::new(LEASH, ctx.weapon().range)
                    .with_kinds(KindFilter::COMBATANTS)
                    .anchored_at(base.position);
                let engagement = self.skirmish.engage(ctx, rng, query, false);
                let movement = if me.distance(base.position) > LEASH {
                    direction(me, base.position)
                } else if let Some(e) = &engagement {
                    fighting_movement(ctx, e.target.position, e.distance)
                } else {
                    steer_to(me, base.position, base.radius)
                };
                Skirmish::command_or_move(engagement, ctx, rng, movement, base.position)
            }
        }
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.roles.force();
    }
}
