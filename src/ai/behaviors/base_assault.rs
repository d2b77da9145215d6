//! Attack hostile bases: breachers push in and shoot the structure,
//! suppressors hold at long range and pick off defenders

use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::objective::{approach_cost, Commitment, RoleClock};
use crate::ai::behaviors::skirmish::Skirmish;
use crate::ai::behaviors::{to_priority, Behavior};
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{aim_at, feint_toward, keep_moving, orbit, phase_offset, should_fire, steer_to};
use crate::ai::targeting::{is_hostile, Candidate, CandidateKind, KindFilter, TargetQuery};
use crate::core::types::{EntityId, Seconds, Vec2};
use crate::world::snapshot::BaseState;

const REEVALUATE_EVERY: Seconds = 5.0;
/// Breachers switch to a player this close instead of the structure
const BREACHER_SELF_DEFENSE: f32 = 250.0;
const SUPPRESSOR_ENGAGE: f32 = 600.0;
/// Suppressors hang back at this fraction of weapon range from the base
const SUPPRESSOR_STANDOFF: f32 = 0.9;
const LOW_HEALTH: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssaultRole {
    Breacher,
    Suppressor,
}

#[derive(Debug, Clone)]
pub struct BaseAssault {
    commitment: Commitment<EntityId>,
    roles: RoleClock,
    role: AssaultRole,
    skirmish: Skirmish,
    last_structure_shot: Option<Seconds>,
}

impl Default for BaseAssault {
    fn default() -> Self {
        Self {
            commitment: Commitment::default(),
            roles: RoleClock::new(REEVALUATE_EVERY),
            role: AssaultRole::Breacher,
            skirmish: Skirmish::default(),
            last_structure_shot: None,
        }
    }
}

fn as_candidate(base: &BaseState) -> Candidate {
    Candidate {
        id: base.id,
        kind: CandidateKind::Base,
        position: base.position,
        velocity: Vec2::ZERO,
        health: base.health,
        max_health: base.max_health,
        team: base.team,
        owner: base.owner,
        type_weight: CandidateKind::Base.priority_weight(),
    }
}

fn hostile_bases<'a>(ctx: &DecisionContext<'a>) -> impl Iterator<Item = &'a BaseState> + 'a {
    let me = ctx.me;
    ctx.world
        .bases
        .iter()
        .filter(move |b| b.active && is_hostile(me, &as_candidate(b)))
}

impl BaseAssault {
    pub fn role(&self) -> AssaultRole {
        self.role
    }

    pub fn committed(&self) -> Option<EntityId> {
        self.commitment.current()
    }

    fn options(ctx: &DecisionContext) -> Vec<(EntityId, f32)> {
        hostile_bases(ctx)
            .map(|b| {
                let damage = (1.0 - b.health_fraction()) * 40.0;
                (b.id, 20.0 + damage - approach_cost(ctx, b.position))
            })
            .collect()
    }

    fn pick_role(&mut self, ctx: &DecisionContext) {
        let p = ctx.personality;
        let pushy = p.aggressiveness() + p.mobility() >= p.accuracy() + p.patience();
        self.role = if pushy && ctx.health_fraction() >= LOW_HEALTH {
            AssaultRole::Breacher
        } else {
            AssaultRole::Suppressor
        };
    }

    fn breach(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, base: &BaseState) -> Command {
        let me = ctx.position();
        let weapon = ctx.weapon();
        let optimal = weapon.optimal_range();
        let distance = me.distance(base.position);
        let mobility = ctx.personality.mobility();
        let phase = phase_offset(ctx.me.id.0);

        let movement = if distance > optimal {
            feint_toward(me, base.position, ctx.clock, mobility, phase)
        } else {
            orbit(me, base.position, optimal.max(base.radius * 1.5), ctx.clock, mobility, phase)
        };
        let movement = keep_moving(movement, ctx.previous_movement, rng);

        let query = TargetQuery::new(BREACHER_SELF_DEFENSE, weapon.range).with_kinds(KindFilter::PLAYERS);
        if let Some(engagement) = self.skirmish.engage(ctx, rng, query, false) {
            return engagement.command(movement);
        }

        // Nobody in the way: work on the structure
        let aim = aim_at(ctx, base.position, Vec2::ZERO, rng);
        let reload = Skirmish::reload_without_target(ctx, false);
        let fire = !reload && should_fire(ctx, distance, self.last_structure_shot, rng);
        if fire {
            self.last_structure_shot = Some(ctx.clock);
        }
        Command::moving(movement, aim).with_fire(fire).with_reload(reload)
    }

    fn suppress(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, base: &BaseState) -> Command {
        let me = ctx.position();
        let standoff = ctx.weapon().range * SUPPRESSOR_STANDOFF;
        let approach = (me - base.position).normalize_or_zero();
        let approach = if approach == Vec2::ZERO { Vec2::X } else { approach };
        let post = ctx.world.bounds.clamp(base.position + approach * standoff);
        let movement = steer_to(me, post, 20.0);

        let query = TargetQuery::new(SUPPRESSOR_ENGAGE, ctx.weapon().range)
            .with_kinds(KindFilter::COMBATANTS)
            .anchored_at(base.position);
        let engagement = self.skirmish.engage(ctx, rng, query, false);
        Skirmish::command_or_move(engagement, ctx, rng, movement, base.position)
    }
}

impl Behavior for BaseAssault {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.world.bases.is_empty() || hostile_bases(ctx).next().is_none() {
            return 0;
        }
        let p = ctx.personality;
        to_priority((40.0 + p.aggressiveness() * 20.0 + p.strategic_thinking() * 10.0).min(85.0))
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        hostile_bases(ctx).next().is_some()
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        let still_valid = self
            .commitment
            .current()
            .is_some_and(|id| hostile_bases(ctx).any(|b| b.id == id));
        if !still_valid {
            self.roles.force();
        }
        if self.roles.due(ctx.clock) {
            self.commitment.choose(&Self::options(ctx), ctx.clock);
            self.pick_role(ctx);
        }
        let Some(base) = self.commitment.current().and_then(|id| ctx.world.base(id)) else {
            let me = ctx.position();
            let movement = keep_moving(Vec2::ZERO, ctx.previous_movement, rng);
            return Command::moving(movement, me + movement * 100.0)
                .with_reload(Skirmish::reload_without_target(ctx, false));
        };
        match self.role {
            AssaultRole::Breacher => self.breach(ctx, rng, base),
            AssaultRole::Suppressor => self.suppress(ctx, rng, base),
        }
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.roles.force();
    }
}
