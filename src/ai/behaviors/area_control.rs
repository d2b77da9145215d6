//! Control points: capture what isn't ours, defend what is

use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::objective::{approach_cost, is_own_team, Commitment, RoleClock};
use crate::ai::behaviors::skirmish::Skirmish;
use crate::ai::behaviors::{to_priority, Behavior};
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{feint_toward, patrol_point, phase_offset, steer_to};
use crate::ai::targeting::TargetQuery;
use crate::core::types::{EntityId, Seconds, Vec2};
use crate::world::snapshot::ZoneState;

const REEVALUATE_EVERY: Seconds = 3.0;
const ENGAGE_RANGE: f32 = 600.0;
/// Defenders walk a ring this much wider than the point
const RING_MARGIN: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaRole {
    Attacker,
    Defender,
}

#[derive(Debug, Clone)]
pub struct AreaControl {
    commitment: Commitment<EntityId>,
    roles: RoleClock,
    role: AreaRole,
    skirmish: Skirmish,
}

impl Default for AreaControl {
    fn default() -> Self {
        Self {
            commitment: Commitment::default(),
            roles: RoleClock::new(REEVALUATE_EVERY),
            role: AreaRole::Attacker,
            skirmish: Skirmish::default(),
        }
    }
}

impl AreaControl {
    pub fn committed(&self) -> Option<EntityId> {
        self.commitment.current()
    }

    pub fn role(&self) -> AreaRole {
        self.role
    }

    pub fn score(ctx: &DecisionContext, point: &ZoneState) -> f32 {
        let ours = is_own_team(ctx, point.controlling_team);
        let strategic = ctx.personality.strategic_thinking();
        let base = match (ours, point.controlling_team, point.contested) {
            // Defending a point under attack beats everything else
            (true, _, true) => 40.0,
            (true, _, false) => 8.0,
            (false, None, _) => 30.0,
            (false, Some(_), contested) => 22.0 + if contested { 8.0 } else { 0.0 },
        };
        let remembered = if ctx.memory.was_contested(point.id, ctx.now()) {
            10.0 * strategic
        } else {
            0.0
        };
        base + remembered - approach_cost(ctx, point.position)
    }

    fn options(ctx: &DecisionContext) -> Vec<(EntityId, f32)> {
        ctx.world
            .control_points
            .iter()
            .filter(|cp| cp.active)
            .map(|cp| (cp.id, Self::score(ctx, cp)))
            .collect()
    }
}

impl Behavior for AreaControl {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.world.control_points.is_empty() {
            return 0;
        }
        let points: Vec<&ZoneState> = ctx.world.control_points.iter().filter(|cp| cp.active).collect();
        if points.is_empty() {
            return 0;
        }
        let p = ctx.personality;
        let mut score = 45.0 + p.strategic_thinking() * 15.0 + p.teamwork() * 10.0;
        if points.iter().any(|cp| cp.contested) {
            score += 15.0;
        }
        to_priority(score.min(90.0))
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        ctx.world.control_points.iter().any(|cp| cp.active)
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        let me = ctx.position();
        let still_valid = self
            .commitment
            .current()
            .is_some_and(|id| ctx.world.control_points.iter().any(|cp| cp.id == id && cp.active));
        if !still_valid {
            self.roles.force();
        }
        if self.roles.due(ctx.clock) {
            self.commitment.choose(&Self::options(ctx), ctx.clock);
            if let Some(point) = self
                .commitment
                .current()
                .and_then(|id| ctx.world.control_points.iter().find(|cp| cp.id == id))
            {
                self.role = if is_own_team(ctx, point.controlling_team) {
                    AreaRole::Defender
                } else {
                    AreaRole::Attacker
                };
            }
        }

        let point = self
            .commitment
            .current()
            .and_then(|id| ctx.world.control_points.iter().find(|cp| cp.id == id));
        let query = TargetQuery::new(ENGAGE_RANGE, ctx.weapon().range);
        let engagement = self.skirmish.engage(ctx, rng, query, false);
        let Some(point) = point else {
            return Skirmish::command_or_move(engagement, ctx, rng, Vec2::ZERO, me);
        };

        let mobility = ctx.personality.mobility();
        let phase = phase_offset(ctx.me.id.0);
        let movement = match self.role {
            AreaRole::Attacker if !point.contains(me) => {
                feint_toward(me, point.position, ctx.clock, mobility, phase)
            }
            AreaRole::Attacker => {
                // Inside: keep drifting around the middle so we stay on the point
                let spot = patrol_point(point.position, point.radius * 0.4, ctx.clock, mobility, phase);
                steer_to(me, spot, 10.0)
            }
            AreaRole::Defender => {
                let spot = patrol_point(point.position, point.radius * RING_MARGIN, ctx.clock, mobility, phase);
                steer_to(me, spot, 10.0)
            }
        };
        Skirmish::command_or_move(engagement, ctx, rng, movement, point.position)
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.roles.force();
    }
}
