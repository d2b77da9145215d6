//! Capture the flag: carry, attack, defend, retrieve
//!
//! A bot holding a flag always becomes the carrier immediately; the other
//! roles are re-evaluated on the role clock. Carriers never shoot.

use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::objective::{approach_cost, Commitment, RoleClock};
use crate::ai::behaviors::skirmish::Skirmish;
use crate::ai::behaviors::{to_priority, Behavior};
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{evade, feint_toward, keep_moving, patrol_point, phase_offset, steer_to};
use crate::ai::targeting::{KindFilter, TargetQuery};
use crate::core::types::{EntityId, Seconds, Vec2, FREE_FOR_ALL};
use crate::world::snapshot::FlagState;

const REEVALUATE_EVERY: Seconds = 4.0;
const CARRYING_PRIORITY: f32 = 95.0;
const FLAG_TAKEN_PRIORITY: f32 = 75.0;
const ENGAGE_RANGE: f32 = 600.0;
/// Carriers steer away from enemies inside this radius
const EVADE_RADIUS: f32 = 450.0;
const DEFENSE_RING: f32 = 150.0;
/// A home already watched by an ally inside this radius needs no defender
const COVERED_RADIUS: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRole {
    Carrier,
    Attacker,
    Defender,
    Retriever,
}

#[derive(Debug, Clone)]
pub struct FlagCarry {
    commitment: Commitment<EntityId>,
    roles: RoleClock,
    role: FlagRole,
    skirmish: Skirmish,
}

impl Default for FlagCarry {
    fn default() -> Self {
        Self {
            commitment: Commitment::default(),
            roles: RoleClock::new(REEVALUATE_EVERY),
            role: FlagRole::Attacker,
            skirmish: Skirmish::default(),
        }
    }
}

fn is_own_flag(ctx: &DecisionContext, flag: &FlagState) -> bool {
    ctx.me.team != FREE_FOR_ALL && flag.team == ctx.me.team
}

fn carried_flag<'a>(ctx: &DecisionContext<'a>) -> Option<&'a FlagState> {
    ctx.world.flags.iter().find(|f| f.carrier == Some(ctx.me.id))
}

fn own_flag<'a>(ctx: &DecisionContext<'a>) -> Option<&'a FlagState> {
    ctx.world.flags.iter().find(|f| is_own_flag(ctx, f))
}

impl FlagCarry {
    pub fn role(&self) -> FlagRole {
        self.role
    }

    pub fn committed(&self) -> Option<EntityId> {
        self.commitment.current()
    }

    /// Flags worth going after: enemy flags not already carried by us, and
    /// our own flag when it is away from home
    fn options(ctx: &DecisionContext) -> Vec<(EntityId, f32)> {
        ctx.world
            .flags
            .iter()
            .filter_map(|flag| {
                let own = is_own_flag(ctx, flag);
                let score = if own {
                    if flag.at_home {
                        return None;
                    }
                    // Recovering our flag trumps grabbing theirs
                    60.0 + if flag.is_dropped() { 10.0 } else { 0.0 }
                } else {
                    let carried_by_ally = flag
                        .carrier
                        .and_then(|id| ctx.world.player(id))
                        .is_some_and(|p| ctx.me.team != FREE_FOR_ALL && p.team == ctx.me.team);
                    if carried_by_ally {
                        return None;
                    }
                    40.0 + if flag.is_dropped() { 10.0 } else { 0.0 }
                };
                Some((flag.id, score - approach_cost(ctx, flag.position)))
            })
            .collect()
    }

    fn pick_role(&mut self, ctx: &DecisionContext) {
        let Some(flag) = self
            .commitment
            .current()
            .and_then(|id| ctx.world.flags.iter().find(|f| f.id == id))
        else {
            self.role = FlagRole::Defender;
            return;
        };
        if is_own_flag(ctx, flag) {
            self.role = FlagRole::Retriever;
            return;
        }
        // Someone has to mind the home flag; the team player does it when nobody else is
        let home_covered = own_flag(ctx).map_or(true, |own| {
            ctx.world.allies_near(ctx.me, own.home, COVERED_RADIUS).next().is_some()
        });
        let p = ctx.personality;
        self.role = if !home_covered && p.teamwork() >= p.aggressiveness() {
            FlagRole::Defender
        } else {
            FlagRole::Attacker
        };
    }

    fn carry(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng) -> Command {
        let me = ctx.position();
        let goal = own_flag(ctx).map(|f| f.home).unwrap_or_else(|| ctx.world.bounds.center());
        let threats = ctx.visible_enemies().map(|p| p.position);
        let movement = keep_moving(evade(me, threats, Some(goal), EVADE_RADIUS), ctx.previous_movement, rng);
        Command::moving(movement, me + movement * 100.0)
            .with_sprint(true)
            .with_reload(Skirmish::reload_without_target(ctx, true))
    }
}

impl Behavior for FlagCarry {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.world.flags.is_empty() {
            return 0;
        }
        if carried_flag(ctx).is_some() {
            return to_priority(CARRYING_PRIORITY);
        }
        if own_flag(ctx).is_some_and(|f| !f.at_home) {
            return to_priority(FLAG_TAKEN_PRIORITY);
        }
        to_priority(45.0 + ctx.personality.teamwork() * 15.0)
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        !ctx.world.flags.is_empty()
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        if carried_flag(ctx).is_some() {
            self.role = FlagRole::Carrier;
            self.skirmish.reset();
            return self.carry(ctx, rng);
        }
        if self.role == FlagRole::Carrier {
            // Just delivered or dropped: re-plan now
            self.roles.force();
        }
        let still_valid = self
            .commitment
            .current()
            .is_some_and(|id| Self::options(ctx).iter().any(|(k, _)| *k == id));
        if !still_valid {
            self.roles.force();
        }
        if self.roles.due(ctx.clock) {
            self.commitment.choose(&Self::options(ctx), ctx.clock);
            self.pick_role(ctx);
        }

        let me = ctx.position();
        let mobility = ctx.personality.mobility();
        let phase = phase_offset(ctx.me.id.0);
        let target_flag = self
            .commitment
            .current()
            .and_then(|id| ctx.world.flags.iter().find(|f| f.id == id));

        let (movement, query, look_at) = match (self.role, target_flag) {
            (FlagRole::Retriever, Some(flag)) => {
                // Chase whoever has it; the continuity bonus keeps us on them
                let query = TargetQuery::new(ENGAGE_RANGE, ctx.weapon().range).with_kinds(KindFilter::PLAYERS);
                (feint_toward(me, flag.position, ctx.clock, mobility, phase), query, flag.position)
            }
            (FlagRole::Attacker, Some(flag)) => {
                let query = TargetQuery::new(ENGAGE_RANGE, ctx.weapon().range);
                (feint_toward(me, flag.position, ctx.clock, mobility, phase), query, flag.position)
            }
            _ => {
                let home = own_flag(ctx).map(|f| f.home).unwrap_or(me);
                let spot = patrol_point(home, DEFENSE_RING, ctx.clock, mobility, phase);
                let query = TargetQuery::new(ENGAGE_RANGE, ctx.weapon().range).anchored_at(home);
                (steer_to(me, spot, 10.0), query, spot)
            }
        };

        let query = match (self.role, target_flag.and_then(|f| f.carrier)) {
            (FlagRole::Retriever, Some(carrier)) if self.skirmish.target().is_none() => {
                query.with_current(Some(carrier))
            }
            _ => query,
        };
        let engagement = self.skirmish.engage(ctx, rng, query, false);
        Skirmish::command_or_move(engagement, ctx, rng, movement, look_at)
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.roles.force();
    }
}
