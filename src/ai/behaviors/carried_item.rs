//! Carried-item contests (bomb, payload, ball): carry it, pick it up,
//! escort the friendly carrier or hunt the hostile one

use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::objective::{approach_cost, Commitment, RoleClock};
use crate::ai::behaviors::skirmish::Skirmish;
use crate::ai::behaviors::{to_priority, Behavior};
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{evade, feint_toward, keep_moving, patrol_point, phase_offset, steer_to};
use crate::ai::targeting::{KindFilter, TargetQuery};
use crate::core::types::{same_team, EntityId, Seconds, Vec2};
use crate::world::snapshot::{CarriedItemState, PlayerState};

const REEVALUATE_EVERY: Seconds = 2.0;
const CARRYING_PRIORITY: f32 = 95.0;
const LOOSE_PRIORITY: f32 = 70.0;
const HUNT_PRIORITY: f32 = 65.0;
const EVADE_RADIUS: f32 = 400.0;
const ESCORT_RING: f32 = 120.0;
const ENGAGE_RANGE: f32 = 500.0;
/// Hunters sprint when the carrier is further away than this
const HUNT_SPRINT: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRole {
    Carrier,
    Retriever,
    Escort,
    Hunter,
}

#[derive(Debug, Clone)]
pub struct CarriedItem {
    commitment: Commitment<EntityId>,
    roles: RoleClock,
    role: ItemRole,
    skirmish: Skirmish,
}

impl Default for CarriedItem {
    fn default() -> Self {
        Self {
            commitment: Commitment::default(),
            roles: RoleClock::new(REEVALUATE_EVERY),
            role: ItemRole::Retriever,
            skirmish: Skirmish::default(),
        }
    }
}

/// How an item relates to this bot right now
fn role_for(ctx: &DecisionContext, item: &CarriedItemState) -> ItemRole {
    match item.carrier {
        Some(id) if id == ctx.me.id => ItemRole::Carrier,
        None => ItemRole::Retriever,
        Some(id) => match ctx.world.player(id) {
            Some(carrier) if is_friend(ctx.me, carrier) => ItemRole::Escort,
            _ => ItemRole::Hunter,
        },
    }
}

fn is_friend(me: &PlayerState, other: &PlayerState) -> bool {
    same_team(me.team, other.team)
}

fn active_items<'a>(ctx: &DecisionContext<'a>) -> impl Iterator<Item = &'a CarriedItemState> + 'a {
    ctx.world.carried_items.iter().filter(|i| i.active)
}

impl CarriedItem {
    pub fn role(&self) -> ItemRole {
        self.role
    }

    fn options(ctx: &DecisionContext) -> Vec<(EntityId, f32)> {
        active_items(ctx)
            .map(|item| {
                let base = match role_for(ctx, item) {
                    ItemRole::Carrier => 100.0,
                    ItemRole::Retriever => 50.0,
                    ItemRole::Hunter => 45.0,
                    ItemRole::Escort => 30.0 + ctx.personality.teamwork() * 10.0,
                };
                (item.id, base - approach_cost(ctx, item.position))
            })
            .collect()
    }

    fn carry(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, item: &CarriedItemState) -> Command {
        let me = ctx.position();
        let goal = item.delivery_point.unwrap_or_else(|| ctx.world.bounds.center());
        let threats = ctx.visible_enemies().map(|p| p.position);
        let movement = keep_moving(evade(me, threats, Some(goal), EVADE_RADIUS), ctx.previous_movement, rng);
        Command::moving(movement, me + movement * 100.0)
            .with_sprint(true)
            .with_reload(Skirmish::reload_without_target(ctx, true))
    }
}

impl Behavior for CarriedItem {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.world.carried_items.is_empty() {
            return 0;
        }
        let best = active_items(ctx)
            .map(|item| match role_for(ctx, item) {
                ItemRole::Carrier => CARRYING_PRIORITY,
                ItemRole::Retriever => LOOSE_PRIORITY,
                ItemRole::Hunter => HUNT_PRIORITY,
                ItemRole::Escort => 45.0 + ctx.personality.teamwork() * 10.0,
            })
            .fold(0.0_f32, f32::max);
        to_priority(best)
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        active_items(ctx).next().is_some()
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        if let Some(item) = active_items(ctx).find(|i| i.carrier == Some(ctx.me.id)) {
            self.role = ItemRole::Carrier;
            self.skirmish.reset();
            return self.carry(ctx, rng, item);
        }

        let still_valid = self
            .commitment
            .current()
            .is_some_and(|id| active_items(ctx).any(|i| i.id == id));
        if !still_valid || self.role == ItemRole::Carrier {
            self.roles.force();
        }
        if self.roles.due(ctx.clock) {
            self.commitment.choose(&Self::options(ctx), ctx.clock);
        }

        let me = ctx.position();
        let Some(item) = self
            .commitment
            .current()
            .and_then(|id| active_items(ctx).find(|i| i.id == id))
        else {
            let movement = keep_moving(Vec2::ZERO, ctx.previous_movement, rng);
            return Command::moving(movement, me + movement * 100.0)
                .with_reload(Skirmish::reload_without_target(ctx, false));
        };
        // Possession changes are reacted to immediately
        self.role = role_for(ctx, item);

        let mobility = ctx.personality.mobility();
        let phase = phase_offset(ctx.me.id.0);
        let range = ctx.weapon().range;
        match self.role {
            ItemRole::Carrier => self.carry(ctx, rng, item),
            ItemRole::Retriever => {
                let movement = feint_toward(me, item.position, ctx.clock, mobility, phase);
                let engagement = self.skirmish.engage(ctx, rng, TargetQuery::new(ENGAGE_RANGE, range), false);
                Skirmish::command_or_move(engagement, ctx, rng, movement, item.position)
            }
            ItemRole::Escort => {
                let spot = patrol_point(item.position, ESCORT_RING, ctx.clock, mobility, phase);
                let query = TargetQuery::new(ENGAGE_RANGE, range).anchored_at(item.position);
                let engagement = self.skirmish.engage(ctx, rng, query, false);
                Skirmish::command_or_move(engagement, ctx, rng, steer_to(me, spot, 10.0), spot)
            }
            ItemRole::Hunter => {
                let distance = me.distance(item.position);
                let movement = feint_toward(me, item.position, ctx.clock, mobility, phase);
                let query = TargetQuery::new(ENGAGE_RANGE, range)
                    .with_kinds(KindFilter::PLAYERS)
                    .with_current(item.carrier);
                let engagement = self.skirmish.engage(ctx, rng, query, false);
                Skirmish::command_or_move(engagement, ctx, rng, movement, item.position)
                    .with_sprint(distance > HUNT_SPRINT)
            }
        }
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.roles.force();
    }
}
