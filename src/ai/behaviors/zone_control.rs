//! King-of-the-hill zones: hold the zone we own, contest the rest

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

const REEVALUATE_EVERY: Seconds = 2.0;
const ENGAGE_RANGE: f32 = 600.0;
/// Bonus for a zone this bot remembers being fought over
const REMEMBERED_FIGHT: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneRole {
    /// Stay inside a zone we control
    Holder,
    /// Push into a zone we don't
    Contester,
}

#[derive(Debug, Clone)]
pub struct ZoneControl {
    commitment: Commitment<EntityId>,
    roles: RoleClock,
    role: ZoneRole,
    skirmish: Skirmish,
}

impl Default for ZoneControl {
    fn default() -> Self {
        Self {
            commitment: Commitment::default(),
            roles: RoleClock::new(REEVALUATE_EVERY),
            role: ZoneRole::Contester,
            skirmish: Skirmish::default(),
        }
    }
}

impl ZoneControl {
    pub fn committed(&self) -> Option<EntityId> {
        self.commitment.current()
    }

    pub fn role(&self) -> ZoneRole {
        self.role
    }

    /// Desirability of one zone from this bot's point of view
    pub fn score(ctx: &DecisionContext, zone: &ZoneState) -> f32 {
        let ours = is_own_team(ctx, zone.controlling_team);
        let base = match (ours, zone.controlling_team, zone.contested) {
            (true, _, false) => 10.0,
            (true, _, true) => 35.0,
            (false, None, _) => 30.0,
            (false, Some(_), contested) => 25.0 + if contested { 10.0 } else { 0.0 },
        };
        let remembered = if ctx.memory.was_contested(zone.id, ctx.now()) {
            REMEMBERED_FIGHT
        } else {
            0.0
        };
        base + remembered - approach_cost(ctx, zone.position)
    }

    fn options(ctx: &DecisionContext) -> Vec<(EntityId, f32)> {
        ctx.world
            .zones
            .iter()
            .filter(|z| z.active)
            .map(|z| (z.id, Self::score(ctx, z)))
            .collect()
    }
}

impl Behavior for ZoneControl {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.world.zones.is_empty() {
            return 0;
        }
        let mut active = ctx.world.zones.iter().filter(|z| z.active).peekable();
        if active.peek().is_none() {
            return 0;
        }
        let needs_us = active.any(|z| z.contested || !is_own_team(ctx, z.controlling_team));
        let p = ctx.personality;
        let score = 40.0
            + p.strategic_thinking() * 10.0
            + p.teamwork() * 10.0
            + if needs_us { 15.0 } else { 0.0 };
        to_priority(score.min(90.0))
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        ctx.world.zones.iter().any(|z| z.active)
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        let me = ctx.position();
        let still_valid = self
            .commitment
            .current()
            .is_some_and(|id| ctx.world.zones.iter().any(|z| z.id == id && z.active));
        if !still_valid {
            self.roles.force();
        }
        if self.roles.due(ctx.clock) {
            self.commitment.choose(&Self::options(ctx), ctx.clock);
        }

        let zone = self
            .commitment
            .current()
            .and_then(|id| ctx.world.zones.iter().find(|z| z.id == id));
        let query = TargetQuery::new(ENGAGE_RANGE, ctx.weapon().range);
        let engagement = self.skirmish.engage(ctx, rng, query, false);

        let Some(zone) = zone else {
            return Skirmish::command_or_move(engagement, ctx, rng, Vec2::ZERO, me);
        };

        self.role = if is_own_team(ctx, zone.controlling_team) || zone.contains(me) {
            ZoneRole::Holder
        } else {
            ZoneRole::Contester
        };

        let mobility = ctx.personality.mobility();
        let phase = phase_offset(ctx.me.id.0);
        let movement = match self.role {
            ZoneRole::Holder => {
                let spot = patrol_point(zone.position, zone.radius * 0.5, ctx.clock, mobility, phase);
                steer_to(me, spot, 10.0)
            }
            ZoneRole::Contester => feint_toward(me, zone.position, ctx.clock, mobility, phase),
        };
        Skirmish::command_or_move(engagement, ctx, rng, movement, zone.position)
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.roles.force();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::behaviors::fixture::Fixture;
    use crate::world::snapshot::{PlayerState, ZoneKind};

    fn zone(id: u32, x: f32) -> ZoneState {
        ZoneState {
            id: EntityId(id),
            kind: ZoneKind::Hill,
            position: Vec2::new(x, 0.0),
            radius: 80.0,
            controlling_team: None,
            contested: false,
            active: true,
        }
    }

    #[test]
    fn test_zero_priority_without_zones() {
        let fx = Fixture::new(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
        assert_eq!(ZoneControl::default().priority(&fx.ctx()), 0);
    }

    #[test]
    fn test_commitment_keeps_zone_a() {
        let mut fx = Fixture::new(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
        fx.world.zones = vec![zone(10, 100.0), zone(11, -100.0)];
        let mut behavior = ZoneControl::default();
        behavior.decide(&fx.ctx(), &mut Fixture::rng(1), 0.05);
        assert_eq!(behavior.committed(), Some(EntityId(10)));

        // Zone A becomes ours and quiet: B now scores 20 points higher
        fx.world.zones[0].controlling_team = Some(1);
        fx.advance_to(3.0);
        let ctx = fx.ctx();
        let a = ZoneControl::score(&ctx, &ctx.world.zones[0]);
        let b = ZoneControl::score(&ctx, &ctx.world.zones[1]);
        assert!((b - a - 20.0).abs() < 1e-3);
        behavior.decide(&ctx, &mut Fixture::rng(2), 0.05);
        assert_eq!(behavior.committed(), Some(EntityId(10)));

        fx.advance_to(9.0);
        behavior.decide(&fx.ctx(), &mut Fixture::rng(3), 0.05);
        assert_eq!(behavior.committed(), Some(EntityId(11)));
    }

    #[test]
    fn test_invalid_zone_releases_commitment() {
        let mut fx = Fixture::new(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
        fx.world.zones = vec![zone(10, 100.0), zone(11, -300.0)];
        let mut behavior = ZoneControl::default();
        behavior.decide(&fx.ctx(), &mut Fixture::rng(1), 0.05);
        fx.world.zones[0].active = false;
        fx.advance_to(0.5);
        behavior.decide(&fx.ctx(), &mut Fixture::rng(2), 0.05);
        assert_eq!(behavior.committed(), Some(EntityId(11)));
    }

    #[test]
    fn test_roles_follow_ownership() {
        let mut fx = Fixture::new(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
        fx.world.zones = vec![zone(10, 500.0)];
        let mut behavior = ZoneControl::default();
        let cmd = behavior.decide(&fx.ctx(), &mut Fixture::rng(1), 0.05);
        assert_eq!(behavior.role(), ZoneRole::Contester);
        assert!(cmd.movement.x > 0.5);

        fx.world.zones[0].controlling_team = Some(1);
        behavior.decide(&fx.ctx(), &mut Fixture::rng(2), 0.05);
        assert_eq!(behavior.role(), ZoneRole::Holder);
    }

    #[test]
    fn test_priority_higher_when_contested() {
        let mut fx = Fixture::new(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
        let mut held = zone(10, 100.0);
        held.controlling_team = Some(1);
        fx.world.zones = vec![held];
        let calm = ZoneControl::default().priority(&fx.ctx());
        fx.world.zones[0].contested = true;
        assert_eq!(ZoneControl::default().priority(&fx.ctx()), calm + 15);
    }
}
