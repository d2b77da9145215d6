//! Opportunistic fighting shared by non-combat behaviors
//!
//! Wraps target selection, aiming, fire gating and reload into one call so
//! idle and objective roles can shoot back without owning a Combat instance.

use rand_chacha::ChaCha8Rng;

use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{aim_at, fighting_movement, keep_moving, should_fire, should_reload, ReloadInputs};
use crate::ai::targeting::{Candidate, TargetQuery};
use crate::core::types::{EntityId, Seconds, Vec2};

/// Outcome of one engagement pass
#[derive(Debug, Clone, Copy)]
pub struct Engagement {
    pub target: Candidate,
    pub distance: f32,
    pub aim: Vec2,
    pub fire: bool,
    pub reload: bool,
}

impl Engagement {
    /// Command that moves along `movement` while fighting this target
    pub fn command(&self, movement: Vec2) -> Command {
        Command::moving(movement, self.aim)
            .with_fire(self.fire)
            .with_reload(self.reload)
    }
}

/// Target memory and shot timer for a behavior that fights on the side
#[derive(Debug, Clone, Default)]
pub struct Skirmish {
    target: Option<EntityId>,
    last_shot: Option<Seconds>,
}

impl Skirmish {
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn reset(&mut self) {
        self.target = None;
    }

    /// Pick (or keep) a target for `query` and decide aim, fire and reload
    pub fn engage(
        &mut self,
        ctx: &DecisionContext,
        rng: &mut ChaCha8Rng,
        query: TargetQuery,
        retreating: bool,
    ) -> Option<Engagement> {
        let query = query.with_current(self.target);
        let Some(best) = ctx.selector.select(ctx.me, ctx.world, &query) else {
            self.target = None;
            return None;
        };
        self.target = Some(best.candidate.id);

        let aim = aim_at(ctx, best.candidate.position, best.candidate.velocity, rng);
        let reload = should_reload(ReloadInputs::from_context(ctx, retreating, Some(best.distance)));
        let fire = !reload && should_fire(ctx, best.distance, self.last_shot, rng);
        if fire {
            self.last_shot = Some(ctx.clock);
        }

        Some(Engagement {
            target: best.candidate,
            distance: best.distance,
            aim,
            fire,
            reload,
        })
    }

    /// Reload decision when there is nothing to shoot at
    pub fn reload_without_target(ctx: &DecisionContext, retreating: bool) -> bool {
        should_reload(ReloadInputs::from_context(ctx, retreating, None))
    }

    /// Fight the engagement if there is one, otherwise just move and look at `look_at`
    ///
    /// A role holding its position strafes its target instead, and the
    /// result never comes to a full stop.
    pub fn command_or_move(
        engagement: Option<Engagement>,
        ctx: &DecisionContext,
        rng: &mut ChaCha8Rng,
        movement: Vec2,
        look_at: Vec2,
    ) -> Command {
        match engagement {
            Some(engagement) => {
                let movement = if movement == Vec2::ZERO {
                    fighting_movement(ctx, engagement.target.position, engagement.distance)
                } else {
                    movement
                };
                engagement.command(keep_moving(movement, ctx.previous_movement, rng))
            }
            None => Command::moving(keep_moving(movement, ctx.previous_movement, rng), look_at)
                .with_reload(Self::reload_without_target(ctx, false)),
        }
    }
}
