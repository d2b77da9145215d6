//! Idle/wander: roam between random waypoints and shoot whatever wanders by

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ai::behaviors::skirmish::Skirmish;
use crate::ai::behaviors::Behavior;
use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::ai::tactics::{keep_moving, steer_to};
use crate::ai::targeting::{KindFilter, TargetQuery};
use crate::core::types::{direction, Seconds, Vec2};

const PRIORITY: u8 = 15;
const PRIORITY_ENEMY_VISIBLE: u8 = 5;
const WAYPOINT_MIN: f32 = 150.0;
const WAYPOINT_MAX: f32 = 400.0;
/// A clamped sample closer than this is thrown away
const MIN_OFFSET: f32 = 100.0;
const RESAMPLE_INTERVAL: Seconds = 2.0;
const ARRIVE: f32 = 30.0;
const ENGAGE_RANGE: f32 = 400.0;
const SAMPLE_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct Idle {
    waypoint: Option<Vec2>,
    next_resample: Seconds,
    skirmish: Skirmish,
}

impl Idle {
    pub fn waypoint(&self) -> Option<Vec2> {
        self.waypoint
    }

    fn sample_waypoint(ctx: &DecisionContext, rng: &mut ChaCha8Rng) -> Vec2 {
        let me = ctx.position();
        let bounds = &ctx.world.bounds;
        let mut candidate = me;
        for _ in 0..SAMPLE_ATTEMPTS {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = rng.gen_range(WAYPOINT_MIN..WAYPOINT_MAX);
            candidate = bounds.clamp(me + Vec2::from_angle(angle) * distance);
            if candidate.distance(me) >= MIN_OFFSET {
                return candidate;
            }
        }
        // Stuck in a corner: head for the middle of the arena
        let inward = direction(me, bounds.center());
        let fallback = bounds.clamp(me + inward * WAYPOINT_MIN);
        if fallback.distance(me) >= MIN_OFFSET {
            fallback
        } else {
            candidate
        }
    }
}

impl Behavior for Idle {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        if ctx.nearest_visible_enemy().is_some() {
            PRIORITY_ENEMY_VISIBLE
        } else {
            PRIORITY
        }
    }

    fn should_continue(&self, _ctx: &DecisionContext) -> bool {
        true
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, _dt: Seconds) -> Command {
        let me = ctx.position();
        let arrived = self.waypoint.map_or(true, |w| w.distance(me) <= ARRIVE);
        if arrived || ctx.clock >= self.next_resample {
            self.waypoint = Some(Self::sample_waypoint(ctx, rng));
            self.next_resample = ctx.clock + RESAMPLE_INTERVAL;
        }
        let waypoint = self.waypoint.unwrap_or(me);

        let movement = keep_moving(steer_to(me, waypoint, ARRIVE), ctx.previous_movement, rng);
        let query = TargetQuery::new(ENGAGE_RANGE, ctx.weapon().range).with_kinds(KindFilter::COMBATANTS);
        let engagement = self.skirmish.engage(ctx, rng, query, false);

        Skirmish::command_or_move(engagement, ctx, rng, movement, me + movement * 100.0)
    }

    fn on_enter(&mut self, _ctx: &DecisionContext) {
        self.waypoint = None;
    }
}
