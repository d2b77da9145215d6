//! Arbitration engine - picks the active behavior for a bot and runs it
//!
//! Selection uses priority scoring with a hysteresis band: an incumbent that
//! still wants to run gets `stickiness` added to its priority, and an
//! alternative must beat that by more than `switch_margin` to take over.

use crate::ai::behaviors::{Behavior, BehaviorKind};
use crate::ai::bot::Bot;
use crate::ai::command::Command;
use crate::ai::context::{decision_rng, DecisionContext, Loadout};
use crate::ai::personality::PersonalityProfile;
use crate::ai::targeting::TargetSelector;
use crate::core::config::AiConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Seconds, Vec2};
use crate::world::snapshot::WorldSnapshot;

/// Aim this far ahead of the bot when falling back to a safe command
const FALLBACK_AIM_DISTANCE: f32 = 100.0;

/// The currently active behavior going into a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incumbent {
    pub index: usize,
    /// Result of the incumbent's continuation predicate
    pub continues: bool,
}

/// Outcome of one arbitration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Keep the incumbent; no lifecycle callbacks
    Stay(usize),
    /// Activate `to`, leaving `from` if there was one
    Switch { from: Option<usize>, to: usize },
}

impl Selection {
    /// Index of the behavior that runs this decision
    pub fn index(&self) -> usize {
        match *self {
            Selection::Stay(index) => index,
            Selection::Switch { to, .. } => to,
        }
    }
}

/// Highest priority, first in catalog order on ties
fn best_of(priorities: impl Iterator<Item = (usize, u8)>) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for (index, priority) in priorities {
        if best.map_or(true, |(_, b)| priority > b) {
            best = Some((index, priority));
        }
    }
    best.map(|(index, _)| index)
}

/// Choose the behavior to run from catalog-ordered priorities
///
/// Returns `None` only for an empty catalog.
pub fn arbitrate(
    priorities: &[u8],
    incumbent: Option<Incumbent>,
    stickiness: u32,
    margin: u32,
) -> Option<Selection> {
    let indexed = || priorities.iter().copied().enumerate();
    let best = best_of(indexed())?;

    let Some(incumbent) = incumbent.filter(|i| i.index < priorities.len()) else {
        return Some(Selection::Switch { from: None, to: best });
    };

    if !incumbent.continues {
        return Some(if best == incumbent.index {
            Selection::Stay(best)
        } else {
            Selection::Switch { from: Some(incumbent.index), to: best }
        });
    }

    let held = u32::from(priorities[incumbent.index]) + stickiness;
    let challenger = best_of(indexed().filter(|&(i, _)| i != incumbent.index));
    match challenger {
        Some(to) if u32::from(priorities[to]) > held + margin => {
            Some(Selection::Switch { from: Some(incumbent.index), to })
        }
        _ => Some(Selection::Stay(incumbent.index)),
    }
}

/// Runs arbitration and the active behavior for bots sharing one catalog
#[derive(Debug)]
pub struct ArbitrationEngine {
    catalog: Vec<BehaviorKind>,
    config: AiConfig,
    selector: TargetSelector,
    seed: u64,
    warned_empty: bool,
}

impl ArbitrationEngine {
    /// Create an engine; the config is validated, duplicate catalog entries dropped
    pub fn new(config: AiConfig, catalog: &[BehaviorKind], seed: u64) -> Result<Self> {
        config.validate()?;
        let mut unique: Vec<BehaviorKind> = Vec::with_capacity(catalog.len());
        for &kind in catalog {
            if unique.contains(&kind) {
                tracing::warn!(behavior = %kind, "duplicate catalog entry ignored");
            } else {
                unique.push(kind);
            }
        }
        Ok(Self {
            selector: TargetSelector::new(&config),
            catalog: unique,
            config,
            seed,
            warned_empty: false,
        })
    }

    /// Engine with the default config and the full catalog
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::new(AiConfig::default(), &BehaviorKind::ALL, seed)
    }

    pub fn catalog(&self) -> &[BehaviorKind] {
        &self.catalog
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Build a bot joining arbitration with zero-state behavior instances
    pub fn enroll(&self, id: EntityId, personality: PersonalityProfile, loadout: Loadout) -> Result<Bot> {
        Bot::new(id, personality, loadout, &self.config, &self.catalog)
    }

    /// Advance `bot` by `dt` and produce its command for this tick
    ///
    /// Returns `None` when the bot's player is missing from `world` or inactive.
    pub fn tick(&mut self, bot: &mut Bot, world: &WorldSnapshot, dt: Seconds) -> Option<Command> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        bot.clock += dt;
        bot.since_decision += dt;
        bot.cooldown -= dt;

        let me = world.player(bot.id).filter(|p| p.active)?;

        if bot.cooldown > 0.0 {
            if let Some(last) = bot.last_command {
                // Hold: keep steering toward the last decided movement
                let target = bot.motion.target();
                let held = Command {
                    movement: bot.motion.smooth(target),
                    secondary: false,
                    ..last
                }
                .sanitized(me.ammo);
                bot.last_command = Some(held);
                return Some(held);
            }
        }
        bot.cooldown = self.config.decision_interval;

        bot.observe(world, self.config.perception_range, self.config.memory_sweep_interval);
        bot.decisions += 1;
        let elapsed = std::mem::take(&mut bot.since_decision);

        if self.catalog.is_empty() || bot.behaviors.is_empty() {
            if !self.warned_empty {
                tracing::warn!(bot = %bot.id, "behavior catalog is empty, emitting neutral commands");
                self.warned_empty = true;
            }
            let neutral = Command::neutral(me.position).sanitized(me.ammo);
            bot.last_command = Some(neutral);
            return Some(neutral);
        }

        let mut rng = decision_rng(self.seed, bot.id, bot.decisions);
        let Bot {
            id,
            personality,
            loadout,
            memory,
            behaviors,
            active,
            clock,
            motion,
            ..
        } = bot;

        let ctx = DecisionContext {
            me,
            world,
            personality,
            loadout,
            memory,
            selector: &self.selector,
            clock: *clock,
            perception_range: self.config.perception_range,
            previous_movement: motion.previous(),
        };

        let priorities: Vec<u8> = behaviors.iter().map(|b| b.priority(&ctx)).collect();
        let incumbent = active.and_then(|index| {
            behaviors.get(index).map(|b| Incumbent {
                index,
                continues: b.should_continue(&ctx),
            })
        });
        let selection = arbitrate(
            &priorities,
            incumbent,
            self.config.stickiness,
            self.config.switch_margin,
        )?;

        if let Selection::Switch { from, to } = selection {
            if let Some(previous) = from.and_then(|i| behaviors.get_mut(i)) {
                previous.on_exit();
            }
            if let Some(next) = behaviors.get_mut(to) {
                next.on_enter(&ctx);
            }
            tracing::debug!(
                bot = %id,
                from = ?from.and_then(|i| behaviors.get(i)).map(|b| b.kind()),
                to = %behaviors[to].kind(),
                from_priority = ?from.map(|i| priorities[i]),
                to_priority = priorities[to],
                "behavior switch"
            );
        }
        let index = selection.index();
        *active = Some(index);

        let behavior = &mut behaviors[index];
        let mut command = behavior.decide(&ctx, &mut rng, elapsed);
        if !command.is_finite() {
            tracing::warn!(bot = %id, behavior = %behavior.kind(), "non-finite command replaced");
            command = fallback(&ctx);
        }
        tracing::trace!(
            bot = %id,
            behavior = %behavior.kind(),
            fire = command.fire,
            reload = command.reload,
            "decision"
        );

        command.movement = motion.smooth(command.movement);
        let command = command.sanitized(me.ammo);
        bot.last_command = Some(command);
        Some(command)
    }
}

/// Idle-equivalent output: keep going the way we were, aim ahead, hold fire
fn fallback(ctx: &DecisionContext) -> Command {
    let movement = if ctx.previous_movement.is_finite() {
        ctx.previous_movement
    } else {
        Vec2::ZERO
    };
    let heading = if movement == Vec2::ZERO { Vec2::X } else { movement.normalize_or_zero() };
    Command::moving(movement, ctx.position() + heading * FALLBACK_AIM_DISTANCE)
}
