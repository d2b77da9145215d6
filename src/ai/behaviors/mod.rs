//! Behavior catalog
//!
//! Architecture: closed set of tagged variants
//! - `Behavior` is the common contract every strategy implements
//! - `BehaviorKind` tags a catalog entry; `BehaviorState::new` is the factory
//! - Each bot owns one `BehaviorState` per catalog entry, mutated in place
//!   and kept across arbitration switches

mod area_control;
mod base_assault;
mod carried_item;
mod combat;
mod defense;
#[cfg(test)]
pub(crate) mod fixture;
mod flag;
mod idle;
mod loot;
mod objective;
mod skirmish;
mod zone_control;

pub use area_control::AreaControl;
pub use base_assault::BaseAssault;
pub use carried_item::CarriedItem;
pub use combat::Combat;
pub use defense::Defense;
pub use flag::FlagCarry;
pub use idle::Idle;
pub use loot::LootSeeking;
pub use objective::{Commitment, RoleClock, COMMITMENT_BONUS, COMMITMENT_WINDOW};
pub use skirmish::{Engagement, Skirmish};
pub use zone_control::ZoneControl;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::command::Command;
use crate::ai::context::DecisionContext;
use crate::core::types::Seconds;

/// Contract shared by every strategy in the catalog
pub trait Behavior {
    /// How much this behavior wants to run right now, in [0, 100]
    fn priority(&self, ctx: &DecisionContext) -> u8;

    /// Whether the behavior, if active, still has something to do
    fn should_continue(&self, ctx: &DecisionContext) -> bool;

    /// Produce this tick's command
    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, dt: Seconds) -> Command;

    /// Called when arbitration switches to this behavior
    fn on_enter(&mut self, _ctx: &DecisionContext) {}

    /// Called when arbitration switches away from this behavior
    fn on_exit(&mut self) {}
}

/// Tag of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Combat,
    FlagCarry,
    CarriedItem,
    ZoneControl,
    AreaControl,
    Defense,
    BaseAssault,
    LootSeeking,
    Idle,
}

impl BehaviorKind {
    /// Full catalog in declaration order (the arbitration tie-break order)
    pub const ALL: [BehaviorKind; 9] = [
        BehaviorKind::Combat,
        BehaviorKind::FlagCarry,
        BehaviorKind::CarriedItem,
        BehaviorKind::ZoneControl,
        BehaviorKind::AreaControl,
        BehaviorKind::Defense,
        BehaviorKind::BaseAssault,
        BehaviorKind::LootSeeking,
        BehaviorKind::Idle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BehaviorKind::Combat => "combat",
            BehaviorKind::FlagCarry => "flag_carry",
            BehaviorKind::CarriedItem => "carried_item",
            BehaviorKind::ZoneControl => "zone_control",
            BehaviorKind::AreaControl => "area_control",
            BehaviorKind::Defense => "defense",
            BehaviorKind::BaseAssault => "base_assault",
            BehaviorKind::LootSeeking => "loot_seeking",
            BehaviorKind::Idle => "idle",
        }
    }
}

impl std::fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-bot state of one catalog entry
#[derive(Debug, Clone)]
pub enum BehaviorState {
    Combat(Combat),
    FlagCarry(FlagCarry),
    CarriedItem(CarriedItem),
    ZoneControl(ZoneControl),
    AreaControl(AreaControl),
    Defense(Defense),
    BaseAssault(BaseAssault),
    LootSeeking(LootSeeking),
    Idle(Idle),
}

impl BehaviorState {
    /// Fresh, zero-state instance for `kind`
    pub fn new(kind: BehaviorKind) -> Self {
        match kind {
            BehaviorKind::Combat => BehaviorState::Combat(Combat::default()),
            BehaviorKind::FlagCarry => BehaviorState::FlagCarry(FlagCarry::default()),
            BehaviorKind::CarriedItem => BehaviorState::CarriedItem(CarriedItem::default()),
            BehaviorKind::ZoneControl => BehaviorState::ZoneControl(ZoneControl::default()),
            BehaviorKind::AreaControl => BehaviorState::AreaControl(AreaControl::default()),
            BehaviorKind::Defense => BehaviorState::Defense(Defense::default()),
            BehaviorKind::BaseAssault => BehaviorState::BaseAssault(BaseAssault::default()),
            BehaviorKind::LootSeeking => BehaviorState::LootSeeking(LootSeeking::default()),
            BehaviorKind::Idle => BehaviorState::Idle(Idle::default()),
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            BehaviorState::Combat(_) => BehaviorKind::Combat,
            BehaviorState::FlagCarry(_) => BehaviorKind::FlagCarry,
            BehaviorState::CarriedItem(_) => BehaviorKind::CarriedItem,
            BehaviorState::ZoneControl(_) => BehaviorKind::ZoneControl,
            BehaviorState::AreaControl(_) => BehaviorKind::AreaControl,
            BehaviorState::Defense(_) => BehaviorKind::Defense,
            BehaviorState::BaseAssault(_) => BehaviorKind::BaseAssault,
            BehaviorState::LootSeeking(_) => BehaviorKind::LootSeeking,
            BehaviorState::Idle(_) => BehaviorKind::Idle,
        }
    }

    fn inner(&self) -> &dyn Behavior {
        match self {
            BehaviorState::Combat(b) => b,
            BehaviorState::FlagCarry(b) => b,
            BehaviorState::CarriedItem(b) => b,
            BehaviorState::ZoneControl(b) => b,
            BehaviorState::AreaControl(b) => b,
            BehaviorState::Defense(b) => b,
            BehaviorState::BaseAssault(b) => b,
            BehaviorState::LootSeeking(b) => b,
            BehaviorState::Idle(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Behavior {
        match self {
            BehaviorState::Combat(b) => b,
            BehaviorState::FlagCarry(b) => b,
            BehaviorState::CarriedItem(b) => b,
            BehaviorState::ZoneControl(b) => b,
            BehaviorState::AreaControl(b) => b,
            BehaviorState::Defense(b) => b,
            BehaviorState::BaseAssault(b) => b,
            BehaviorState::LootSeeking(b) => b,
            BehaviorState::Idle(b) => b,
        }
    }
}

impl Behavior for BehaviorState {
    fn priority(&self, ctx: &DecisionContext) -> u8 {
        self.inner().priority(ctx).min(100)
    }

    fn should_continue(&self, ctx: &DecisionContext) -> bool {
        self.inner().should_continue(ctx)
    }

    fn decide(&mut self, ctx: &DecisionContext, rng: &mut ChaCha8Rng, dt: Seconds) -> Command {
        self.inner_mut().decide(ctx, rng, dt)
    }

    fn on_enter(&mut self, ctx: &DecisionContext) {
        self.inner_mut().on_enter(ctx)
    }

    fn on_exit(&mut self) {
        self.inner_mut().on_exit()
    }
}

/// Score in [0, 100] as the integer priority behaviors report
pub(crate) fn to_priority(score: f32) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}
