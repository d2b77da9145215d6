//! Bot personality: an immutable trait vector loaded from TOML presets
//!
//! Every downstream decision reads these traits. They are fixed at spawn;
//! the fields are private so nothing can mutate a profile once built.

use serde::{Deserialize, Serialize};

use crate::world::registry::{UtilityKind, WeaponClass};

/// TOML/serde shape of a profile; clamped into a `PersonalityProfile`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawProfile {
    aggressiveness: f32,
    accuracy: f32,
    reaction_speed: f32,
    strategic_thinking: f32,
    teamwork: f32,
    risk_tolerance: f32,
    mobility: f32,
    cover_usage: f32,
    adaptability: f32,
    patience: f32,
    preferred_combat_range: f32,
}

impl Default for RawProfile {
    fn default() -> Self {
        Self {
            aggressiveness: 0.5,
            accuracy: 0.6,
            reaction_speed: 0.5,
            strategic_thinking: 0.5,
            teamwork: 0.5,
            risk_tolerance: 0.5,
            mobility: 0.5,
            cover_usage: 0.5,
            adaptability: 0.5,
            patience: 0.5,
            preferred_combat_range: 350.0,
        }
    }
}

impl From<RawProfile> for PersonalityProfile {
    fn from(raw: RawProfile) -> Self {
        PersonalityProfile::new(
            TraitValues {
                aggressiveness: raw.aggressiveness,
                accuracy: raw.accuracy,
                reaction_speed: raw.reaction_speed,
                strategic_thinking: raw.strategic_thinking,
                teamwork: raw.teamwork,
                risk_tolerance: raw.risk_tolerance,
                mobility: raw.mobility,
                cover_usage: raw.cover_usage,
                adaptability: raw.adaptability,
                patience: raw.patience,
            },
            raw.preferred_combat_range,
        )
    }
}

/// The ten [0, 1] traits, used to build a profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitValues {
    pub aggressiveness: f32,
    pub accuracy: f32,
    pub reaction_speed: f32,
    pub strategic_thinking: f32,
    pub teamwork: f32,
    pub risk_tolerance: f32,
    pub mobility: f32,
    pub cover_usage: f32,
    pub adaptability: f32,
    pub patience: f32,
}

impl Default for TraitValues {
    fn default() -> Self {
        let raw = RawProfile::default();
        Self {
            aggressiveness: raw.aggressiveness,
            accuracy: raw.accuracy,
            reaction_speed: raw.reaction_speed,
            strategic_thinking: raw.strategic_thinking,
            teamwork: raw.teamwork,
            risk_tolerance: raw.risk_tolerance,
            mobility: raw.mobility,
            cover_usage: raw.cover_usage,
            adaptability: raw.adaptability,
            patience: raw.patience,
        }
    }
}

/// Immutable personality of a bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProfile")]
pub struct PersonalityProfile {
    aggressiveness: f32,
    accuracy: f32,
    reaction_speed: f32,
    strategic_thinking: f32,
    teamwork: f32,
    risk_tolerance: f32,
    mobility: f32,
    cover_usage: f32,
    adaptability: f32,
    patience: f32,
    /// Absolute distance (world units) the bot likes to fight at
    preferred_combat_range: f32,
}

fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

impl PersonalityProfile {
    /// Build a profile; traits are clamped to [0, 1] and the range to >= 0
    pub fn new(traits: TraitValues, preferred_combat_range: f32) -> Self {
        Self {
            aggressiveness: unit(traits.aggressiveness),
            accuracy: unit(traits.accuracy),
            reaction_speed: unit(traits.reaction_speed),
            strategic_thinking: unit(traits.strategic_thinking),
            teamwork: unit(traits.teamwork),
            risk_tolerance: unit(traits.risk_tolerance),
            mobility: unit(traits.mobility),
            cover_usage: unit(traits.cover_usage),
            adaptability: unit(traits.adaptability),
            patience: unit(traits.patience),
            preferred_combat_range: if preferred_combat_range.is_finite() {
                preferred_combat_range.max(0.0)
            } else {
                350.0
            },
        }
    }

    pub fn aggressiveness(&self) -> f32 {
        self.aggressiveness
    }
    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }
    pub fn reaction_speed(&self) -> f32 {
        self.reaction_speed
    }
    pub fn strategic_thinking(&self) -> f32 {
        self.strategic_thinking
    }
    pub fn teamwork(&self) -> f32 {
        self.teamwork
    }
    pub fn risk_tolerance(&self) -> f32 {
        self.risk_tolerance
    }
    pub fn mobility(&self) -> f32 {
        self.mobility
    }
    pub fn cover_usage(&self) -> f32 {
        self.cover_usage
    }
    pub fn adaptability(&self) -> f32 {
        self.adaptability
    }
    pub fn patience(&self) -> f32 {
        self.patience
    }
    pub fn preferred_combat_range(&self) -> f32 {
        self.preferred_combat_range
    }

    /// Derived label; only used to bias equipment choice
    pub fn archetype(&self) -> Archetype {
        if self.aggressiveness > 0.8 && self.risk_tolerance > 0.7 {
            Archetype::Berserker
        } else if self.accuracy > 0.8 && self.preferred_combat_range > 500.0 && self.patience > 0.6 {
            Archetype::Sniper
        } else if self.mobility > 0.8 && self.aggressiveness > 0.6 {
            Archetype::Rusher
        } else if self.strategic_thinking > 0.8 && self.adaptability > 0.6 {
            Archetype::Strategist
        } else if self.cover_usage > 0.7 && self.patience > 0.7 && self.aggressiveness < 0.4 {
            Archetype::Guardian
        } else if self.teamwork > 0.8 {
            Archetype::Support
        } else {
            Archetype::Soldier
        }
    }
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        RawProfile::default().into()
    }
}

/// Coarse personality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Berserker,
    Sniper,
    Rusher,
    Strategist,
    Support,
    Guardian,
    Soldier,
}

impl Archetype {
    pub fn preferred_weapon(&self) -> WeaponClass {
        match self {
            Archetype::Berserker => WeaponClass::Shotgun,
            Archetype::Sniper => WeaponClass::Sniper,
            Archetype::Rusher => WeaponClass::Smg,
            Archetype::Strategist => WeaponClass::Rifle,
            Archetype::Support => WeaponClass::Beam,
            Archetype::Guardian => WeaponClass::Launcher,
            Archetype::Soldier => WeaponClass::Rifle,
        }
    }

    pub fn preferred_utility(&self) -> UtilityKind {
        match self {
            Archetype::Berserker | Archetype::Strategist | Archetype::Soldier => UtilityKind::Grenade,
            Archetype::Sniper | Archetype::Rusher => UtilityKind::Dash,
            Archetype::Support => UtilityKind::Heal,
            Archetype::Guardian => UtilityKind::Shield,
        }
    }
}
