//! Decision-engine configuration with documented constants
//!
//! All tuning numbers shared between arbitration, memory and targeting live
//! here. Behavior-local constants stay next to the behavior that uses them.

use serde::Deserialize;

use crate::core::error::{BotError, Result};

/// Configuration for the bot decision engine
///
/// The arbitration values are part of the observable contract: an alternative
/// behavior must beat the incumbent by more than `stickiness + switch_margin`
/// points before the engine switches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // === ARBITRATION ===
    /// Bonus added to the incumbent behavior's priority while it wants to continue
    pub stickiness: u32,

    /// Extra margin an alternative must exceed on top of the stickiness bonus
    pub switch_margin: u32,

    /// Seconds between full decisions for a bot (~50ms)
    ///
    /// Between decisions the bot re-emits its last command through the
    /// movement smoother.
    pub decision_interval: f32,

    // === PERCEPTION & MEMORY ===
    /// Distance at which a bot can see another entity (world units)
    pub perception_range: f32,

    /// Seconds an entity sighting stays in memory
    pub entity_ttl: f32,

    /// Seconds a contested-objective observation stays in memory
    pub objective_ttl: f32,

    /// Seconds between memory sweeps
    pub memory_sweep_interval: f32,

    // === MOVEMENT SMOOTHING ===
    /// Minimum blend toward the new movement target per held tick
    pub base_blend: f32,

    /// Additional blend granted by a reaction speed of 1.0
    ///
    /// base_blend + reaction_blend_bonus must stay <= 1.0.
    pub reaction_blend_bonus: f32,

    // === TARGET SCORING ===
    /// Weight for normalized proximity (1.0 at zero distance, 0.0 at cutoff)
    pub proximity_weight: f32,
    /// Weight for normalized missing health
    pub health_deficit_weight: f32,
    /// Bonus for targets below 75% health
    pub wounded_bonus: f32,
    /// Bonus for targets below 50% health (stacks with wounded_bonus)
    pub finishing_bonus: f32,
    /// Bonus for keeping the previous target
    pub continuity_bonus: f32,
    /// Multiplier for the candidate's type-priority weight
    pub type_weight: f32,
    /// Weight for the weapon effectiveness-at-range curve
    pub effectiveness_weight: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            // Arbitration (15 + 10 = a 25 point band)
            stickiness: 15,
            switch_margin: 10,
            decision_interval: 0.05,

            // Perception
            perception_range: 900.0,
            entity_ttl: 10.0,
            objective_ttl: 30.0,
            memory_sweep_interval: 1.0,

            // Smoothing
            base_blend: 0.35,
            reaction_blend_bonus: 0.45,

            // Targeting
            proximity_weight: 30.0,
            health_deficit_weight: 20.0,
            wounded_bonus: 10.0,
            finishing_bonus: 15.0,
            continuity_bonus: 15.0,
            type_weight: 20.0,
            effectiveness_weight: 25.0,
        }
    }
}

impl AiConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AiConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Total lead an alternative needs over the incumbent's raw priority
    pub fn switch_threshold(&self) -> u32 {
        self.stickiness + self.switch_margin
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("decision_interval", self.decision_interval),
            ("perception_range", self.perception_range),
            ("entity_ttl", self.entity_ttl),
            ("objective_ttl", self.objective_ttl),
            ("memory_sweep_interval", self.memory_sweep_interval),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(BotError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let blend_max = self.base_blend + self.reaction_blend_bonus;
        if !(self.base_blend > 0.0) || self.reaction_blend_bonus < 0.0 || blend_max > 1.0 {
            return Err(BotError::InvalidConfig(format!(
                "movement blend must lie in (0, 1], got {} + {}",
                self.base_blend, self.reaction_blend_bonus
            )));
        }

        Ok(())
    }
}
