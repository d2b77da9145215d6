//! Everything a behavior may read while deciding
//!
//! A `DecisionContext` is built fresh for each decision from the bot's own
//! state and the tick's read-only snapshot. Behaviors receive it by shared
//! reference; their own mutable state is passed separately.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::memory::MemoryStore;
use crate::ai::personality::PersonalityProfile;
use crate::ai::targeting::TargetSelector;
use crate::core::error::{BotError, Result};
use crate::core::types::{same_team, EntityId, Seconds, Vec2};
use crate::world::registry::{Registry, UtilityStats, WeaponStats};
use crate::world::snapshot::{PlayerState, WorldSnapshot};

/// Weapon and utility stats resolved from the registry at spawn
#[derive(Debug, Clone, PartialEq)]
pub struct Loadout {
    pub weapon: WeaponStats,
    pub utility: Option<UtilityStats>,
}

impl Loadout {
    /// Build and validate a loadout
    pub fn new(weapon: WeaponStats, utility: Option<UtilityStats>) -> Result<Self> {
        weapon.validate()?;
        if let Some(utility) = &utility {
            utility.validate()?;
        }
        Ok(Self { weapon, utility })
    }

    /// Resolve named equipment, falling back to the archetype's preference
    ///
    /// The archetype only matters when no weapon/utility name is given.
    pub fn resolve(
        registry: &Registry,
        personality: &PersonalityProfile,
        weapon: Option<&str>,
        utility: Option<&str>,
    ) -> Result<Self> {
        let archetype = personality.archetype();

        let weapon = match weapon {
            Some(name) => registry.weapon(name)?.clone(),
            None => match registry.weapon_of_class(archetype.preferred_weapon()) {
                Some(w) => w.clone(),
                None => registry
                    .weapons()
                    .first()
                    .cloned()
                    .ok_or_else(|| BotError::UnknownWeapon("<none registered>".into()))?,
            },
        };

        let utility = match utility {
            Some(name) => Some(registry.utility(name)?.clone()),
            None => registry
                .utilities()
                .iter()
                .find(|u| u.kind == archetype.preferred_utility())
                .cloned(),
        };

        Self::new(weapon, utility)
    }
}

/// Read-only inputs for one decision of one bot
pub struct DecisionContext<'a> {
    pub me: &'a PlayerState,
    pub world: &'a WorldSnapshot,
    pub personality: &'a PersonalityProfile,
    pub loadout: &'a Loadout,
    pub memory: &'a MemoryStore,
    pub selector: &'a TargetSelector,
    /// Accumulated simulation time of this bot; drives every periodic pattern
    pub clock: Seconds,
    pub perception_range: f32,
    /// Movement the bot emitted last tick (after smoothing)
    pub previous_movement: Vec2,
}

impl<'a> DecisionContext<'a> {
    /// Snapshot time, used for memory timestamps
    pub fn now(&self) -> Seconds {
        self.world.time
    }

    pub fn position(&self) -> Vec2 {
        self.me.position
    }

    pub fn weapon(&self) -> &'a WeaponStats {
        &self.loadout.weapon
    }

    pub fn health_fraction(&self) -> f32 {
        self.me.health_fraction()
    }

    pub fn ammo_fraction(&self) -> f32 {
        self.me.ammo as f32 / self.loadout.weapon.magazine_size.max(1) as f32
    }

    /// Enemy players this bot can currently see
    pub fn visible_enemies(&self) -> impl Iterator<Item = &'a PlayerState> + 'a {
        self.world.enemies_near(self.me, self.me.position, self.perception_range)
    }

    pub fn nearest_visible_enemy(&self) -> Option<&'a PlayerState> {
        self.world.nearest_enemy(self.me, self.perception_range)
    }

    /// Weighted count of enemies within `radius` of `point`
    ///
    /// A visible enemy counts 0.5-1.5 by its remembered threat (1 when
    /// unknown). A remembered-but-unseen one counts its threat, or fully
    /// when it has been moving aggressively.
    pub fn threat_density(&self, point: Vec2, radius: f32) -> f32 {
        let now = self.now();
        let mut visible: Vec<EntityId> = Vec::new();
        let mut density = 0.0;
        for enemy in self.visible_enemies().filter(|p| p.position.distance(point) <= radius) {
            visible.push(enemy.id);
            density += self.memory.recall(enemy.id, now).map_or(1.0, |m| 0.5 + m.threat);
        }
        let remembered: f32 = self
            .memory
            .fresh_entities(now)
            .filter(|(id, m)| {
                !visible.contains(id)
                    && m.last_position.distance(point) <= radius
                    && self
                        .world
                        .player(*id)
                        .map_or(true, |p| p.active && !same_team(self.me.team, p.team))
            })
            .map(|(_, m)| if m.pattern.aggressive { 1.0 } else { m.threat })
            .sum();
        density + remembered
    }
}
