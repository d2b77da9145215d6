//! Static weapon/utility tables and personality presets
//!
//! The registry is read-only once built. Bots copy the stats they need at
//! construction time, so invalid entries are rejected here rather than
//! discovered mid-decision.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ai::personality::PersonalityProfile;
use crate::core::error::{BotError, Result};

/// Broad weapon families, used for archetype-based equipment choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponClass {
    Rifle,
    Smg,
    Shotgun,
    Sniper,
    Beam,
    Launcher,
}

/// Stats of a primary weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub name: String,
    pub class: WeaponClass,
    /// Maximum effective range (world units)
    pub range: f32,
    /// Projectile speed in units/second; 0 for instantaneous (beam/hitscan)
    pub projectile_speed: f32,
    /// Intrinsic accuracy in [0, 1]
    pub accuracy: f32,
    pub magazine_size: u32,
    /// Minimum seconds between shots
    pub fire_interval: f32,
    pub reload_time: f32,
}

impl WeaponStats {
    /// Beam-class weapons and zero-speed projectiles hit instantly
    pub fn is_instant(&self) -> bool {
        self.class == WeaponClass::Beam || self.projectile_speed <= 0.0
    }

    /// Distance the weapon is most comfortable at (70% of range)
    pub fn optimal_range(&self) -> f32 {
        self.range * 0.7
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| BotError::InvalidWeapon {
            name: self.name.clone(),
            reason,
        };
        if self.magazine_size == 0 {
            return Err(invalid("magazine_size must be at least 1".into()));
        }
        if !(self.range > 0.0) {
            return Err(invalid(format!("range must be positive, got {}", self.range)));
        }
        if !(self.projectile_speed >= 0.0) {
            return Err(invalid(format!(
                "projectile_speed must not be negative, got {}",
                self.projectile_speed
            )));
        }
        if !(self.fire_interval > 0.0) {
            return Err(invalid(format!(
                "fire_interval must be positive, got {}",
                self.fire_interval
            )));
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(invalid(format!("accuracy must lie in [0, 1], got {}", self.accuracy)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityKind {
    Grenade,
    Heal,
    Shield,
    Dash,
}

impl UtilityKind {
    /// Utilities that help escape rather than damage
    pub fn is_defensive(&self) -> bool {
        matches!(self, UtilityKind::Heal | UtilityKind::Shield | UtilityKind::Dash)
    }
}

/// Stats of a secondary/utility slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityStats {
    pub name: String,
    pub kind: UtilityKind,
    pub range: f32,
    pub cooldown: f32,
}

impl UtilityStats {
    pub fn validate(&self) -> Result<()> {
        if !(self.range >= 0.0) || !(self.cooldown >= 0.0) {
            return Err(BotError::InvalidUtility {
                name: self.name.clone(),
                reason: "range and cooldown must not be negative".into(),
            });
        }
        Ok(())
    }
}

/// TOML representation of a registry file
#[derive(Debug, Deserialize)]
struct TomlRegistry {
    #[serde(default)]
    weapons: Vec<WeaponStats>,
    #[serde(default)]
    utilities: Vec<UtilityStats>,
    #[serde(default)]
    personalities: BTreeMap<String, PersonalityProfile>,
}

/// Read-only configuration registry injected at bot construction
#[derive(Debug, Clone, Default)]
pub struct Registry {
    weapons: Vec<WeaponStats>,
    utilities: Vec<UtilityStats>,
    personalities: BTreeMap<String, PersonalityProfile>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in tables (hardcoded, mirrors data/weapons.toml)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let weapon = |name: &str, class, range, speed, accuracy, mag, interval, reload| WeaponStats {
            name: name.into(),
            class,
            range,
            projectile_speed: speed,
            accuracy,
            magazine_size: mag,
            fire_interval: interval,
            reload_time: reload,
        };
        registry.weapons = vec![
            weapon("rifle", WeaponClass::Rifle, 600.0, 1800.0, 0.8, 30, 0.1, 2.0),
            weapon("smg", WeaponClass::Smg, 350.0, 1500.0, 0.65, 40, 0.06, 1.6),
            weapon("shotgun", WeaponClass::Shotgun, 200.0, 1200.0, 0.55, 8, 0.7, 2.8),
            weapon("sniper", WeaponClass::Sniper, 1100.0, 3500.0, 0.95, 5, 1.2, 3.0),
            weapon("lance", WeaponClass::Beam, 450.0, 0.0, 0.85, 20, 0.15, 2.2),
            weapon("launcher", WeaponClass::Launcher, 500.0, 700.0, 0.6, 4, 1.0, 3.2),
        ];
        registry.utilities = vec![
            UtilityStats { name: "frag".into(), kind: UtilityKind::Grenade, range: 350.0, cooldown: 12.0 },
            UtilityStats { name: "medkit".into(), kind: UtilityKind::Heal, range: 0.0, cooldown: 20.0 },
            UtilityStats { name: "barrier".into(), kind: UtilityKind::Shield, range: 0.0, cooldown: 15.0 },
            UtilityStats { name: "blink".into(), kind: UtilityKind::Dash, range: 200.0, cooldown: 8.0 },
        ];
        registry.personalities.insert("default".into(), PersonalityProfile::default());
        registry
    }

    /// Parse a registry from TOML, validating every entry
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let data: TomlRegistry = toml::from_str(content)?;
        let mut registry = Self::new();
        for weapon in data.weapons {
            registry.add_weapon(weapon)?;
        }
        for utility in data.utilities {
            registry.add_utility(utility)?;
        }
        registry.personalities = data.personalities;
        Ok(registry)
    }

    /// Load a registry from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn add_weapon(&mut self, weapon: WeaponStats) -> Result<()> {
        weapon.validate()?;
        self.weapons.retain(|w| w.name != weapon.name);
        self.weapons.push(weapon);
        Ok(())
    }

    pub fn add_utility(&mut self, utility: UtilityStats) -> Result<()> {
        utility.validate()?;
        self.utilities.retain(|u| u.name != utility.name);
        self.utilities.push(utility);
        Ok(())
    }

    pub fn add_personality(&mut self, name: impl Into<String>, profile: PersonalityProfile) {
        self.personalities.insert(name.into(), profile);
    }

    pub fn weapon(&self, name: &str) -> Result<&WeaponStats> {
        self.weapons
            .iter()
            .find(|w| w.name == name)
            .ok_or_else(|| BotError::UnknownWeapon(name.to_string()))
    }

    pub fn utility(&self, name: &str) -> Result<&UtilityStats> {
        self.utilities
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| BotError::UnknownUtility(name.to_string()))
    }

    /// First weapon of the given class, in registration order
    pub fn weapon_of_class(&self, class: WeaponClass) -> Option<&WeaponStats> {
        self.weapons.iter().find(|w| w.class == class)
    }

    pub fn weapons(&self) -> &[WeaponStats] {
        &self.weapons
    }

    pub fn utilities(&self) -> &[UtilityStats] {
        &self.utilities
    }

    pub fn personality(&self, name: &str) -> Result<&PersonalityProfile> {
        self.personalities
            .get(name)
            .ok_or_else(|| BotError::UnknownPreset(name.to_string()))
    }
}

/// Load a personality preset from TOML
///
/// Loads from `data/personalities/{name}.toml`
pub fn load_personality(name: &str) -> Result<PersonalityProfile> {
    let content = fs::read_to_string(personality_path(name))?;
    let profile: PersonalityProfile = toml::from_str(&content)?;
    Ok(profile)
}

/// Get path to personality file
fn personality_path(name: &str) -> PathBuf {
    PathBuf::from("data/personalities").join(format!("{}.toml", name))
}
