//! Bot director - runs every bot against one snapshot per tick
//!
//! All bots decide against the same read-only snapshot. Commands are
//! buffered and only handed out by `drain_commands`, so no bot ever sees
//! another bot's decision from the same tick.

use std::collections::BTreeMap;

use crate::ai::arbitration::ArbitrationEngine;
use crate::ai::behaviors::BehaviorKind;
use crate::ai::bot::Bot;
use crate::ai::command::Command;
use crate::ai::context::Loadout;
use crate::ai::personality::PersonalityProfile;
use crate::core::error::{BotError, Result};
use crate::core::types::{EntityId, Seconds};
use crate::world::registry::Registry;
use crate::world::snapshot::WorldSnapshot;

/// What a bot is spawned with
#[derive(Debug, Clone)]
pub struct BotSpec {
    pub id: EntityId,
    pub personality: PersonalityProfile,
    /// Weapon name; the archetype's preferred class when absent
    pub weapon: Option<String>,
    pub utility: Option<String>,
}

impl BotSpec {
    pub fn new(id: EntityId, personality: PersonalityProfile) -> Self {
        Self {
            id,
            personality,
            weapon: None,
            utility: None,
        }
    }

    /// Registration using a named personality preset from the registry
    pub fn from_preset(id: EntityId, registry: &Registry, preset: &str) -> Result<Self> {
        Ok(Self::new(id, registry.personality(preset)?.clone()))
    }

    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapon = Some(weapon.into());
        self
    }

    pub fn with_utility(mut self, utility: impl Into<String>) -> Self {
        self.utility = Some(utility.into());
        self
    }
}

/// Owns the engine, the registry and every bot
pub struct BotDirector {
    engine: ArbitrationEngine,
    registry: Registry,
    bots: BTreeMap<EntityId, Bot>,
    pending: BTreeMap<EntityId, Command>,
}

impl BotDirector {
    pub fn new(engine: ArbitrationEngine, registry: Registry) -> Self {
        Self {
            engine,
            registry,
            bots: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn engine(&self) -> &ArbitrationEngine {
        &self.engine
    }

    /// Register a bot; equipment is resolved and validated here
    pub fn add_bot(&mut self, spec: BotSpec) -> Result<()> {
        if self.bots.contains_key(&spec.id) {
            return Err(BotError::DuplicateBot(spec.id));
        }
        let loadout = Loadout::resolve(
            &self.registry,
            &spec.personality,
            spec.weapon.as_deref(),
            spec.utility.as_deref(),
        )?;
        let archetype = spec.personality.archetype();
        let bot = self.engine.enroll(spec.id, spec.personality, loadout)?;
        tracing::debug!(
            bot = %spec.id,
            ?archetype,
            weapon = %bot.loadout().weapon.name,
            "bot registered"
        );
        self.bots.insert(spec.id, bot);
        Ok(())
    }

    /// Remove a bot and discard any command it has buffered
    pub fn remove_bot(&mut self, id: EntityId) -> Option<Bot> {
        self.pending.remove(&id);
        let removed = self.bots.remove(&id);
        if removed.is_some() {
            tracing::debug!(bot = %id, "bot removed");
        }
        removed
    }

    /// Run every bot against `world` and buffer the resulting commands
    ///
    /// Returns how many commands were buffered this call.
    pub fn decide(&mut self, world: &WorldSnapshot, dt: Seconds) -> usize {
        let mut produced = 0;
        for (&id, bot) in self.bots.iter_mut() {
            if let Some(command) = self.engine.tick(bot, world, dt) {
                self.pending.insert(id, command);
                produced += 1;
            }
        }
        produced
    }

    /// Hand out buffered commands in ascending bot-id order
    pub fn drain_commands(&mut self) -> Vec<(EntityId, Command)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// `decide` followed by `drain_commands`
    pub fn run_tick(&mut self, world: &WorldSnapshot, dt: Seconds) -> Vec<(EntityId, Command)> {
        self.decide(world, dt);
        self.drain_commands()
    }

    pub fn bot(&self, id: EntityId) -> Option<&Bot> {
        self.bots.get(&id)
    }

    pub fn bots(&self) -> impl Iterator<Item = &Bot> {
        self.bots.values()
    }

    pub fn active_behavior(&self, id: EntityId) -> Option<BehaviorKind> {
        self.bots.get(&id).and_then(Bot::active_behavior)
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}
