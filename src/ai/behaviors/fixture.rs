//! Test scaffolding: owns everything a `DecisionContext` borrows

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::context::{DecisionContext, Loadout};
use crate::ai::memory::MemoryStore;
use crate::ai::personality::{PersonalityProfile, TraitValues};
use crate::ai::targeting::TargetSelector;
use crate::core::config::AiConfig;
use crate::core::types::{EntityId, Seconds, Vec2};
use crate::world::registry::Registry;
use crate::world::snapshot::{PlayerState, WorldSnapshot};

pub(crate) struct Fixture {
    pub world: WorldSnapshot,
    pub personality: PersonalityProfile,
    pub loadout: Loadout,
    pub memory: MemoryStore,
    pub selector: TargetSelector,
    pub me: EntityId,
    pub clock: Seconds,
    pub previous_movement: Vec2,
}

impl Fixture {
    pub fn new(me: PlayerState) -> Self {
        let config = AiConfig::default();
        let registry = Registry::with_defaults();
        let mut world = WorldSnapshot::new(0.0);
        let id = me.id;
        world.players.push(me);
        Self {
            world,
            personality: PersonalityProfile::default(),
            loadout: Loadout::resolve(&registry, &PersonalityProfile::default(), Some("rifle"), Some("frag"))
                .expect("default loadout"),
            memory: MemoryStore::new(config.entity_ttl, config.objective_ttl),
            selector: TargetSelector::new(&config),
            me: id,
            clock: 0.0,
            previous_movement: Vec2::ZERO,
        }
    }

    pub fn with_traits(mut self, traits: TraitValues) -> Self {
        self.personality = PersonalityProfile::new(traits, 350.0);
        self
    }

    pub fn add_player(&mut self, player: PlayerState) {
        self.world.players.push(player);
    }

    pub fn me_mut(&mut self) -> &mut PlayerState {
        let id = self.me;
        self.world
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .expect("fixture bot present")
    }

    /// Advance both the bot clock and snapshot time
    pub fn advance_to(&mut self, t: Seconds) {
        self.clock = t;
        self.world.time = t;
    }

    pub fn ctx(&self) -> DecisionContext<'_> {
        DecisionContext {
            me: self.world.player(self.me).expect("fixture bot present"),
            world: &self.world,
            personality: &self.personality,
            loadout: &self.loadout,
            memory: &self.memory,
            selector: &self.selector,
            clock: self.clock,
            perception_range: 900.0,
            previous_movement: self.previous_movement,
        }
    }

    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }
}
