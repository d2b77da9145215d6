//! Bot decision engine
//!
//! Architecture: arbitration over a closed behavior catalog
//! - `ArbitrationEngine` picks one active behavior per bot with hysteresis
//! - `behaviors` holds the strategies; each bot owns its own instances
//! - `DecisionContext` is the read-only view a behavior decides from
//! - `TargetSelector` and `tactics` are the shared combat primitives

pub mod arbitration;
pub mod behaviors;
pub mod bot;
pub mod command;
pub mod context;
pub mod memory;
pub mod personality;
pub mod tactics;
pub mod targeting;

pub use arbitration::{arbitrate, ArbitrationEngine, Incumbent, Selection};
pub use behaviors::{Behavior, BehaviorKind, BehaviorState};
pub use bot::{Bot, MotionSmoother};
pub use command::Command;
pub use context::{decision_rng, DecisionContext, Loadout};
pub use memory::{EntityMemory, MemoryStore};
pub use personality::{Archetype, PersonalityProfile, TraitValues};
pub use targeting::{Candidate, CandidateKind, KindFilter, TargetQuery, TargetSelector};
