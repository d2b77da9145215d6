//! World-facing interfaces consumed by the decision engine
//!
//! - `snapshot`: per-tick read-only state (players, turrets, objectives)
//! - `registry`: static weapon/utility tables and personality presets

pub mod registry;
pub mod snapshot;

pub use registry::{load_personality, Registry, UtilityKind, UtilityStats, WeaponClass, WeaponStats};
pub use snapshot::{
    BaseState, CarriedItemState, FlagState, LootKind, LootStationState, PlayerState, TurretState,
    WorldSnapshot, ZoneKind, ZoneState,
};
