//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Identifier of any simulated entity (player, turret, objective, ...)
///
/// Ids are assigned by the authoritative simulation; this crate never mints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team number. `FREE_FOR_ALL` (0) means every other participant is hostile.
pub type Team = u8;

pub const FREE_FOR_ALL: Team = 0;

/// Simulation time in seconds
pub type Seconds = f32;

/// True when `other` is an ally of `team` (never in free-for-all)
pub fn same_team(team: Team, other: Team) -> bool {
    team != FREE_FOR_ALL && team == other
}

/// Axis-aligned playable area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min: Vec2::new(-2000.0, -2000.0),
            max: Vec2::new(2000.0, 2000.0),
        }
    }
}

/// Unit vector pointing from `from` to `to`, or zero when they coincide
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Perpendicular (counter-clockwise) of a vector
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Clamp each component to [-1, 1] after limiting length to 1
pub fn clamp_unit(v: Vec2) -> Vec2 {
    v.clamp_length_max(1.0).clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_team_free_for_all() {
        assert!(!same_team(FREE_FOR_ALL, FREE_FOR_ALL));
        assert!(same_team(2, 2));
        assert!(!same_team(1, 2));
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = WorldBounds::new(Vec2::ZERO, Vec2::new(100.0, 50.0));
        assert_eq!(bounds.clamp(Vec2::new(150.0, -10.0)), Vec2::new(100.0, 0.0));
        assert!(bounds.contains(Vec2::new(10.0, 10.0)));
        assert_eq!(bounds.center(), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn test_direction_degenerate() {
        assert_eq!(direction(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
        let d = direction(Vec2::ZERO, Vec2::new(0.0, 5.0));
        assert!((d - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_clamp_unit() {
        let v = clamp_unit(Vec2::new(3.0, 4.0));
        assert!((v.length() - 1.0).abs() < 1e-5);
        assert!(v.x <= 1.0 && v.y <= 1.0);
    }
}
