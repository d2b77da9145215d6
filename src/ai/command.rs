//! The control command a bot produces each tick
//!
//! Structurally identical to what a human input device produces, so the
//! simulation consumes it without knowing who issued it.

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp_unit, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Movement intent, each component in [-1, 1]
    pub movement: Vec2,
    /// World-space point to aim at
    pub aim: Vec2,
    pub fire: bool,
    /// Secondary/utility slot
    pub secondary: bool,
    pub reload: bool,
    pub sprint: bool,
}

impl Command {
    /// Stand still, aim at `aim`, press nothing
    pub fn neutral(aim: Vec2) -> Self {
        Self {
            movement: Vec2::ZERO,
            aim,
            fire: false,
            secondary: false,
            reload: false,
            sprint: false,
        }
    }

    /// Move along `movement` (clamped) and aim at `aim`
    pub fn moving(movement: Vec2, aim: Vec2) -> Self {
        Self {
            movement: clamp_unit(movement),
            ..Self::neutral(aim)
        }
    }

    pub fn with_fire(mut self, fire: bool) -> Self {
        self.fire = fire;
        self
    }

    pub fn with_reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    pub fn with_secondary(mut self, secondary: bool) -> Self {
        self.secondary = secondary;
        self
    }

    pub fn with_sprint(mut self, sprint: bool) -> Self {
        self.sprint = sprint;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.movement.is_finite() && self.aim.is_finite()
    }

    /// Enforce the output contract: movement in range and the empty-magazine rule
    pub fn sanitized(mut self, ammo: u32) -> Self {
        self.movement = clamp_unit(self.movement);
        if ammo == 0 {
            self.reload = true;
            self.fire = false;
        }
        if self.reload {
            self.fire = false;
        }
        self
    }
}
