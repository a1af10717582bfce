//! Per-tick input edges written by the host (player input, AI, replay).

use bevy::prelude::*;

/// Raw button levels for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct InputLevels {
    pub primary: bool,
    pub secondary: bool,
}

/// Edges of the two weapon actions for the current tick.
///
/// The host overwrites this every tick; the simulation only reads it.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct InputEdges {
    pub primary_pressed: bool,
    pub primary_released: bool,
    /// Level of the primary action (pressed this tick or still held).
    ///
    /// Host-facing only (hold pose, charge UI). Dispatch reacts to edges and
    /// never reads it.
    pub primary_held: bool,
    pub secondary_pressed: bool,
    pub secondary_released: bool,
}

impl InputEdges {
    /// Edge detection between two consecutive ticks.
    pub fn from_levels(previous: InputLevels, current: InputLevels) -> Self {
        Self {
            primary_pressed: current.primary && !previous.primary,
            primary_released: !current.primary && previous.primary,
            primary_held: current.primary,
            secondary_pressed: current.secondary && !previous.secondary,
            secondary_released: !current.secondary && previous.secondary,
        }
    }

    pub fn primary_press() -> Self {
        Self {
            primary_pressed: true,
            primary_held: true,
            ..Default::default()
        }
    }

    pub fn secondary_press() -> Self {
        Self {
            secondary_pressed: true,
            ..Default::default()
        }
    }

    pub fn secondary_release() -> Self {
        Self {
            secondary_released: true,
            ..Default::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}
