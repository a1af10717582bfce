//! Per-activation bookkeeping: hit ordinals, first-hit flags, stack latch.
//!
//! One `Activation` lives from `StartSwing`/`StartThrow`/`StartBlock` until the
//! anchor is destroyed. A swing hands its record to the throw it launches, so
//! "first hit of the activation" is decided exactly once, here.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Strength of a throw, fixed when the throw is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum ThrowStrength {
    Weak,
    Full,
}

impl ThrowStrength {
    /// `Full` iff the charge is complete.
    pub fn from_charge(charge: f32) -> Self {
        if charge >= 1.0 {
            ThrowStrength::Full
        } else {
            ThrowStrength::Weak
        }
    }
}

/// Which mode produced a hit. Ordinals are counted per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum HitMode {
    Melee,
    Throw,
    Block,
}

/// 1-based ordinal of a hit within its mode, plus the first-of-activation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOrdinal {
    pub ordinal: u32,
    pub is_first: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Activation {
    melee_hits: u32,
    throw_hits: u32,
    block_hits: u32,
    projectiles_blocked: u32,
    stacks_granted: bool,
}

impl Activation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a qualifying hit and returns its ordinal.
    pub fn record_hit(&mut self, mode: HitMode) -> HitOrdinal {
        let counter = match mode {
            HitMode::Melee => &mut self.melee_hits,
            HitMode::Throw => &mut self.throw_hits,
            HitMode::Block => &mut self.block_hits,
        };
        *counter = counter.saturating_add(1);
        HitOrdinal {
            ordinal: *counter,
            is_first: *counter == 1,
        }
    }

    /// Registers a blocked projectile; `true` for the first one.
    pub fn record_blocked_projectile(&mut self) -> bool {
        self.projectiles_blocked = self.projectiles_blocked.saturating_add(1);
        self.projectiles_blocked == 1
    }

    /// One-shot latch for the full-charge stack grant.
    ///
    /// Returns `true` exactly once per activation.
    pub fn claim_stack_grant(&mut self) -> bool {
        if self.stacks_granted {
            return false;
        }
        self.stacks_granted = true;
        true
    }

    pub fn hits(&self, mode: HitMode) -> u32 {
        match mode {
            HitMode::Melee => self.melee_hits,
            HitMode::Throw => self.throw_hits,
            HitMode::Block => self.block_hits,
        }
    }

    pub fn stacks_granted(&self) -> bool {
        self.stacks_granted
    }
}
