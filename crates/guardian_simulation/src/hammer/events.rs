//! Hammer events (ECS → host: VFX, sound, UI, replication)

use bevy::prelude::*;

use super::activation::HitMode;
use super::pipeline::HitRecord;

/// Resolved hammer hit on a hostile actor. Damage is applied by `apply_hammer_hits`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HammerHit {
    pub owner: Entity,
    pub target: Entity,
    pub mode: HitMode,
    pub damage: u32,
    pub knockback: f32,
    pub is_crit: bool,
}

impl HammerHit {
    pub fn from_record(owner: Entity, record: &HitRecord) -> Self {
        Self {
            owner,
            target: record.target,
            mode: record.mode,
            damage: record.resolution.damage,
            knockback: record.resolution.knockback,
            is_crit: record.resolution.is_crit,
        }
    }
}

/// Hostile projectile stopped by a blocking anchor.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileBlocked {
    pub owner: Entity,
    pub projectile: Entity,
    /// `false` if a hook vetoed destruction
    pub destroyed: bool,
}

/// Anchor caught by its owner (or orphaned) and removed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorDespawned {
    pub owner: Entity,
    pub anchor: Entity,
}
