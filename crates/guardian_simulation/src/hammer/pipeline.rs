//! Hit pipeline: phase/ordinal dependent damage and knockback.
//!
//! Формула:
//! - Swing: `swing_damage_multiplier`, ×1.5 если заряд на старте свинга < 1
//! - Throw: `throw_damage_multiplier × max(0, 1 − 0.25 × (n − 1))`, без decay при `penetrate`
//! - Block: `block_damage_multiplier`, без decay, без knockback
//! - Crit: ×2, итог округляется до целого

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::activation::HitMode;
use super::definition::WeaponDefinition;
use super::ledger::{ResourceKind, ResourceLedger};

/// Weak swings hit harder to compensate for the missing throw payoff.
pub const WEAK_SWING_BONUS: f32 = 1.5;

/// Damage lost per throw hit beyond the first.
pub const THROW_DECAY_PER_HIT: f32 = 0.25;

pub const CRIT_MULTIPLIER: f32 = 2.0;

/// Phase a hit was resolved in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitPhase {
    Swing { charge_at_start: f32 },
    Throw,
    Block,
}

/// Final outcome of one contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResolution {
    pub damage: u32,
    pub knockback: f32,
    pub is_crit: bool,
    pub is_first: bool,
}

/// A resolved hit on a target, ready to be applied to its health.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub target: Entity,
    pub mode: HitMode,
    pub resolution: HitResolution,
}

/// Throw decay factor for a 1-based hit ordinal (floored at 0).
pub fn throw_decay(ordinal: u32) -> f32 {
    let beyond_first = ordinal.saturating_sub(1) as f32;
    (1.0 - THROW_DECAY_PER_HIT * beyond_first).max(0.0)
}

/// Damage multiplier before crits.
pub fn damage_multiplier(definition: &WeaponDefinition, phase: HitPhase, ordinal: u32) -> f32 {
    match phase {
        HitPhase::Swing { charge_at_start } => {
            let base = definition.swing_damage_multiplier();
            if charge_at_start < 1.0 {
                base * WEAK_SWING_BONUS
            } else {
                base
            }
        }
        HitPhase::Throw => {
            let base = definition.throw_damage_multiplier();
            if definition.penetrate() {
                base
            } else {
                base * throw_decay(ordinal)
            }
        }
        HitPhase::Block => definition.block_damage_multiplier(),
    }
}

pub fn resolve_hit(
    definition: &WeaponDefinition,
    phase: HitPhase,
    ordinal: u32,
    is_first: bool,
    base_damage: u32,
    is_crit: bool,
) -> HitResolution {
    let mut damage = base_damage as f32 * damage_multiplier(definition, phase, ordinal);
    if is_crit {
        damage *= CRIT_MULTIPLIER;
    }

    let knockback = match phase {
        HitPhase::Block => 0.0,
        HitPhase::Swing { .. } | HitPhase::Throw => definition.knockback(),
    };

    HitResolution {
        damage: damage.round().max(0.0) as u32,
        knockback,
        is_crit,
        is_first,
    }
}

/// Grants the definition's slam/guard stacks to the ledger.
///
/// Caller is responsible for the once-per-activation latch.
pub fn grant_charged_stacks(definition: &WeaponDefinition, ledger: &mut dyn ResourceLedger) {
    if definition.slam_stacks() > 0 {
        ledger.grant_resource(ResourceKind::Slam, definition.slam_stacks());
    }
    if definition.guard_stacks() > 0 {
        ledger.grant_resource(ResourceKind::Guard, definition.guard_stacks());
    }
}

/// Source of crit rolls. Seeded RNG in the simulation, fixed in tests.
pub trait CritSource {
    fn roll_crit(&mut self, chance: f32) -> bool;
}

impl CritSource for ChaCha8Rng {
    fn roll_crit(&mut self, chance: f32) -> bool {
        if chance <= 0.0 {
            return false;
        }
        self.gen::<f32>() < chance
    }
}

/// Crit source with a fixed answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCrit(pub bool);

impl CritSource for FixedCrit {
    fn roll_crit(&mut self, _chance: f32) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn thrower() -> WeaponDefinition {
        WeaponDefinition::builder()
            .throw_damage_multiplier(1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_throw_decay_sequence() {
        let definition = thrower();
        let damage: Vec<u32> = (1..=6)
            .map(|n| resolve_hit(&definition, HitPhase::Throw, n, n == 1, 100, false).damage)
            .collect();

        assert_eq!(damage, vec![100, 75, 50, 25, 0, 0]);
    }

    #[test]
    fn test_throw_damage_non_increasing() {
        let definition = WeaponDefinition::builder()
            .throw_damage_multiplier(1.7)
            .build()
            .unwrap();

        for base in [1, 10, 37, 100, 999] {
            let mut previous = u32::MAX;
            for ordinal in 1..=12 {
                let hit = resolve_hit(&definition, HitPhase::Throw, ordinal, ordinal == 1, base, false);
                assert!(hit.damage <= previous, "base {base}, ordinal {ordinal}");
                previous = hit.damage;
            }
            assert_eq!(
                resolve_hit(&definition, HitPhase::Throw, 5, false, base, false).damage,
                0
            );
        }
    }

    #[test]
    fn test_penetrating_throw_has_no_decay() {
        let definition = WeaponDefinition::builder().penetrate(true).build().unwrap();
        for ordinal in 1..=8 {
            assert_eq!(
                resolve_hit(&definition, HitPhase::Throw, ordinal, ordinal == 1, 100, false).damage,
                100
            );
        }
    }

    #[test]
    fn test_swing_bonus_when_not_charged() {
        let definition = WeaponDefinition::default(); // swing 0.5

        let weak = resolve_hit(&definition, HitPhase::Swing { charge_at_start: 0.4 }, 1, true, 100, false);
        assert_eq!(weak.damage, 75);

        let charged = resolve_hit(&definition, HitPhase::Swing { charge_at_start: 1.0 }, 1, true, 100, false);
        assert_eq!(charged.damage, 50);
        assert_eq!(charged.knockback, definition.knockback());
    }

    #[test]
    fn test_block_damage_without_knockback() {
        let definition = WeaponDefinition::default(); // block 0.33

        for ordinal in 1..=4 {
            let hit = resolve_hit(&definition, HitPhase::Block, ordinal, ordinal == 1, 100, false);
            assert_eq!(hit.damage, 33);
            assert_eq!(hit.knockback, 0.0);
        }
    }

    #[test]
    fn test_crit_doubles_damage() {
        let definition = thrower();
        let hit = resolve_hit(&definition, HitPhase::Throw, 2, false, 10, true);
        // 10 × 0.75 × 2
        assert_eq!(hit.damage, 15);
        assert!(hit.is_crit);
    }

    #[test]
    fn test_charged_stacks() {
        use crate::hammer::ledger::GuardianLedger;

        let definition = WeaponDefinition::builder()
            .slam_stacks(1)
            .guard_stacks(2)
            .build()
            .unwrap();
        let mut ledger = GuardianLedger::new(5, 5).with_guard(0);

        grant_charged_stacks(&definition, &mut ledger);
        assert_eq!(ledger.slam, 1);
        assert_eq!(ledger.guard, 2);
    }

    #[test]
    fn test_crit_sources() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(!rng.roll_crit(0.0));
        assert!(rng.roll_crit(1.0));

        assert!(FixedCrit(true).roll_crit(0.0));
        assert!(!FixedCrit(false).roll_crit(1.0));
    }
}
