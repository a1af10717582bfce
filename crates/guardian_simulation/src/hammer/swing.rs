//! Melee swing: synchronous sweep on the start tick, throw on the last tick.
//!
//! The swing has no anchor. While it runs the actor is busy (the dispatcher is
//! not polled); when it finishes the same activation continues as a throw.

use std::collections::BTreeSet;

use bevy::prelude::*;

use super::activation::{Activation, HitMode, HitOrdinal, ThrowStrength};
use super::definition::WeaponDefinition;
use super::hooks::{HammerHooks, HookCtx};
use super::ledger::ResourceLedger;
use super::pipeline::{resolve_hit, CritSource, HitPhase, HitRecord};
use crate::config::HammerConfig;
use crate::world::{OverlapQuery, Region, TargetKind};

/// Swing in progress (component on the actor).
#[derive(Component, Debug, Clone)]
pub struct SwingInProgress {
    pub ticks_remaining: u32,
    pub charge_at_start: f32,
    pub activation: Activation,
}

impl SwingInProgress {
    pub fn new(
        definition: &WeaponDefinition,
        config: &HammerConfig,
        charge_at_start: f32,
        activation: Activation,
    ) -> Self {
        Self {
            ticks_remaining: definition.swing_ticks(config),
            charge_at_start,
            activation,
        }
    }

    /// Counts one tick down. Returns `true` on the final tick.
    pub fn advance(&mut self) -> bool {
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        self.ticks_remaining == 0
    }

    /// Strength of the throw that ends this swing.
    pub fn throw_strength(&self) -> ThrowStrength {
        ThrowStrength::from_charge(self.charge_at_start)
    }
}

/// Sweep region: circle in front of the owner, diameter `swing_reach`.
pub fn sweep_region(owner_position: Vec2, aim: Vec2, config: &HammerConfig) -> Region {
    let direction = aim.try_normalize().unwrap_or(Vec2::X);
    let half = config.swing_reach * 0.5;
    Region::circle(owner_position + direction * half, half)
}

/// Collaborators of one sweep.
pub struct SweepEnv<'a> {
    pub definition: &'a WeaponDefinition,
    pub config: &'a HammerConfig,
    pub hooks: &'a dyn HammerHooks,
    pub ledger: &'a mut dyn ResourceLedger,
    pub overlaps: &'a dyn OverlapQuery,
    pub crits: &'a mut dyn CritSource,
}

/// Fires `on_swing`, then hits every hostile actor in front of the owner once.
///
/// Каждое попадание добавляет заряд: `swing_charge_per_hit × swing_charge_gain`.
pub fn perform_sweep(
    owner: Entity,
    owner_position: Vec2,
    aim: Vec2,
    swing: &mut SwingInProgress,
    env: &mut SweepEnv,
) -> Vec<HitRecord> {
    let fully_charged = swing.throw_strength() == ThrowStrength::Full;
    let mut ctx = HookCtx::new(owner, &mut *env.ledger);
    env.hooks.on_swing(&mut ctx, fully_charged);

    let region = sweep_region(owner_position, aim, env.config);
    let charge_per_hit = env.config.swing_charge_per_hit * env.definition.swing_charge_gain();

    let mut seen = BTreeSet::new();
    let mut hits = Vec::new();

    for overlap in env.overlaps.overlapping(region) {
        if overlap.kind != TargetKind::Actor || !seen.insert(overlap.target) {
            continue;
        }

        let HitOrdinal { ordinal, is_first } = swing.activation.record_hit(HitMode::Melee);
        let is_crit = env.crits.roll_crit(env.definition.crit_chance());
        let hit = resolve_hit(
            env.definition,
            HitPhase::Swing {
                charge_at_start: swing.charge_at_start,
            },
            ordinal,
            is_first,
            env.definition.base_damage(),
            is_crit,
        );

        ctx.ledger.gain_charge(charge_per_hit);
        env.hooks.on_melee_hit(&mut ctx, overlap.target, &hit, fully_charged);
        if is_first {
            env.hooks.on_melee_hit_first(&mut ctx, overlap.target, &hit, fully_charged);
        }

        hits.push(HitRecord {
            target: overlap.target,
            mode: HitMode::Melee,
            resolution: hit,
        });
    }

    hits
}
