//! Extension hooks for hammer variants.
//!
//! A variant is a `WeaponDefinition` plus one `HammerHooks` implementation.
//! Every method has a neutral default, variants override only what they need.

use bevy::prelude::*;

use super::activation::ThrowStrength;
use super::anchor::AnchorInstance;
use super::ledger::ResourceLedger;
use super::pipeline::HitResolution;
use super::presentation::{DrawSnapshot, GlowColor};
use crate::world::TileHit;

/// What a hook may touch besides its own arguments: the owner and its ledger.
pub struct HookCtx<'a> {
    pub owner: Entity,
    pub ledger: &'a mut dyn ResourceLedger,
}

impl<'a> HookCtx<'a> {
    pub fn new(owner: Entity, ledger: &'a mut dyn ResourceLedger) -> Self {
        Self { owner, ledger }
    }
}

#[allow(unused_variables)]
pub trait HammerHooks {
    // Phase entry

    /// `fully_charged`: the charge was full when the swing started.
    fn on_swing(&self, ctx: &mut HookCtx, fully_charged: bool) {}

    fn on_throw(&self, ctx: &mut HookCtx, anchor: &mut AnchorInstance, strength: ThrowStrength) {}

    fn on_block_throw(&self, ctx: &mut HookCtx, anchor: &mut AnchorInstance) {}

    // Contacts

    fn on_melee_hit(
        &self,
        ctx: &mut HookCtx,
        target: Entity,
        hit: &HitResolution,
        fully_charged: bool,
    ) {
    }

    fn on_melee_hit_first(
        &self,
        ctx: &mut HookCtx,
        target: Entity,
        hit: &HitResolution,
        fully_charged: bool,
    ) {
    }

    fn on_throw_hit(
        &self,
        ctx: &mut HookCtx,
        target: Entity,
        hit: &HitResolution,
        strength: ThrowStrength,
    ) {
    }

    fn on_throw_hit_first(
        &self,
        ctx: &mut HookCtx,
        target: Entity,
        hit: &HitResolution,
        strength: ThrowStrength,
    ) {
    }

    fn on_block_hit(&self, ctx: &mut HookCtx, target: Entity, hit: &HitResolution) {}

    fn on_block_hit_first(&self, ctx: &mut HookCtx, target: Entity, hit: &HitResolution) {}

    /// Every cooldown-gated contact between a blocking anchor and an actor.
    fn on_block_contact(&self, ctx: &mut HookCtx, target: Entity) {}

    /// Once per actor per block phase.
    fn on_block_npc(&self, ctx: &mut HookCtx, target: Entity) {}

    /// First actor blocked in the activation.
    fn on_block_first_npc(&self, ctx: &mut HookCtx, target: Entity) {}

    /// Returns whether the blocked projectile is destroyed.
    fn on_block_projectile(&self, ctx: &mut HookCtx, projectile: Entity) -> bool {
        true
    }

    fn on_block_first_projectile(&self, ctx: &mut HookCtx, projectile: Entity) {}

    /// `velocity` is the anchor velocity before the collision was applied.
    fn on_throw_tile_collide(&self, ctx: &mut HookCtx, velocity: Vec2, contact: &TileHit) {}

    // Per-tick AI

    /// Runs before the default outgoing motion; `false` skips it this tick.
    fn throw_ai(
        &self,
        ctx: &mut HookCtx,
        anchor: &mut AnchorInstance,
        strength: ThrowStrength,
    ) -> bool {
        true
    }

    /// Once per tick for every live anchor, after the default update.
    fn extra_ai(&self, ctx: &mut HookCtx, anchor: &mut AnchorInstance) {}

    // Presentation

    /// `false` suppresses the default draw.
    fn pre_draw_hammer(&self, snapshot: &DrawSnapshot) -> bool {
        true
    }

    fn post_draw_hammer(&self, snapshot: &DrawSnapshot) {}

    fn glow_color(&self, snapshot: &DrawSnapshot) -> GlowColor {
        GlowColor::WHITE
    }
}

/// Plain hammer: every hook neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl HammerHooks for NoHooks {}
