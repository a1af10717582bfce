//! Anchor state machine: the detached hammer after a throw or block.
//!
//! Lifecycle:
//! ```text
//! throw:  Outgoing ──(hit | tile | range)──▶ Returning ──(caught)──▶ despawn
//! block:  AnchoredBlocking ──(elapsed | recall)──▶ Returning ──▶ despawn
//! ```
//! Every phase change goes through [`transition`], so all
//! (`penetrate`, `tile_collide`, `tile_bounce`) combinations are enumerable.
//!
//! Recall takes effect at the start of the next update (the anchor moves on
//! that same update); natural expiry happens at the end of the last blocking
//! update.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::activation::{Activation, HitMode, HitOrdinal, ThrowStrength};
use super::definition::WeaponDefinition;
use super::hooks::{HammerHooks, HookCtx};
use super::ledger::ResourceLedger;
use super::pipeline::{grant_charged_stacks, resolve_hit, CritSource, HitPhase, HitRecord};
use crate::config::HammerConfig;
use crate::logger;
use crate::world::{OverlapQuery, Region, TargetKind, TileQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum AnchorPhase {
    Outgoing,
    AnchoredBlocking,
    Returning,
}

/// What the anchor was launched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AnchorMode {
    Throw(ThrowStrength),
    Block,
}

/// Inputs of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEvent {
    TargetHit,
    TileContact,
    RangeElapsed,
    BlockElapsed,
    Recalled,
    ReachedOwner,
}

/// Definition flags that change how events are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionFlags {
    pub penetrate: bool,
    pub tile_collide: bool,
    pub tile_bounce: bool,
}

impl CollisionFlags {
    pub fn of(definition: &WeaponDefinition) -> Self {
        Self {
            penetrate: definition.penetrate(),
            tile_collide: definition.tile_collide(),
            tile_bounce: definition.tile_bounce(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Event ignored
    Stay,
    /// Reflect velocity off the tile normal, phase unchanged
    Bounce,
    Enter(AnchorPhase),
    Despawn,
}

/// The phase transition table.
pub fn transition(phase: AnchorPhase, event: AnchorEvent, flags: CollisionFlags) -> Transition {
    use AnchorEvent::*;
    use AnchorPhase::*;

    match (phase, event) {
        (Outgoing, TargetHit) if flags.penetrate => Transition::Stay,
        (Outgoing, TargetHit) => Transition::Enter(Returning),
        (Outgoing, TileContact) if !flags.tile_collide => Transition::Stay,
        (Outgoing, TileContact) if flags.tile_bounce => Transition::Bounce,
        (Outgoing, TileContact) => Transition::Enter(Returning),
        (Outgoing, RangeElapsed) => Transition::Enter(Returning),
        (AnchoredBlocking, BlockElapsed | Recalled) => Transition::Enter(Returning),
        (Returning, ReachedOwner) => Transition::Despawn,
        _ => Transition::Stay,
    }
}

/// Mirror `velocity` off a surface with unit `normal` (speed preserved).
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Where and by whom an anchor is launched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub owner: Entity,
    pub origin: Vec2,
    pub aim: Vec2,
}

impl Launch {
    fn direction(&self) -> Vec2 {
        self.aim.try_normalize().unwrap_or(Vec2::X)
    }
}

/// Replicated view of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSnapshot {
    pub phase: AnchorPhase,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub current_block_duration: i32,
    pub ticks_in_phase: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedProjectile {
    pub projectile: Entity,
    pub destroyed: bool,
}

/// Everything one update produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub hits: Vec<HitRecord>,
    pub blocked: Vec<BlockedProjectile>,
    pub despawned: bool,
}

/// Collaborators of one anchor update.
pub struct TickEnv<'a> {
    pub definition: &'a WeaponDefinition,
    pub config: &'a HammerConfig,
    pub hooks: &'a dyn HammerHooks,
    pub ledger: &'a mut dyn ResourceLedger,
    /// `None` when the owner is gone
    pub owner_position: Option<Vec2>,
    pub overlaps: &'a dyn OverlapQuery,
    pub tiles: &'a dyn TileQuery,
    pub crits: &'a mut dyn CritSource,
}

/// Live detached hammer.
#[derive(Component, Debug, Clone)]
pub struct AnchorInstance {
    phase: AnchorPhase,
    pub ticks_in_phase: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    owner: Entity,
    hit_targets: BTreeSet<Entity>,
    /// Recall forces this negative
    pub current_block_duration: i32,
    /// Write-only for the simulation; cleared by the replication layer
    pub needs_replication: bool,
    mode: AnchorMode,
    flags: CollisionFlags,
    range: u32,
    /// target → ticks until it may be contacted again
    contact_cooldowns: BTreeMap<Entity, u32>,
    recalled: bool,
    activation: Activation,
}

impl AnchorInstance {
    fn new(
        launch: Launch,
        phase: AnchorPhase,
        position: Vec2,
        velocity: Vec2,
        mode: AnchorMode,
        range: u32,
        current_block_duration: i32,
        activation: Activation,
        definition: &WeaponDefinition,
    ) -> Self {
        Self {
            phase,
            ticks_in_phase: 0,
            position,
            velocity,
            owner: launch.owner,
            hit_targets: BTreeSet::new(),
            current_block_duration,
            needs_replication: true,
            mode,
            flags: CollisionFlags::of(definition),
            range,
            contact_cooldowns: BTreeMap::new(),
            recalled: false,
            activation,
        }
    }

    /// Outgoing anchor flying along the aim at `shoot_speed`.
    ///
    /// Weak throws only fly `range × weak_throw_range_factor` ticks.
    pub fn thrown(
        launch: Launch,
        strength: ThrowStrength,
        activation: Activation,
        definition: &WeaponDefinition,
        config: &HammerConfig,
    ) -> Self {
        let range = match strength {
            ThrowStrength::Full => definition.range(),
            ThrowStrength::Weak => {
                (definition.range() as f32 * config.weak_throw_range_factor).round() as u32
            }
        };

        Self::new(
            launch,
            AnchorPhase::Outgoing,
            launch.origin,
            launch.direction() * definition.shoot_speed(),
            AnchorMode::Throw(strength),
            range,
            0,
            activation,
            definition,
        )
    }

    /// Blocking anchor deployed in front of the owner, held still.
    pub fn blocking(
        launch: Launch,
        activation: Activation,
        definition: &WeaponDefinition,
        config: &HammerConfig,
    ) -> Self {
        let offset =
            launch.direction() * definition.block_launch_speed() * config.block_deploy_ticks as f32;
        let duration = i32::try_from(definition.block_duration()).unwrap_or(i32::MAX);

        Self::new(
            launch,
            AnchorPhase::AnchoredBlocking,
            launch.origin + offset,
            Vec2::ZERO,
            AnchorMode::Block,
            0,
            duration,
            activation,
            definition,
        )
    }

    pub fn phase(&self) -> AnchorPhase {
        self.phase
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn mode(&self) -> AnchorMode {
        self.mode
    }

    /// Effective outgoing range in ticks.
    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn is_recalled(&self) -> bool {
        self.recalled
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    pub fn hit_targets(&self) -> &BTreeSet<Entity> {
        &self.hit_targets
    }

    /// Remaining contact cooldown for `target`, if any.
    pub fn contact_cooldown(&self, target: Entity) -> Option<u32> {
        self.contact_cooldowns.get(&target).copied()
    }

    pub fn snapshot(&self) -> AnchorSnapshot {
        AnchorSnapshot {
            phase: self.phase,
            position: self.position.to_array(),
            velocity: self.velocity.to_array(),
            current_block_duration: self.current_block_duration,
            ticks_in_phase: self.ticks_in_phase,
        }
    }

    /// Forces a blocking anchor to return early.
    ///
    /// Only a blocking anchor with time left can be recalled. Returns whether
    /// the recall happened.
    pub fn recall(&mut self, recall_block_duration: i32) -> bool {
        if self.phase != AnchorPhase::AnchoredBlocking || self.current_block_duration <= 0 {
            return false;
        }
        self.current_block_duration = recall_block_duration.min(0);
        self.recalled = true;
        self.needs_replication = true;
        true
    }

    /// Advances the anchor by one simulation tick.
    pub fn tick(&mut self, env: &mut TickEnv) -> TickReport {
        let mut report = TickReport::default();

        let Some(owner_position) = env.owner_position else {
            // Хозяина нет: ловить некому
            report.despawned = true;
            return report;
        };

        self.contact_cooldowns.retain(|_, remaining| {
            *remaining -= 1;
            *remaining > 0
        });

        if self.phase == AnchorPhase::AnchoredBlocking && self.current_block_duration <= 0 {
            let event = if self.recalled {
                AnchorEvent::Recalled
            } else {
                AnchorEvent::BlockElapsed
            };
            self.apply(event);
        }

        self.ticks_in_phase = self.ticks_in_phase.saturating_add(1);

        match self.phase {
            AnchorPhase::Outgoing => self.tick_outgoing(env, &mut report),
            AnchorPhase::AnchoredBlocking => self.tick_blocking(env, &mut report),
            AnchorPhase::Returning => self.tick_returning(env, owner_position, &mut report),
        }

        if !report.despawned {
            let mut ctx = HookCtx::new(self.owner, &mut *env.ledger);
            env.hooks.extra_ai(&mut ctx, self);
        }

        report
    }

    fn apply(&mut self, event: AnchorEvent) -> Transition {
        let outcome = transition(self.phase, event, self.flags);
        if let Transition::Enter(next) = outcome {
            self.enter(next, event);
        }
        outcome
    }

    fn enter(&mut self, next: AnchorPhase, cause: AnchorEvent) {
        logger::log(&format!(
            "Anchor of {:?}: {:?} → {:?} ({:?}, {} ticks in phase)",
            self.owner, self.phase, next, cause, self.ticks_in_phase
        ));

        self.phase = next;
        self.ticks_in_phase = 0;
        if !self.flags.penetrate {
            self.hit_targets.clear();
        }
        self.needs_replication = true;
    }

    fn tick_outgoing(&mut self, env: &mut TickEnv, report: &mut TickReport) {
        let run_default = match self.mode {
            AnchorMode::Throw(strength) => {
                let mut ctx = HookCtx::new(self.owner, &mut *env.ledger);
                env.hooks.throw_ai(&mut ctx, self, strength)
            }
            AnchorMode::Block => true,
        };
        if run_default {
            self.move_outgoing(env);
        }

        let hit_any = self.resolve_throw_contacts(env, report);

        if self.phase == AnchorPhase::Outgoing && hit_any {
            self.apply(AnchorEvent::TargetHit);
        }
        if self.phase == AnchorPhase::Outgoing && self.ticks_in_phase >= self.range {
            self.apply(AnchorEvent::RangeElapsed);
        }
    }

    fn move_outgoing(&mut self, env: &mut TickEnv) {
        let from = self.position;
        let to = from + self.velocity;

        let Some(contact) = env.tiles.cast(from, to) else {
            self.position = to;
            return;
        };

        let outcome = transition(self.phase, AnchorEvent::TileContact, self.flags);
        if outcome == Transition::Stay {
            self.position = to;
            return;
        }

        let before = self.velocity;
        env.hooks.on_throw_tile_collide(
            &mut HookCtx::new(self.owner, &mut *env.ledger),
            before,
            &contact,
        );

        self.position = contact.point;
        match outcome {
            Transition::Bounce => {
                self.velocity = reflect(before, contact.normal);
                self.needs_replication = true;
            }
            Transition::Enter(next) => self.enter(next, AnchorEvent::TileContact),
            Transition::Stay | Transition::Despawn => {}
        }
    }

    /// Throw damage against actors under the anchor. Returns whether anything was hit.
    fn resolve_throw_contacts(&mut self, env: &mut TickEnv, report: &mut TickReport) -> bool {
        let AnchorMode::Throw(strength) = self.mode else {
            return false;
        };

        let region = Region::circle(self.position, env.config.anchor_radius);
        let mut hit_any = false;

        for overlap in env.overlaps.overlapping(region) {
            if overlap.kind != TargetKind::Actor
                || self.contact_cooldowns.contains_key(&overlap.target)
                || !self.hit_targets.insert(overlap.target)
            {
                continue;
            }
            self.start_contact_cooldown(overlap.target, env.definition);
            hit_any = true;

            let HitOrdinal { ordinal, is_first } = self.activation.record_hit(HitMode::Throw);
            let is_crit = env.crits.roll_crit(env.definition.crit_chance());
            let hit = resolve_hit(
                env.definition,
                HitPhase::Throw,
                ordinal,
                is_first,
                env.definition.base_damage(),
                is_crit,
            );

            let mut ctx = HookCtx::new(self.owner, &mut *env.ledger);
            if strength == ThrowStrength::Full && self.activation.claim_stack_grant() {
                grant_charged_stacks(env.definition, ctx.ledger);
            }
            env.hooks.on_throw_hit(&mut ctx, overlap.target, &hit, strength);
            if is_first {
                env.hooks.on_throw_hit_first(&mut ctx, overlap.target, &hit, strength);
            }

            report.hits.push(HitRecord {
                target: overlap.target,
                mode: HitMode::Throw,
                resolution: hit,
            });
        }

        if hit_any {
            self.needs_replication = true;
        }
        hit_any
    }

    fn tick_blocking(&mut self, env: &mut TickEnv, report: &mut TickReport) {
        self.velocity = Vec2::ZERO;

        let region = Region::circle(self.position, env.config.block_radius);
        for overlap in env.overlaps.overlapping(region) {
            if self.contact_cooldowns.contains_key(&overlap.target) {
                continue;
            }
            self.start_contact_cooldown(overlap.target, env.definition);

            let mut ctx = HookCtx::new(self.owner, &mut *env.ledger);
            match overlap.kind {
                TargetKind::Projectile => {
                    let is_first = self.activation.record_blocked_projectile();
                    let destroyed = env.hooks.on_block_projectile(&mut ctx, overlap.target);
                    if is_first {
                        env.hooks.on_block_first_projectile(&mut ctx, overlap.target);
                    }
                    report.blocked.push(BlockedProjectile {
                        projectile: overlap.target,
                        destroyed,
                    });
                }
                TargetKind::Actor => {
                    env.hooks.on_block_contact(&mut ctx, overlap.target);

                    // Урон от блока: один раз на цель за фазу
                    if !self.hit_targets.insert(overlap.target) {
                        continue;
                    }

                    let HitOrdinal { ordinal, is_first } = self.activation.record_hit(HitMode::Block);
                    let is_crit = env.crits.roll_crit(env.definition.crit_chance());
                    let hit = resolve_hit(
                        env.definition,
                        HitPhase::Block,
                        ordinal,
                        is_first,
                        env.definition.base_damage(),
                        is_crit,
                    );

                    env.hooks.on_block_npc(&mut ctx, overlap.target);
                    if is_first {
                        env.hooks.on_block_first_npc(&mut ctx, overlap.target);
                    }
                    env.hooks.on_block_hit(&mut ctx, overlap.target, &hit);
                    if is_first {
                        env.hooks.on_block_hit_first(&mut ctx, overlap.target, &hit);
                    }

                    report.hits.push(HitRecord {
                        target: overlap.target,
                        mode: HitMode::Block,
                        resolution: hit,
                    });
                }
            }
        }

        self.current_block_duration = self.current_block_duration.saturating_sub(1);
        if self.current_block_duration <= 0 {
            self.apply(AnchorEvent::BlockElapsed);
        }
    }

    fn tick_returning(&mut self, env: &mut TickEnv, owner_position: Vec2, report: &mut TickReport) {
        let mut speed = env.config.return_speed * env.definition.return_speed_multiplier();
        if self.recalled {
            speed *= env.config.recall_speed_factor;
        }

        let to_owner = owner_position - self.position;
        let distance = to_owner.length();

        if distance <= env.config.catch_radius.max(speed) {
            self.position = owner_position;
            self.velocity = Vec2::ZERO;
            if self.apply(AnchorEvent::ReachedOwner) == Transition::Despawn {
                logger::log(&format!("Anchor of {:?} caught", self.owner));
                report.despawned = true;
            }
            return;
        }

        // Pure pursuit: направление пересчитывается каждый тик
        self.velocity = to_owner / distance * speed;
        self.position += self.velocity;

        self.resolve_throw_contacts(env, report);
    }

    fn start_contact_cooldown(&mut self, target: Entity, definition: &WeaponDefinition) {
        let cooldown = definition.hit_cooldown_ticks();
        if cooldown > 0 {
            self.contact_cooldowns.insert(target, cooldown);
        }
    }
}

/// Launches a throw and fires `on_throw`.
pub fn launch_throw(
    launch: Launch,
    strength: ThrowStrength,
    activation: Activation,
    definition: &WeaponDefinition,
    config: &HammerConfig,
    hooks: &dyn HammerHooks,
    ledger: &mut dyn ResourceLedger,
) -> AnchorInstance {
    let mut anchor = AnchorInstance::thrown(launch, strength, activation, definition, config);
    hooks.on_throw(&mut HookCtx::new(launch.owner, ledger), &mut anchor, strength);

    logger::log(&format!(
        "{:?} throws ({:?}, range {} ticks)",
        launch.owner,
        strength,
        anchor.range()
    ));
    anchor
}

/// Deploys a block and fires `on_block_throw`.
pub fn deploy_block(
    launch: Launch,
    activation: Activation,
    definition: &WeaponDefinition,
    config: &HammerConfig,
    hooks: &dyn HammerHooks,
    ledger: &mut dyn ResourceLedger,
) -> AnchorInstance {
    let mut anchor = AnchorInstance::blocking(launch, activation, definition, config);
    hooks.on_block_throw(&mut HookCtx::new(launch.owner, ledger), &mut anchor);

    logger::log(&format!(
        "{:?} blocks ({} ticks)",
        launch.owner, anchor.current_block_duration
    ));
    anchor
}
