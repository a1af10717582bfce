//! Guardian Hammer: weapon ability state machine.
//!
//! Ядро (чистые типы, без ECS):
//! - dispatcher: input + ledger → Action
//! - anchor: state machine отделённого молота (Outgoing / AnchoredBlocking / Returning)
//! - pipeline: damage multipliers, crit, stacks
//! - hooks: extension points варианта
//! - ledger: charge + пулы ресурсов
//! - definition: статы варианта
//!
//! ECS слой (`systems`) гоняет ядро в FixedUpdate.

use bevy::prelude::*;

pub mod activation;
pub mod anchor;
pub mod definition;
pub mod dispatcher;
pub mod events;
pub mod hooks;
pub mod ledger;
pub mod pipeline;
pub mod presentation;
pub mod registry;
pub mod swing;
pub mod systems;


// Re-export основных типов
pub use activation::{Activation, HitMode, ThrowStrength};
pub use anchor::{AnchorInstance, AnchorMode, AnchorPhase, AnchorSnapshot, Launch};
pub use definition::{DefinitionError, StatSheet, WeaponDefinition};
pub use dispatcher::{Action, BLOCK_GUARD_COST};
pub use events::{AnchorDespawned, HammerHit, ProjectileBlocked};
pub use hooks::{HammerHooks, HookCtx, NoHooks};
pub use ledger::{GuardianLedger, ResourceKind, ResourceLedger};
pub use pipeline::{CritSource, HitResolution};
pub use presentation::{GlowColor, HammerRenderer};
pub use registry::{HammerId, HammerRegistry, RegistryError};
pub use swing::SwingInProgress;
pub use systems::ReplicationOutbox;

use crate::config::HammerConfig;
use crate::world::TileWorld;

/// Hammer Plugin
///
/// Регистрирует hammer системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. dispatch_actions: input → swing / throw / block / recall
/// 2. advance_swings: конец свинга → бросок
/// 3. advance_anchors: шаг state machine, события попаданий
/// 4. apply_hammer_hits: урон, уничтожение снарядов
/// 5. sync_anchors: Transform + replication
///
/// Dispatch актора всегда раньше шага его anchor'а в том же тике.
pub struct HammerPlugin;

impl Plugin for HammerPlugin {
    fn build(&self, app: &mut App) {
        // Хост может заранее вставить свой registry / config / tiles
        if !app.world().contains_resource::<HammerRegistry>() {
            app.insert_resource(HammerRegistry::with_stock_hammers());
        }

        app.init_resource::<HammerConfig>()
            .init_resource::<TileWorld>()
            .init_resource::<ReplicationOutbox>();

        app.add_event::<HammerHit>()
            .add_event::<ProjectileBlocked>()
            .add_event::<AnchorDespawned>();

        app.add_systems(
            FixedUpdate,
            (
                systems::dispatch_actions,
                systems::advance_swings,
                systems::advance_anchors,
                systems::apply_hammer_hits,
                systems::sync_anchors,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
