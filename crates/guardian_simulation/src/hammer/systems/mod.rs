//! Hammer systems (FixedUpdate, chained)
//!
//! Порядок внутри тика:
//! 1. dispatch_actions: input → Action (swing/throw/block/recall)
//! 2. advance_swings: таймер свинга, бросок на последнем тике
//! 3. advance_anchors: один шаг state machine каждого anchor'а
//! 4. apply_hammer_hits: урон, уничтожение снарядов
//! 5. sync_anchors: Transform + replication snapshots

use bevy::prelude::*;

use crate::components::{Health, HitRadius, Hostile, HostileProjectile};
use crate::hammer::anchor::AnchorInstance;
use crate::world::{Candidate, OverlapSnapshot, TargetKind};

pub mod apply;
pub mod dispatch;
pub mod motion;

pub use apply::*;
pub use dispatch::*;
pub use motion::*;

/// Query data of everything an anchor or sweep can touch.
pub type HostileData = (
    Entity,
    &'static Transform,
    &'static HitRadius,
    Option<&'static Health>,
    Has<HostileProjectile>,
);

pub type HostileFilter = Or<(With<Hostile>, With<HostileProjectile>)>;

/// Live hostiles of this tick. Мёртвые цели не попадают в выборку.
pub(crate) fn hostile_snapshot(hostiles: &Query<HostileData, HostileFilter>) -> OverlapSnapshot {
    let candidates = hostiles
        .iter()
        .filter(|(_, _, _, health, _)| health.is_none_or(|health| health.is_alive()))
        .map(|(entity, transform, radius, _, is_projectile)| Candidate {
            entity,
            kind: if is_projectile {
                TargetKind::Projectile
            } else {
                TargetKind::Actor
            },
            position: transform.translation.truncate(),
            radius: radius.0,
        })
        .collect();

    OverlapSnapshot::new(candidates)
}

pub(crate) fn spawn_anchor(commands: &mut Commands, anchor: AnchorInstance) -> Entity {
    let translation = anchor.position.extend(0.0);
    commands
        .spawn((Transform::from_translation(translation), anchor))
        .id()
}

/// Entities of a query in index order (детерминизм итерации).
pub(crate) fn sorted(mut entities: Vec<Entity>) -> Vec<Entity> {
    entities.sort_by_key(|entity| entity.index());
    entities
}
