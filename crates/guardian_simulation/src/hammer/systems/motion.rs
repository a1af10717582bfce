//! Swing timers, anchor state machines and transform sync.

use bevy::prelude::*;

use super::{hostile_snapshot, sorted, spawn_anchor, HostileData, HostileFilter};
use crate::components::{Aim, Guardian};
use crate::config::HammerConfig;
use crate::hammer::anchor::{launch_throw, AnchorInstance, AnchorSnapshot, Launch, TickEnv};
use crate::hammer::events::{AnchorDespawned, HammerHit, ProjectileBlocked};
use crate::hammer::ledger::GuardianLedger;
use crate::hammer::registry::HammerRegistry;
use crate::hammer::swing::SwingInProgress;
use crate::logger;
use crate::world::TileWorld;
use crate::DeterministicRng;

/// Система: таймер свинга. На последнем тике та же активация продолжается броском.
///
/// Свинг, вставленный dispatch'ем в этом тике, тоже считается (тик старта входит
/// в длительность).
pub fn advance_swings(
    mut commands: Commands,
    config: Res<HammerConfig>,
    registry: Res<HammerRegistry>,
    mut swings: Query<(
        Entity,
        &mut Guardian,
        &mut GuardianLedger,
        &mut SwingInProgress,
        &Aim,
        &Transform,
    )>,
) {
    let order = sorted(swings.iter().map(|(entity, ..)| entity).collect());

    for entity in order {
        let Ok((entity, mut guardian, mut ledger, mut swing, aim, transform)) = swings.get_mut(entity) else {
            continue;
        };
        if !swing.advance() {
            continue;
        }

        commands.entity(entity).remove::<SwingInProgress>();

        let Ok(variant) = registry.get(guardian.hammer) else {
            logger::log_warning(&format!("{:?}: swing ended with unknown hammer {:?}", entity, guardian.hammer));
            continue;
        };

        let strength = swing.throw_strength();
        let activation = std::mem::take(&mut swing.activation);
        let anchor = launch_throw(
            Launch {
                owner: entity,
                origin: transform.translation.truncate(),
                aim: aim.0,
            },
            strength,
            activation,
            &variant.definition,
            &config,
            variant.hooks.as_ref(),
            &mut *ledger,
        );
        guardian.anchor = Some(spawn_anchor(&mut commands, anchor));
    }
}

/// Система: один шаг state machine каждого anchor'а.
///
/// Anchor, заспавненный в этом же тике, начинает движение со следующего.
pub fn advance_anchors(
    mut commands: Commands,
    config: Res<HammerConfig>,
    registry: Res<HammerRegistry>,
    tiles: Res<TileWorld>,
    mut rng: ResMut<DeterministicRng>,
    mut anchors: Query<(Entity, &mut AnchorInstance)>,
    mut owners: Query<(&mut Guardian, &Transform, &mut GuardianLedger)>,
    hostiles: Query<HostileData, HostileFilter>,
    mut hit_events: EventWriter<HammerHit>,
    mut blocked_events: EventWriter<ProjectileBlocked>,
    mut despawned_events: EventWriter<AnchorDespawned>,
) {
    let overlaps = hostile_snapshot(&hostiles);
    let order = sorted(anchors.iter().map(|(entity, _)| entity).collect());

    for entity in order {
        let Ok((entity, mut anchor)) = anchors.get_mut(entity) else {
            continue;
        };
        if anchor.is_added() {
            continue;
        }

        let owner = anchor.owner();
        let Ok((mut guardian, transform, mut ledger)) = owners.get_mut(owner) else {
            // Владелец исчез: anchor'у некуда возвращаться
            logger::log_warning(&format!("{:?}: owner {:?} is gone, despawning", entity, owner));
            commands.entity(entity).despawn();
            despawned_events.write(AnchorDespawned { owner, anchor: entity });
            continue;
        };
        let Ok(variant) = registry.get(guardian.hammer) else {
            logger::log_warning(&format!("{:?}: unknown hammer {:?}, despawning", entity, guardian.hammer));
            commands.entity(entity).despawn();
            guardian.anchor = None;
            despawned_events.write(AnchorDespawned { owner, anchor: entity });
            continue;
        };

        let report = anchor.tick(&mut TickEnv {
            definition: &variant.definition,
            config: &config,
            hooks: variant.hooks.as_ref(),
            ledger: &mut *ledger,
            owner_position: Some(transform.translation.truncate()),
            overlaps: &overlaps,
            tiles: &*tiles,
            crits: &mut rng.rng,
        });

        for record in &report.hits {
            hit_events.write(HammerHit::from_record(owner, record));
        }
        for blocked in &report.blocked {
            blocked_events.write(ProjectileBlocked {
                owner,
                projectile: blocked.projectile,
                destroyed: blocked.destroyed,
            });
        }

        if report.despawned {
            commands.entity(entity).despawn();
            if guardian.anchor == Some(entity) {
                guardian.anchor = None;
            }
            despawned_events.write(AnchorDespawned { owner, anchor: entity });
        }
    }
}

/// Snapshots of anchors whose visible state changed, in tick order.
///
/// Хост забирает их через `drain` (сеть, движок, тесты).
#[derive(Resource, Debug, Default)]
pub struct ReplicationOutbox {
    pub snapshots: Vec<(Entity, AnchorSnapshot)>,
}

impl ReplicationOutbox {
    pub fn drain(&mut self) -> Vec<(Entity, AnchorSnapshot)> {
        std::mem::take(&mut self.snapshots)
    }
}

/// Система: ECS position → Transform, dirty anchors → outbox.
pub fn sync_anchors(
    mut anchors: Query<(Entity, &mut AnchorInstance, &mut Transform)>,
    mut outbox: ResMut<ReplicationOutbox>,
) {
    let order = sorted(anchors.iter().map(|(entity, ..)| entity).collect());

    for entity in order {
        let Ok((entity, mut anchor, mut transform)) = anchors.get_mut(entity) else {
            continue;
        };

        transform.translation.x = anchor.position.x;
        transform.translation.y = anchor.position.y;

        if anchor.needs_replication {
            anchor.needs_replication = false;
            outbox.snapshots.push((entity, anchor.snapshot()));
        }
    }
}
