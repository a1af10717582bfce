//! Hit application: damage on Health, destruction of blocked projectiles.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::components::{Health, HostileProjectile};
use crate::hammer::events::{HammerHit, ProjectileBlocked};
use crate::logger;

/// Система: применение HammerHit / ProjectileBlocked за этот тик.
///
/// Цель, которая исчезла или уже мертва, пропускается молча.
pub fn apply_hammer_hits(
    mut commands: Commands,
    mut hits: EventReader<HammerHit>,
    mut blocked: EventReader<ProjectileBlocked>,
    mut targets: Query<&mut Health>,
    projectiles: Query<(), With<HostileProjectile>>,
) {
    for hit in hits.read() {
        let Ok(mut health) = targets.get_mut(hit.target) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        health.take_damage(hit.damage);
        logger::log(&format!(
            "{:?} → {:?}: {} damage ({:?}{}), HP {}/{}",
            hit.owner,
            hit.target,
            hit.damage,
            hit.mode,
            if hit.is_crit { ", crit" } else { "" },
            health.current,
            health.max
        ));

        if !health.is_alive() {
            logger::log_info(&format!("{:?} defeated by {:?}", hit.target, hit.owner));
        }
    }

    // Один снаряд могли заблокировать дважды за тик
    let mut destroyed = BTreeSet::new();
    for event in blocked.read() {
        if !event.destroyed || !projectiles.contains(event.projectile) {
            continue;
        }
        if destroyed.insert(event.projectile) {
            commands.entity(event.projectile).despawn();
        }
    }
}
