//! Dispatch system: input edges → action start / recall.

use bevy::prelude::*;

use super::{hostile_snapshot, sorted, spawn_anchor, HostileData, HostileFilter};
use crate::components::{Aim, Guardian, InputEdges};
use crate::config::HammerConfig;
use crate::hammer::activation::Activation;
use crate::hammer::anchor::{deploy_block, launch_throw, AnchorInstance, Launch};
use crate::hammer::dispatcher::{commit, decide, Action};
use crate::hammer::events::HammerHit;
use crate::hammer::ledger::GuardianLedger;
use crate::hammer::registry::HammerRegistry;
use crate::hammer::swing::{perform_sweep, SweepEnv, SwingInProgress};
use crate::logger;
use crate::DeterministicRng;

/// Система: опрос dispatcher'а для каждого свободного Guardian.
///
/// Актор посреди свинга занят и не опрашивается (`Without<SwingInProgress>`).
pub fn dispatch_actions(
    mut commands: Commands,
    config: Res<HammerConfig>,
    registry: Res<HammerRegistry>,
    mut rng: ResMut<DeterministicRng>,
    mut guardians: Query<
        (Entity, &mut Guardian, &mut GuardianLedger, &InputEdges, &Aim, &Transform),
        Without<SwingInProgress>,
    >,
    mut anchors: Query<&mut AnchorInstance>,
    hostiles: Query<HostileData, HostileFilter>,
    mut hit_events: EventWriter<HammerHit>,
) {
    let overlaps = hostile_snapshot(&hostiles);
    let order = sorted(guardians.iter().map(|(entity, ..)| entity).collect());

    for entity in order {
        let Ok((entity, mut guardian, mut ledger, input, aim, transform)) = guardians.get_mut(entity) else {
            continue;
        };
        let Ok(variant) = registry.get(guardian.hammer) else {
            logger::log_warning(&format!("{:?}: unknown hammer {:?}", entity, guardian.hammer));
            continue;
        };

        // Ссылка на anchor, который уже удалён
        if guardian.anchor.is_some_and(|anchor| !anchors.contains(anchor)) {
            guardian.anchor = None;
        }

        let existing = guardian.anchor.and_then(|anchor| anchors.get(anchor).ok());
        let action = decide(&variant.definition, &*ledger, input, existing, &config);
        if action == Action::None {
            continue;
        }

        let existing = match guardian.anchor {
            Some(anchor) => anchors.get_mut(anchor).ok().map(Mut::into_inner),
            None => None,
        };
        let Some(start) = commit(action, &mut *ledger, existing, &config) else {
            continue;
        };

        let owner_position = transform.translation.truncate();
        let launch = Launch {
            owner: entity,
            origin: owner_position,
            aim: aim.0,
        };
        let hooks = variant.hooks.as_ref();

        match start.action {
            Action::StartSwing => {
                let mut swing = SwingInProgress::new(
                    &variant.definition,
                    &config,
                    start.charge_at_start,
                    Activation::new(),
                );
                let hits = perform_sweep(
                    entity,
                    owner_position,
                    aim.0,
                    &mut swing,
                    &mut SweepEnv {
                        definition: &variant.definition,
                        config: &config,
                        hooks,
                        ledger: &mut *ledger,
                        overlaps: &overlaps,
                        crits: &mut rng.rng,
                    },
                );
                for record in &hits {
                    hit_events.write(HammerHit::from_record(entity, record));
                }

                logger::log(&format!(
                    "{:?} swings ({} hits, {} ticks)",
                    entity,
                    hits.len(),
                    swing.ticks_remaining
                ));
                commands.entity(entity).insert(swing);
            }
            Action::StartThrow(strength) => {
                let anchor = launch_throw(
                    launch,
                    strength,
                    Activation::new(),
                    &variant.definition,
                    &config,
                    hooks,
                    &mut *ledger,
                );
                guardian.anchor = Some(spawn_anchor(&mut commands, anchor));
            }
            Action::StartBlock => {
                let anchor = deploy_block(
                    launch,
                    Activation::new(),
                    &variant.definition,
                    &config,
                    hooks,
                    &mut *ledger,
                );
                guardian.anchor = Some(spawn_anchor(&mut commands, anchor));
            }
            Action::None | Action::Recall => {}
        }
    }
}
