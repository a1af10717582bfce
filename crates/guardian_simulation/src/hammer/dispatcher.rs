//! Action dispatcher: which action (if any) starts this tick.
//!
//! `decide` не меняет состояние, побочные эффекты только в `commit`.
//!
//! Приоритет:
//! 1. Secondary edge: recall блокирующего anchor'а, иначе блок (если хватает guard)
//! 2. Есть живой anchor → ничего
//! 3. Primary press: swing (или сразу бросок для `cannot_swing`)

use super::activation::ThrowStrength;
use super::anchor::AnchorInstance;
use super::definition::WeaponDefinition;
use super::ledger::{ResourceKind, ResourceLedger};
use crate::components::InputEdges;
use crate::config::{BlockTrigger, HammerConfig};

/// Guard stacks spent on one block.
pub const BLOCK_GUARD_COST: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    None,
    StartSwing,
    StartThrow(ThrowStrength),
    StartBlock,
    Recall,
}

impl Action {
    /// Whether the action begins a new activation.
    pub fn starts_activation(&self) -> bool {
        matches!(
            self,
            Action::StartSwing | Action::StartThrow(_) | Action::StartBlock
        )
    }
}

/// A committed action start, with the charge captured before it was reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionStart {
    pub action: Action,
    pub charge_at_start: f32,
}

/// Decides the action for this tick. Pure: same inputs, same answer.
pub fn decide(
    definition: &WeaponDefinition,
    ledger: &dyn ResourceLedger,
    input: &InputEdges,
    existing: Option<&AnchorInstance>,
    config: &HammerConfig,
) -> Action {
    let secondary_edge = match config.block_trigger {
        BlockTrigger::Press => input.secondary_pressed,
        BlockTrigger::Release => input.secondary_released,
    };

    if secondary_edge {
        match existing {
            Some(instance) if instance.current_block_duration > 0 => return Action::Recall,
            None if ledger.can_afford(ResourceKind::Guard, BLOCK_GUARD_COST) => {
                return Action::StartBlock
            }
            _ => {}
        }
    }

    // Уже летит/стоит anchor: primary игнорируется
    if existing.is_some() {
        return Action::None;
    }

    if input.primary_pressed {
        if definition.cannot_swing() {
            return Action::StartThrow(ThrowStrength::from_charge(ledger.charge_level()));
        }
        return Action::StartSwing;
    }

    Action::None
}

/// Applies the side effects of `action`.
///
/// - `StartBlock`: debits one guard stack
/// - any start: captures then resets the charge
/// - `Recall`: forces the instance's block duration to the recall value
///
/// Returns the start record for the three start actions.
pub fn commit(
    action: Action,
    ledger: &mut dyn ResourceLedger,
    existing: Option<&mut AnchorInstance>,
    config: &HammerConfig,
) -> Option<ActionStart> {
    match action {
        Action::None => None,
        Action::Recall => {
            if let Some(instance) = existing {
                instance.recall(config.recall_block_duration);
            }
            None
        }
        Action::StartBlock if !ledger.try_debit_resource(ResourceKind::Guard, BLOCK_GUARD_COST) => {
            None
        }
        Action::StartSwing | Action::StartThrow(_) | Action::StartBlock => {
            let charge_at_start = ledger.charge_level();
            ledger.reset_charge();
            Some(ActionStart {
                action,
                charge_at_start,
            })
        }
    }
}
