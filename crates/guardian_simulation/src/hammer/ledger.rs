//! Resource ledger: charge level and guardian stacks owned by the actor.
//!
//! The state machine only talks to the [`ResourceLedger`] trait; the
//! [`GuardianLedger`] component is the stock implementation.

use bevy::prelude::*;

/// Named stack resources a guardian spends and earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ResourceKind {
    /// Spent to deploy a block
    Guard,
    /// Earned by charged throws, spent by slam abilities
    Slam,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Guard => "guard",
            ResourceKind::Slam => "slam",
        }
    }
}

/// Charge and stack accounting consumed by the dispatcher and hit pipeline.
///
/// Failure is expressed as `false`, never as an error.
pub trait ResourceLedger {
    /// Normalized charge, `1.0` = fully charged.
    fn charge_level(&self) -> f32;

    fn reset_charge(&mut self);

    /// Adds charge (clamped to `1.0`).
    fn gain_charge(&mut self, amount: f32);

    /// Non-mutating affordability check.
    fn can_afford(&self, kind: ResourceKind, amount: u32) -> bool;

    /// Debits `amount` if affordable. Returns whether the debit happened.
    fn try_debit_resource(&mut self, kind: ResourceKind, amount: u32) -> bool;

    fn grant_resource(&mut self, kind: ResourceKind, amount: u32);
}

/// Per-actor guardian resources.
///
/// Инвариант: 0 ≤ charge ≤ 1, 0 ≤ guard ≤ guard_max, 0 ≤ slam ≤ slam_max
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct GuardianLedger {
    pub charge: f32,
    pub guard: u32,
    pub guard_max: u32,
    pub slam: u32,
    pub slam_max: u32,
}

impl Default for GuardianLedger {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

impl GuardianLedger {
    /// Full guard, empty slam, no charge.
    pub fn new(guard_max: u32, slam_max: u32) -> Self {
        Self {
            charge: 0.0,
            guard: guard_max,
            guard_max,
            slam: 0,
            slam_max,
        }
    }

    pub fn with_charge(mut self, charge: f32) -> Self {
        self.charge = charge.clamp(0.0, 1.0);
        self
    }

    pub fn with_guard(mut self, guard: u32) -> Self {
        self.guard = guard.min(self.guard_max);
        self
    }

    pub fn balance(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Guard => self.guard,
            ResourceKind::Slam => self.slam,
        }
    }

    pub fn is_fully_charged(&self) -> bool {
        self.charge >= 1.0
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> (&mut u32, u32) {
        match kind {
            ResourceKind::Guard => (&mut self.guard, self.guard_max),
            ResourceKind::Slam => (&mut self.slam, self.slam_max),
        }
    }
}

impl ResourceLedger for GuardianLedger {
    fn charge_level(&self) -> f32 {
        self.charge
    }

    fn reset_charge(&mut self) {
        self.charge = 0.0;
    }

    fn gain_charge(&mut self, amount: f32) {
        self.charge = (self.charge + amount.max(0.0)).min(1.0);
    }

    fn can_afford(&self, kind: ResourceKind, amount: u32) -> bool {
        self.balance(kind) >= amount
    }

    fn try_debit_resource(&mut self, kind: ResourceKind, amount: u32) -> bool {
        let (balance, _) = self.slot_mut(kind);
        if *balance >= amount {
            *balance -= amount;
            true
        } else {
            false
        }
    }

    fn grant_resource(&mut self, kind: ResourceKind, amount: u32) {
        let (balance, max) = self.slot_mut(kind);
        *balance = balance.saturating_add(amount).min(max);
    }
}
