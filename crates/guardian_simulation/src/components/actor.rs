//! Базовые компоненты акторов: Guardian, Health, hostiles

use bevy::prelude::*;

use super::input::InputEdges;
use crate::hammer::{GuardianLedger, HammerId};

/// Актор с Guardian Hammer в руках.
///
/// Автоматически добавляет ledger, input, aim и Health через Required Components.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(GuardianLedger, InputEdges, Aim, Health, Transform)]
pub struct Guardian {
    /// Вариант молота в `HammerRegistry`
    pub hammer: HammerId,
    /// Живой anchor этого актора (не больше одного)
    pub anchor: Option<Entity>,
}

impl Guardian {
    pub fn new(hammer: HammerId) -> Self {
        Self { hammer, anchor: None }
    }

    pub fn has_anchor(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Направление прицела (не обязательно нормализованное)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Aim(pub Vec2);

impl Default for Aim {
    fn default() -> Self {
        Self(Vec2::X)
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Вражеский актор (цель свинга, броска и блока)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, HitRadius, Transform)]
pub struct Hostile;

/// Вражеский снаряд (блокируется anchor'ом)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(HitRadius, Transform)]
pub struct HostileProjectile;

/// Радиус хитбокса цели (world units)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HitRadius(pub f32);

impl Default for HitRadius {
    fn default() -> Self {
        Self(12.0)
    }
}
