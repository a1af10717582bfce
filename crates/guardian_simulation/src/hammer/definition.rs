//! Immutable per-variant hammer configuration.
//!
//! Built once at registration (builder or RON), validated on construction,
//! never mutated at runtime. Fields are private; presentation code reads them
//! through getters.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::HammerConfig;

/// Content error: a definition that must never reach the state machine.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("multiplier `{field}` must be finite and >= 0 (got {value})")]
    InvalidMultiplier { field: &'static str, value: f32 },

    #[error("duration `{field}` must be >= 0 ticks (got {value})")]
    NegativeDuration { field: &'static str, value: i64 },

    #[error("crit chance must be within 0..=1 (got {0})")]
    CritChanceOutOfRange(f32),

    #[error("swing speed must be > 0 for a hammer that can swing (got {0})")]
    ZeroSwingSpeed(f32),

    #[error("return speed must be > 0 (got {0})")]
    ZeroReturnSpeed(f32),

    #[error("failed to parse hammer definition: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Raw definition fields (serde shape). Missing fields take the item defaults
/// from [`WeaponDefinition::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DefinitionData {
    base_damage: u32,
    knockback: f32,
    shoot_speed: f32,
    crit_chance: f32,
    range: i64,
    slam_stacks: u32,
    guard_stacks: u32,
    block_duration: i64,
    penetrate: bool,
    tile_collide: bool,
    tile_bounce: bool,
    return_speed_multiplier: f32,
    swing_speed_multiplier: f32,
    swing_charge_gain: f32,
    swing_damage_multiplier: f32,
    throw_damage_multiplier: f32,
    block_damage_multiplier: f32,
    hit_cooldown_ticks: i64,
    cannot_swing: bool,
    hold_offset: f32,
    block_velocity_multiplier: f32,
}

impl Default for DefinitionData {
    fn default() -> Self {
        Self::from(&WeaponDefinition::default())
    }
}

impl From<&WeaponDefinition> for DefinitionData {
    fn from(definition: &WeaponDefinition) -> Self {
        Self {
            base_damage: definition.base_damage,
            knockback: definition.knockback,
            shoot_speed: definition.shoot_speed,
            crit_chance: definition.crit_chance,
            range: i64::from(definition.range),
            slam_stacks: definition.slam_stacks,
            guard_stacks: definition.guard_stacks,
            block_duration: i64::from(definition.block_duration),
            penetrate: definition.penetrate,
            tile_collide: definition.tile_collide,
            tile_bounce: definition.tile_bounce,
            return_speed_multiplier: definition.return_speed_multiplier,
            swing_speed_multiplier: definition.swing_speed_multiplier,
            swing_charge_gain: definition.swing_charge_gain,
            swing_damage_multiplier: definition.swing_damage_multiplier,
            throw_damage_multiplier: definition.throw_damage_multiplier,
            block_damage_multiplier: definition.block_damage_multiplier,
            hit_cooldown_ticks: i64::from(definition.hit_cooldown_ticks),
            cannot_swing: definition.cannot_swing,
            hold_offset: definition.hold_offset,
            block_velocity_multiplier: definition.block_velocity_multiplier,
        }
    }
}

/// Validated hammer definition.
///
/// Invariants (checked by [`WeaponDefinitionBuilder::build`] and
/// [`WeaponDefinition::from_ron`]):
/// - every multiplier is finite and >= 0
/// - `range`, `block_duration`, `hit_cooldown_ticks` are >= 0
/// - `crit_chance` is within `0..=1`
/// - `swing_speed_multiplier > 0` unless `cannot_swing`
/// - `return_speed_multiplier > 0`
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct WeaponDefinition {
    base_damage: u32,
    knockback: f32,
    shoot_speed: f32,
    crit_chance: f32,
    range: u32,
    slam_stacks: u32,
    guard_stacks: u32,
    block_duration: u32,
    penetrate: bool,
    tile_collide: bool,
    tile_bounce: bool,
    return_speed_multiplier: f32,
    swing_speed_multiplier: f32,
    swing_charge_gain: f32,
    swing_damage_multiplier: f32,
    throw_damage_multiplier: f32,
    block_damage_multiplier: f32,
    hit_cooldown_ticks: u32,
    cannot_swing: bool,
    hold_offset: f32,
    block_velocity_multiplier: f32,
}

/// Item defaults. Единственный источник: builder и RON стартуют отсюда.
impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            base_damage: 10,
            knockback: 10.0,
            shoot_speed: 10.0,
            crit_chance: 0.04,
            range: 0,
            slam_stacks: 0,
            guard_stacks: 0,
            block_duration: 180,
            penetrate: false,
            tile_collide: true,
            tile_bounce: false,
            return_speed_multiplier: 1.0,
            swing_speed_multiplier: 1.0,
            swing_charge_gain: 1.0,
            swing_damage_multiplier: 0.5,
            throw_damage_multiplier: 1.0,
            block_damage_multiplier: 0.33,
            hit_cooldown_ticks: 30,
            cannot_swing: false,
            hold_offset: 0.0,
            block_velocity_multiplier: 1.0,
        }
    }
}

impl WeaponDefinition {
    pub fn builder() -> WeaponDefinitionBuilder {
        WeaponDefinitionBuilder::default()
    }

    /// Parses and validates a definition written in RON.
    ///
    /// ```ron
    /// (base_damage: 40, range: 25, slam_stacks: 1, penetrate: true)
    /// ```
    pub fn from_ron(source: &str) -> Result<Self, DefinitionError> {
        let data: DefinitionData = ron::from_str(source)?;
        Self::from_data(data)
    }

    fn from_data(data: DefinitionData) -> Result<Self, DefinitionError> {
        let multipliers = [
            ("knockback", data.knockback),
            ("shoot_speed", data.shoot_speed),
            ("return_speed_multiplier", data.return_speed_multiplier),
            ("swing_speed_multiplier", data.swing_speed_multiplier),
            ("swing_charge_gain", data.swing_charge_gain),
            ("swing_damage_multiplier", data.swing_damage_multiplier),
            ("throw_damage_multiplier", data.throw_damage_multiplier),
            ("block_damage_multiplier", data.block_damage_multiplier),
            ("block_velocity_multiplier", data.block_velocity_multiplier),
        ];
        for (field, value) in multipliers {
            if !value.is_finite() || value < 0.0 {
                return Err(DefinitionError::InvalidMultiplier { field, value });
            }
        }

        if !(0.0..=1.0).contains(&data.crit_chance) {
            return Err(DefinitionError::CritChanceOutOfRange(data.crit_chance));
        }

        if !data.cannot_swing && data.swing_speed_multiplier <= 0.0 {
            return Err(DefinitionError::ZeroSwingSpeed(data.swing_speed_multiplier));
        }

        // Anchor с нулевой скоростью возврата никогда не будет пойман
        if data.return_speed_multiplier <= 0.0 {
            return Err(DefinitionError::ZeroReturnSpeed(data.return_speed_multiplier));
        }

        Ok(Self {
            base_damage: data.base_damage,
            knockback: data.knockback,
            shoot_speed: data.shoot_speed,
            crit_chance: data.crit_chance,
            range: ticks("range", data.range)?,
            slam_stacks: data.slam_stacks,
            guard_stacks: data.guard_stacks,
            block_duration: ticks("block_duration", data.block_duration)?,
            penetrate: data.penetrate,
            tile_collide: data.tile_collide,
            tile_bounce: data.tile_bounce,
            return_speed_multiplier: data.return_speed_multiplier,
            swing_speed_multiplier: data.swing_speed_multiplier,
            swing_charge_gain: data.swing_charge_gain,
            swing_damage_multiplier: data.swing_damage_multiplier,
            throw_damage_multiplier: data.throw_damage_multiplier,
            block_damage_multiplier: data.block_damage_multiplier,
            hit_cooldown_ticks: ticks("hit_cooldown_ticks", data.hit_cooldown_ticks)?,
            cannot_swing: data.cannot_swing,
            hold_offset: data.hold_offset,
            block_velocity_multiplier: data.block_velocity_multiplier,
        })
    }

    pub fn base_damage(&self) -> u32 {
        self.base_damage
    }

    pub fn knockback(&self) -> f32 {
        self.knockback
    }

    /// Launch speed of a throw (world units per tick).
    pub fn shoot_speed(&self) -> f32 {
        self.shoot_speed
    }

    pub fn crit_chance(&self) -> f32 {
        self.crit_chance
    }

    /// Ticks before a thrown anchor starts to return.
    pub fn range(&self) -> u32 {
        self.range
    }

    /// Slam stacks granted by the first hit of a fully charged throw.
    pub fn slam_stacks(&self) -> u32 {
        self.slam_stacks
    }

    /// Guard stacks granted by the first hit of a fully charged throw.
    pub fn guard_stacks(&self) -> u32 {
        self.guard_stacks
    }

    /// Ticks a blocking anchor stays deployed.
    pub fn block_duration(&self) -> u32 {
        self.block_duration
    }

    pub fn penetrate(&self) -> bool {
        self.penetrate
    }

    pub fn tile_collide(&self) -> bool {
        self.tile_collide
    }

    pub fn tile_bounce(&self) -> bool {
        self.tile_bounce
    }

    pub fn return_speed_multiplier(&self) -> f32 {
        self.return_speed_multiplier
    }

    pub fn swing_speed_multiplier(&self) -> f32 {
        self.swing_speed_multiplier
    }

    pub fn swing_charge_gain(&self) -> f32 {
        self.swing_charge_gain
    }

    pub fn swing_damage_multiplier(&self) -> f32 {
        self.swing_damage_multiplier
    }

    pub fn throw_damage_multiplier(&self) -> f32 {
        self.throw_damage_multiplier
    }

    pub fn block_damage_multiplier(&self) -> f32 {
        self.block_damage_multiplier
    }

    pub fn hit_cooldown_ticks(&self) -> u32 {
        self.hit_cooldown_ticks
    }

    pub fn cannot_swing(&self) -> bool {
        self.cannot_swing
    }

    /// Draw offset while held (pixels). Presentation only.
    pub fn hold_offset(&self) -> f32 {
        self.hold_offset
    }

    pub fn block_velocity_multiplier(&self) -> f32 {
        self.block_velocity_multiplier
    }

    /// Length of one melee swing in ticks (never shorter than one tick).
    pub fn swing_ticks(&self, config: &HammerConfig) -> u32 {
        if self.swing_speed_multiplier <= 0.0 {
            return config.swing_base_ticks.max(1);
        }
        let ticks = (config.swing_base_ticks as f32 / self.swing_speed_multiplier).ceil();
        (ticks as u32).max(1)
    }

    /// Launch speed of a block deployment.
    ///
    /// Blocks fly slower than throws: only 35% of the shoot speed above the
    /// base 10 is kept, scaled by `block_velocity_multiplier`.
    pub fn block_launch_speed(&self) -> f32 {
        10.0 + (self.shoot_speed - 10.0) * 0.35 * self.block_velocity_multiplier
    }

    /// Summary for tooltips and stat panels.
    pub fn stat_sheet(&self, config: &HammerConfig) -> StatSheet {
        StatSheet {
            block_duration_secs: config.ticks_to_secs(self.block_duration),
            grants_guard: self.guard_stacks > 0,
            grants_slam: self.slam_stacks > 0,
            guard_stacks: self.guard_stacks,
            slam_stacks: self.slam_stacks,
            can_swing: !self.cannot_swing,
        }
    }
}

fn ticks(field: &'static str, value: i64) -> Result<u32, DefinitionError> {
    u32::try_from(value).map_err(|_| DefinitionError::NegativeDuration { field, value })
}

/// Derived, presentation-facing numbers. Text composition happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatSheet {
    pub block_duration_secs: f32,
    pub grants_guard: bool,
    pub grants_slam: bool,
    pub guard_stacks: u32,
    pub slam_stacks: u32,
    pub can_swing: bool,
}

/// Builder starting from the item defaults.
#[derive(Debug, Clone, Default)]
pub struct WeaponDefinitionBuilder {
    data: DefinitionData,
}

macro_rules! builder_setters {
    ($($name:ident: $ty:ty),* $(,)?) => {
        impl WeaponDefinitionBuilder {
            $(
                pub fn $name(mut self, value: $ty) -> Self {
                    self.data.$name = value;
                    self
                }
            )*
        }
    };
}

builder_setters! {
    base_damage: u32,
    knockback: f32,
    shoot_speed: f32,
    crit_chance: f32,
    range: i64,
    slam_stacks: u32,
    guard_stacks: u32,
    block_duration: i64,
    penetrate: bool,
    tile_collide: bool,
    tile_bounce: bool,
    return_speed_multiplier: f32,
    swing_speed_multiplier: f32,
    swing_charge_gain: f32,
    swing_damage_multiplier: f32,
    throw_damage_multiplier: f32,
    block_damage_multiplier: f32,
    hit_cooldown_ticks: i64,
    cannot_swing: bool,
    hold_offset: f32,
    block_velocity_multiplier: f32,
}

impl WeaponDefinitionBuilder {
    pub fn build(self) -> Result<WeaponDefinition, DefinitionError> {
        WeaponDefinition::from_data(self.data)
    }
}
