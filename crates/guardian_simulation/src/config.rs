//! Runtime tuning for the hammer simulation.
//!
//! Per-variant numbers live in `WeaponDefinition`; everything here is shared by
//! all hammers (tick rate, motion constants, sweep shapes).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Which secondary-action edge deploys a block (or recalls a blocking anchor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum BlockTrigger {
    /// Fresh press of the secondary action
    #[default]
    Press,
    /// Release of the secondary action
    Release,
}

/// Shared hammer tuning (resource).
///
/// Distances are world units, speeds are world units per tick.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct HammerConfig {
    /// Simulation rate (FixedUpdate), used for tick → seconds conversion
    pub tick_hz: f64,
    /// Base pursuit speed of a returning anchor (before `return_speed_multiplier`)
    pub return_speed: f32,
    /// Block duration written on recall; negative so the anchor leaves at once
    pub recall_block_duration: i32,
    /// Extra return speed factor for recalled anchors
    pub recall_speed_factor: f32,
    /// Distance at which a returning anchor is caught by its owner
    pub catch_radius: f32,
    /// Contact radius of a flying anchor
    pub anchor_radius: f32,
    /// Contact radius of a blocking anchor
    pub block_radius: f32,
    /// Reach of the melee sweep in front of the owner
    pub swing_reach: f32,
    /// Swing length at `swing_speed_multiplier == 1.0`
    pub swing_base_ticks: u32,
    /// Charge earned per melee hit (before `swing_charge_gain`)
    pub swing_charge_per_hit: f32,
    /// Range multiplier applied to weak throws
    pub weak_throw_range_factor: f32,
    /// How many ticks of block launch velocity the anchor is deployed ahead
    pub block_deploy_ticks: u32,
    pub block_trigger: BlockTrigger,
}

impl HammerConfig {
    pub const DEFAULT_TICK_HZ: f64 = 60.0;

    /// Converts a tick count to seconds at the configured rate.
    pub fn ticks_to_secs(&self, ticks: u32) -> f32 {
        (ticks as f64 / self.tick_hz) as f32
    }
}

impl Default for HammerConfig {
    fn default() -> Self {
        Self {
            tick_hz: Self::DEFAULT_TICK_HZ,
            return_speed: 12.0,
            recall_block_duration: -30,
            recall_speed_factor: 1.5,
            catch_radius: 16.0,
            anchor_radius: 20.0,
            block_radius: 28.0,
            swing_reach: 48.0,
            swing_base_ticks: 30,
            swing_charge_per_hit: 0.2,
            weak_throw_range_factor: 0.5,
            block_deploy_ticks: 4,
            block_trigger: BlockTrigger::Press,
        }
    }
}
