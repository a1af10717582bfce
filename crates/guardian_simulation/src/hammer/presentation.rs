//! Draw-side view of an anchor. Rendering itself belongs to the host.

use bevy::prelude::*;

use super::anchor::{AnchorInstance, AnchorPhase};
use super::definition::WeaponDefinition;
use super::hooks::HammerHooks;

/// Linear RGBA tint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl GlowColor {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Read-only state handed to draw hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSnapshot {
    pub phase: AnchorPhase,
    pub position: Vec2,
    pub velocity: Vec2,
    pub hold_offset: f32,
    pub texture: String,
}

impl DrawSnapshot {
    pub fn of(anchor: &AnchorInstance, definition: &WeaponDefinition, texture: &str) -> Self {
        Self {
            phase: anchor.phase(),
            position: anchor.position,
            velocity: anchor.velocity,
            hold_offset: definition.hold_offset(),
            texture: texture.to_string(),
        }
    }
}

/// Host-side sprite drawing.
pub trait HammerRenderer {
    fn draw_default(&mut self, snapshot: &DrawSnapshot, tint: GlowColor);
}

/// Runs the draw hooks around the renderer's default draw.
///
/// Returns whether the default draw happened.
pub fn draw_anchor(
    anchor: &AnchorInstance,
    definition: &WeaponDefinition,
    texture: &str,
    hooks: &dyn HammerHooks,
    renderer: &mut dyn HammerRenderer,
) -> bool {
    let snapshot = DrawSnapshot::of(anchor, definition, texture);

    let draw_default = hooks.pre_draw_hammer(&snapshot);
    if draw_default {
        let tint = hooks.glow_color(&snapshot);
        renderer.draw_default(&snapshot, tint);
    }
    hooks.post_draw_hammer(&snapshot);

    draw_default
}
