//! Virtual joystick
//!
//! The pointer is an aim; the stick eases toward it by a fraction each
//! update, so a higher slipperiness means sloppier steering. The stick's
//! offset from its origin becomes the player's lateral offset (across the
//! tube) and a speed offset (along it).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::{CONTROLLER_SLIPPERINESS, CONTROLLER_SPEED_DAMP};
use crate::layout::Layout;
use crate::level::LevelData;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Controller {
    pub speed_damp: f32,
    pub slipperiness: f32,
    /// Extra slipperiness while the player is reeling from a hit
    pub damage_added_slipperiness: f32,
    /// Canvas area the stick is confined to
    pub active_area: Rect,
    pub stick_origin: Vec2,
    pub stick_pos: Vec2,
    /// Pointer position in canvas space (knockback moves this too)
    pub pointer: Vec2,
    pub lateral_multiplier: f32,
    pub speed_offset: f32,
    pub lateral_offset: f32,
}

impl Controller {
    pub fn new(layout: &Layout) -> Self {
        let mut controller = Self {
            speed_damp: CONTROLLER_SPEED_DAMP,
            slipperiness: CONTROLLER_SLIPPERINESS,
            damage_added_slipperiness: 0.0,
            active_area: layout.controller,
            stick_origin: Vec2::ZERO,
            stick_pos: Vec2::ZERO,
            pointer: layout.controller.center(),
            lateral_multiplier: 1.0,
            speed_offset: 0.0,
            lateral_offset: 0.0,
        };
        controller.set_origin();
        controller
    }

    /// Level tuning, falling back to the defaults
    pub fn setup_for_level(&mut self, level: &LevelData) {
        self.speed_damp = level.controller_speed_damp.unwrap_or(CONTROLLER_SPEED_DAMP);
        self.slipperiness = level.controller_slipperiness.unwrap_or(CONTROLLER_SLIPPERINESS);
        self.damage_added_slipperiness = 0.0;
    }

    /// Follow a layout change and re-center the stick
    pub fn update_layout(&mut self, layout: &Layout) {
        self.active_area = layout.controller;
        self.set_origin();
    }

    /// Put the stick back at rest in the middle of the active area
    pub fn set_origin(&mut self) {
        self.stick_origin = self.active_area.center();
        self.stick_pos = self.stick_origin;
        self.speed_offset = 0.0;
        self.lateral_offset = 0.0;
    }

    /// Full stick travel should carry the player wall to wall
    pub fn update_lateral_multiplier(&mut self, gameplay_width: f32, player_drawn_radius: f32) {
        let width = self.active_area.width();
        self.lateral_multiplier = if width > 0.0 {
            (gameplay_width - player_drawn_radius * 2.0) / width
        } else {
            0.0
        };
    }

    pub fn set_pointer(&mut self, pos: Vec2) {
        self.pointer = pos;
    }

    /// Shove the aim as if the pointer had moved (collision knockback)
    pub fn kick(&mut self, knockback: Vec2) {
        self.pointer += knockback;
    }

    /// Ease the stick toward the pointer and recompute the offsets
    pub fn update_pointer_pos(&mut self) {
        let aim = self.active_area.clamp(self.pointer);
        let slip = (self.slipperiness + self.damage_added_slipperiness).max(1.0);
        self.stick_pos += (aim - self.stick_pos) / slip;

        let damp = if self.speed_damp > 0.0 { self.speed_damp } else { CONTROLLER_SPEED_DAMP };
        self.speed_offset = (self.stick_pos.y - self.stick_origin.y) / damp;
        self.lateral_offset = (self.stick_origin.x - self.stick_pos.x) * self.lateral_multiplier;
    }

    pub fn clear_damage(&mut self) {
        self.damage_added_slipperiness = 0.0;
    }
}
