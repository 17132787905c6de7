//! The player's avatar
//!
//! A circle that sits at a fixed depth in the tube and slides across it with
//! the controller. It grows as it eats and loses health when hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::controller::Controller;
use crate::color::Rgba;
use crate::layout::Layout;
use crate::level::PlayerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Authored (unscaled) radius; also the collision mass
    pub radius: f32,
    /// `radius` times the layout's proportional multiplier
    pub drawn_radius: f32,
    pub color: Rgba,
    /// Tint of the last thing eaten, shown while `eats_counter > 0`
    pub eaten_color: Option<Rgba>,
    pub growth_divisor: f32,
    pub health: u32,
    pub start_health: u32,
    pub eats_counter: u32,
    pub damaged_counter: u32,
    /// Center in gameplay space, lateral steering applied
    pub pos: Vec2,
    /// Movement since the previous update (used as the bounce velocity)
    pub velocity: Vec2,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            radius: 15.0,
            drawn_radius: 15.0,
            color: Rgba::WHITE,
            eaten_color: None,
            growth_divisor: 100.0,
            health: 1,
            start_health: 1,
            eats_counter: 0,
            damaged_counter: 0,
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }
}

impl Player {
    pub fn setup_for_level(&mut self, config: &PlayerConfig, start_health: u32, layout: &Layout) {
        self.radius = config.radius;
        self.color = config.color;
        self.growth_divisor = config.growth_divisor;
        self.health = start_health;
        self.start_health = start_health;
        self.eaten_color = None;
        self.eats_counter = 0;
        self.damaged_counter = 0;
        self.velocity = Vec2::ZERO;
        self.update_sizes(layout);
        self.pos = layout.player_origin();
    }

    pub fn update_sizes(&mut self, layout: &Layout) {
        self.drawn_radius = self.radius * layout.proportional_multiplier;
    }

    /// Follow the controller; returns true on the frame the damage effect ends
    pub fn update(&mut self, frames: u32, layout: &Layout, controller: &Controller) -> bool {
        self.update_sizes(layout);

        let mut pos = layout.player_origin();
        pos.x -= controller.lateral_offset;
        self.velocity = Vec2::new(pos.x - self.pos.x, controller.speed_offset);
        self.pos = pos;

        self.eats_counter = self.eats_counter.saturating_sub(frames);
        if self.eats_counter == 0 {
            self.eaten_color = None;
        }

        let was_damaged = self.damaged_counter > 0;
        self.damaged_counter = self.damaged_counter.saturating_sub(frames);
        was_damaged && self.damaged_counter == 0
    }

    /// Absorb part of an eaten obstacle's size
    pub fn grow(&mut self, eaten_radius: f32) {
        if self.growth_divisor > 0.0 {
            self.radius += eaten_radius / self.growth_divisor;
        }
    }

    /// Lose one health point, returning what's left
    pub fn lose_health(&mut self) -> u32 {
        self.health = self.health.saturating_sub(1);
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}
