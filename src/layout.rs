//! Viewport geometry
//!
//! The tube runs vertically (portrait). Everything the simulation needs to
//! know about the screen is a handful of rectangles in simulation-space
//! pixels plus a proportional multiplier that keeps sizes consistent across
//! canvas sizes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::round_to_places;
use crate::sim::obstacle::{Obstacle, ObstacleKind};
use crate::sim::rect::Rect;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    /// Physical pixels per simulation pixel (1..=2)
    pub pixel_scale: f32,
    pub canvas: Rect,
    /// Width of the play area between the pipe walls, relative to the canvas
    pub lateral_ratio: f32,
    pub gameplay_width: f32,
    pub gameplay_height: f32,
    /// Play area in gameplay space; extends one screen below the canvas
    pub gameplay: Rect,
    /// Wrap area for BACKGROUND particles (half a gameplay area beyond the canvas)
    pub background: Rect,
    /// Wrap area for FLOATING bodies
    pub floating: Rect,
    /// Virtual joystick area, in canvas space
    pub controller: Rect,
    /// Horizontal distance from the canvas edge to the left pipe wall
    pub game_area_offset_lateral: f32,
    /// `sqrt(canvas area) / 1000`, four decimal places
    pub proportional_multiplier: f32,
}

impl Layout {
    /// Layout for a canvas of `width` x `height` physical pixels
    pub fn new(width: f32, height: f32, pixel_scale: f32) -> Self {
        let pixel_scale = if pixel_scale.is_finite() {
            pixel_scale.clamp(1.0, MAX_PIXEL_SCALE)
        } else {
            1.0
        };
        let canvas = Rect::sized(
            (width / pixel_scale).round().max(1.0),
            (height / pixel_scale).round().max(1.0),
        );
        let mut layout = Self {
            pixel_scale,
            canvas,
            lateral_ratio: 1.0,
            gameplay_width: 0.0,
            gameplay_height: 0.0,
            gameplay: Rect::default(),
            background: Rect::default(),
            floating: Rect::default(),
            controller: Rect::default(),
            game_area_offset_lateral: 0.0,
            proportional_multiplier: 1.0,
        };
        layout.update(1.0);
        layout
    }

    /// Recompute every rectangle for a level's lateral ratio
    pub fn update(&mut self, lateral_ratio: f32) {
        self.lateral_ratio = if lateral_ratio > 0.0 { lateral_ratio } else { 1.0 };

        let cw = self.canvas.width();
        let ch = self.canvas.height();
        self.gameplay_width = cw * self.lateral_ratio;
        self.gameplay_height = ch;

        let gw = self.gameplay_width;
        let gh = self.gameplay_height;
        self.gameplay = Rect::new(0.0, 0.0, gw, gh * 2.0);
        self.background = Rect::new(-gw / 2.0, -gh / 2.0, cw + gw / 2.0, ch + gh / 2.0);

        let floating_extra = cw / 2.0 * FLOATING_LATERAL_MULTIPLIER;
        self.floating = Rect::new(
            self.canvas.left - floating_extra,
            self.canvas.top,
            self.canvas.right + floating_extra,
            self.canvas.bottom,
        );

        self.controller = Rect::new(
            self.canvas.left,
            self.canvas.bottom - ch * CONTROLLER_HEIGHT_RATIO,
            self.canvas.right,
            self.canvas.bottom,
        );

        self.game_area_offset_lateral = (cw - gw) / 2.0;
        self.proportional_multiplier = round_to_places((cw * ch).sqrt() / SCALING_TARGET_SIZE, 4);

        log::debug!(
            "Layout {}x{} gameplay {}x{} multiplier {}",
            cw,
            ch,
            gw,
            gh,
            self.proportional_multiplier
        );
    }

    /// Where the player sits in gameplay space, before lateral steering
    pub fn player_origin(&self) -> Vec2 {
        Vec2::new(
            self.gameplay_width / 2.0,
            PLAYER_ORIGIN_LONGITUDINAL * self.proportional_multiplier,
        )
    }

    /// Canvas position to draw an obstacle at
    ///
    /// Play-area kinds move with the steering offset; decorative kinds use a
    /// reduced offset so they appear further away.
    pub fn display_position(&self, obstacle: &Obstacle, lateral_offset: f32) -> Vec2 {
        let offset = lateral_offset + self.game_area_offset_lateral;
        let parallax = match obstacle.kind {
            ObstacleKind::Background | ObstacleKind::LevelIntro => BACKGROUND_LATERAL_MULTIPLIER,
            ObstacleKind::Floating => FLOATING_LATERAL_MULTIPLIER,
            ObstacleKind::Collect | ObstacleKind::Avoid => {
                return Vec2::new(obstacle.pos.x + offset, obstacle.pos.y);
            }
        };
        Vec2::new(obstacle.pos.x + lateral_offset * parallax, obstacle.pos.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_rectangles() {
        let mut layout = Layout::new(400.0, 800.0, 1.0);
        layout.update(0.5);
        assert_eq!(layout.gameplay_width, 200.0);
        assert_eq!(layout.gameplay, Rect::new(0.0, 0.0, 200.0, 1600.0));
        assert_eq!(layout.background, Rect::new(-100.0, -400.0, 500.0, 1200.0));
        assert_eq!(layout.floating, Rect::new(-200.0, 0.0, 600.0, 800.0));
        assert_eq!(layout.game_area_offset_lateral, 100.0);
        assert_eq!(layout.controller.top, 600.0);
    }

    #[test]
    fn test_pixel_scale_shrinks_canvas() {
        let layout = Layout::new(800.0, 1600.0, 2.0);
        assert_eq!(layout.canvas, Rect::sized(400.0, 800.0));
        let clamped = Layout::new(800.0, 1600.0, 9.0);
        assert_eq!(clamped.pixel_scale, MAX_PIXEL_SCALE);
    }

    #[test]
    fn test_proportional_multiplier() {
        let layout = Layout::new(1000.0, 1000.0, 1.0);
        assert_eq!(layout.proportional_multiplier, 1.0);
        let small = Layout::new(400.0, 500.0, 1.0);
        assert!((small.proportional_multiplier - 0.4472).abs() < 1e-6);
    }

    #[test]
    fn test_background_parallax() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let bg = Obstacle::new(ObstacleKind::Background, Vec2::new(10.0, 20.0), 2.0);
        let avoid = Obstacle::new(ObstacleKind::Avoid, Vec2::new(10.0, 20.0), 2.0);
        assert_eq!(layout.display_position(&bg, 50.0), Vec2::new(20.0, 20.0));
        assert_eq!(layout.display_position(&avoid, 50.0), Vec2::new(60.0, 20.0));
    }
}
