//! Axis-aligned rectangle geometry
//!
//! Screen convention: y grows downward, so `top <= bottom`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A rectangle in simulation-space pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle anchored at the origin
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Inclusive containment (points on the edge are inside)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// Shrink every edge inward by `amount`
    pub fn padded(&self, amount: f32) -> Rect {
        Rect::new(
            self.left + amount,
            self.top + amount,
            self.right - amount,
            self.bottom - amount,
        )
    }

    /// Clamp a point into the rectangle
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.max(self.left).min(self.right),
            point.y.max(self.top).min(self.bottom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let rect = Rect::sized(100.0, 50.0);
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(100.0, 50.0)));
        assert!(!rect.contains(Vec2::new(100.1, 25.0)));
        assert!(!rect.contains(Vec2::new(50.0, -0.1)));
    }

    #[test]
    fn test_padded_shrinks_each_edge() {
        let rect = Rect::new(-10.0, -20.0, 30.0, 40.0).padded(5.0);
        assert_eq!(rect, Rect::new(-5.0, -15.0, 25.0, 35.0));
        assert_eq!(rect.width(), 30.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn test_clamp_and_center() {
        let rect = Rect::sized(10.0, 10.0);
        assert_eq!(rect.clamp(Vec2::new(-3.0, 14.0)), Vec2::new(0.0, 10.0));
        assert_eq!(rect.center(), Vec2::new(5.0, 5.0));
    }
}
