//! Per-frame obstacle stepping
//!
//! Wrap, bounce, integrate and animate every live obstacle. Runs before
//! collision checks so hits always see post-move positions.

use super::obstacle::{Obstacle, ObstacleKind};
use super::rect::Rect;
use super::store::ObstacleStore;
use crate::consts::STATIC_OBSTACLE_SPEED;
use crate::layout::Layout;
use crate::{degrees_to_vector, true_modulo, vector_to_degrees};

/// Move an obstacle that has left `rect` to the opposite side
///
/// An edge only counts once the body is a full diameter past it and still
/// heading away. AVOID obstacles skip the heading check since a bounce can
/// leave them drifting backwards over an edge. Returns whether it wrapped.
pub fn wrap_around_rect(obstacle: &mut Obstacle, rect: &Rect) -> bool {
    let diameter = obstacle.diameter();
    let any_direction = obstacle.kind == ObstacleKind::Avoid;
    let wrap_width = rect.width() + diameter * 2.0;
    let wrap_height = rect.height() + diameter * 2.0;
    let mut wrapped = false;

    if obstacle.kind.wraps_laterally() {
        if obstacle.pos.x + diameter < rect.left && (obstacle.vector.x < 0.0 || any_direction) {
            obstacle.pos.x += wrap_width;
            wrapped = true;
        } else if obstacle.pos.x - diameter > rect.right && (obstacle.vector.x > 0.0 || any_direction) {
            obstacle.pos.x -= wrap_width;
            wrapped = true;
        }
    }

    if obstacle.pos.y + diameter < rect.top && (obstacle.vector.y < 0.0 || any_direction) {
        obstacle.pos.y += wrap_height;
        wrapped = true;
    } else if obstacle.pos.y - diameter > rect.bottom && (obstacle.vector.y > 0.0 || any_direction) {
        obstacle.pos.y -= wrap_height;
        wrapped = true;
    }

    if wrapped {
        // A half-exploded body shouldn't reappear on the other side
        if obstacle.is_exploding() {
            obstacle.is_deleted = true;
        }
        obstacle.rotation = vector_to_degrees(obstacle.vector);
    }
    wrapped
}

/// Reflect off the left/right edges of `rect`. Returns whether it bounced.
pub fn bounce_in_rect(obstacle: &mut Obstacle, rect: &Rect) -> bool {
    let bounced = if obstacle.pos.x < rect.left + obstacle.radius {
        obstacle.pos.x = rect.left + obstacle.radius;
        true
    } else if obstacle.pos.x > rect.right - obstacle.radius {
        obstacle.pos.x = rect.right - obstacle.radius;
        true
    } else {
        false
    };
    if bounced {
        obstacle.vector.x = -obstacle.vector.x;
        obstacle.rotation = vector_to_degrees(obstacle.vector);
    }
    bounced
}

/// One frame of the explosion animation: spin, shrink, slow down
pub fn increment_explosion(obstacle: &mut Obstacle) {
    if obstacle.exploding_frames_counter == 0 {
        return;
    }
    obstacle.exploding_frames_counter -= 1;

    let heading = vector_to_degrees(obstacle.vector) + obstacle.explosion.angle_increase;
    obstacle.vector = degrees_to_vector(heading);
    obstacle.radius *= obstacle.explosion.radius_multiplier;
    obstacle.speed = (obstacle.speed * obstacle.explosion.speed_multiplier).max(STATIC_OBSTACLE_SPEED);

    if obstacle.exploding_frames_counter == 0 {
        obstacle.is_deleted = true;
    }
}

fn step_obstacle(obstacle: &mut Obstacle, frames: u32, layout: &Layout) {
    match obstacle.kind {
        ObstacleKind::Background | ObstacleKind::LevelIntro => {
            wrap_around_rect(obstacle, &layout.background);
        }
        ObstacleKind::Floating => {
            wrap_around_rect(obstacle, &layout.floating);
        }
        ObstacleKind::Collect | ObstacleKind::Avoid => {
            // Spawned off-screen; no wrapping until they've scrolled in
            if obstacle.has_entered_gameplay_area {
                wrap_around_rect(obstacle, &layout.gameplay);
                bounce_in_rect(obstacle, &layout.gameplay);
            } else if layout.gameplay.contains(obstacle.pos) {
                obstacle.has_entered_gameplay_area = true;
            }
        }
    }

    if obstacle.is_deleted {
        return;
    }

    obstacle.pos += obstacle.velocity() * frames as f32;

    if obstacle.rotation_speed != 0.0 {
        obstacle.rotation = true_modulo(obstacle.rotation + obstacle.rotation_speed, 360.0);
    }

    for _ in 0..frames {
        if !obstacle.is_exploding() {
            break;
        }
        increment_explosion(obstacle);
    }

    obstacle.damage_safety_counter = obstacle.damage_safety_counter.saturating_sub(frames);
}

impl ObstacleStore {
    /// Advance every obstacle by `frames` simulation frames
    ///
    /// Walks newest to oldest and sweeps deleted obstacles at the end.
    pub fn update(&mut self, frames: u32, layout: &Layout) {
        if frames == 0 {
            return;
        }
        for obstacle in self.obstacles_mut().iter_mut().rev() {
            step_obstacle(obstacle, frames, layout);
        }
        self.compact();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::EXPLODING_FRAMES_TOTAL;
    use glam::Vec2;
    use proptest::prelude::*;

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 200.0)
    }

    fn moving(kind: ObstacleKind, pos: Vec2, vector: Vec2, speed: f32) -> Obstacle {
        Obstacle::new(kind, pos, 2.0).with_velocity(vector, speed)
    }

    #[test]
    fn test_background_wraps_right_to_left() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let bounds = layout.background;
        let mut store = ObstacleStore::new(0);
        store.push(moving(
            ObstacleKind::Background,
            Vec2::new(bounds.right - 0.5, 100.0),
            Vec2::X,
            1.0,
        ));

        let mut wrapped_at = None;
        let mut last_x = bounds.right - 0.5;
        for i in 0..20 {
            store.update(1, &layout);
            let x = store.iter().next().unwrap().pos.x;
            if x < last_x {
                wrapped_at = Some(i);
                // One step after the wrap: left - diameter plus the overshoot, plus one step
                assert!(x > bounds.left - 4.0 && x < bounds.left, "x = {x}");
                let before = x;
                store.update(1, &layout);
                let after = store.iter().next().unwrap().pos.x;
                assert!((after - before - 1.0).abs() < 1e-4);
                break;
            }
            last_x = x;
        }
        assert!(wrapped_at.is_some());
    }

    #[test]
    fn test_wrap_respects_direction_of_travel() {
        let mut o = moving(ObstacleKind::Floating, Vec2::new(150.0, 50.0), Vec2::new(-1.0, 0.0), 1.0);
        assert!(!wrap_around_rect(&mut o, &rect()));
        assert_eq!(o.pos.x, 150.0);
    }

    #[test]
    fn test_avoid_wraps_regardless_of_direction() {
        let mut o = moving(ObstacleKind::Avoid, Vec2::new(50.0, -10.0), Vec2::Y, 1.0);
        assert!(wrap_around_rect(&mut o, &rect()));
        assert_eq!(o.pos.y, -10.0 + 200.0 + 8.0);
    }

    #[test]
    fn test_play_area_kinds_do_not_wrap_sideways() {
        let mut o = moving(ObstacleKind::Collect, Vec2::new(150.0, 50.0), Vec2::X, 1.0);
        assert!(!wrap_around_rect(&mut o, &rect()));
    }

    #[test]
    fn test_wrap_cancels_explosion() {
        let mut o = moving(ObstacleKind::Background, Vec2::new(50.0, 250.0), Vec2::Y, 1.0);
        o.explode();
        assert!(wrap_around_rect(&mut o, &rect()));
        assert!(o.is_deleted);
    }

    #[test]
    fn test_bounce_flips_lateral_direction() {
        let mut o = moving(ObstacleKind::Avoid, Vec2::new(99.5, 50.0), Vec2::new(1.0, 1.0), 1.0);
        assert!(bounce_in_rect(&mut o, &rect()));
        assert_eq!(o.pos.x, 98.0);
        assert!(o.vector.x < 0.0 && o.vector.y > 0.0);
    }

    #[test]
    fn test_off_screen_obstacles_enter_before_wrapping() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let mut store = ObstacleStore::new(0);
        let start = Vec2::new(100.0, layout.gameplay.bottom + 50.0);
        store.push(moving(ObstacleKind::Avoid, start, Vec2::new(0.0, -1.0), 10.0));

        store.update(1, &layout);
        let o = store.iter().next().unwrap();
        assert!(!o.has_entered_gameplay_area);
        assert_eq!(o.pos.y, start.y - 10.0);

        store.update(10, &layout);
        store.update(1, &layout);
        assert!(store.iter().next().unwrap().has_entered_gameplay_area);
    }

    #[test]
    fn test_motion_scales_with_frames() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let mut store = ObstacleStore::new(0);
        store.push(moving(ObstacleKind::Background, Vec2::new(0.0, 0.0), Vec2::Y, 2.0));
        store.update(3, &layout);
        assert!((store.iter().next().unwrap().pos.y - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_uses_true_modulo() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let mut store = ObstacleStore::new(0);
        let mut o = moving(ObstacleKind::Background, Vec2::ZERO, Vec2::X, 0.0);
        o.rotation = 1.0;
        o.rotation_speed = -3.0;
        store.push(o);
        store.update(1, &layout);
        assert_eq!(store.iter().next().unwrap().rotation, 358.0);
    }

    #[test]
    fn test_explosion_runs_to_deletion() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let mut store = ObstacleStore::new(0);
        let mut o = moving(ObstacleKind::Avoid, Vec2::new(100.0, 100.0), Vec2::Y, 1.0);
        o.has_entered_gameplay_area = true;
        o.radius = 20.0;
        o.explode();
        store.push(o);

        store.update(1, &layout);
        let o = store.iter().next().unwrap();
        assert_eq!(o.exploding_frames_counter, EXPLODING_FRAMES_TOTAL - 1);
        assert!(o.radius < 20.0);
        assert!(o.speed < 1.0);

        store.update(EXPLODING_FRAMES_TOTAL - 2, &layout);
        assert_eq!(store.len(), 1);
        store.update(1, &layout);
        assert!(store.is_empty());
    }

    #[test]
    fn test_safety_counter_counts_down_by_frames() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let mut store = ObstacleStore::new(0);
        let mut o = moving(ObstacleKind::Avoid, Vec2::new(100.0, 100.0), Vec2::Y, 0.0);
        o.damage_safety_counter = 5;
        store.push(o);
        store.update(3, &layout);
        assert_eq!(store.iter().next().unwrap().damage_safety_counter, 2);
        store.update(3, &layout);
        assert_eq!(store.iter().next().unwrap().damage_safety_counter, 0);
    }

    proptest! {
        #[test]
        fn prop_wrap_moves_by_extended_span(y in 210.5f32..1000.0) {
            let mut o = moving(ObstacleKind::Background, Vec2::new(50.0, y), Vec2::Y, 1.0);
            let diameter = o.diameter();
            prop_assume!(y - diameter > 200.0);
            prop_assert!(wrap_around_rect(&mut o, &rect()));
            prop_assert!((y - o.pos.y - (200.0 + 2.0 * diameter)).abs() < 1e-3);
        }
    }
}
