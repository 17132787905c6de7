//! Circle overlap and elastic bounce
//!
//! The player and every obstacle are circles. Mass is taken to be the radius,
//! which is all the precision an arcade knockback needs.

use glam::Vec2;

use super::obstacle::Obstacle;
use crate::consts::STATIC_OBSTACLE_SPEED;

/// Strict overlap test on squared distance (touching is not a hit)
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let combined = radius_a + radius_b;
    a.distance_squared(b) < combined * combined
}

/// Post-collision velocities of two circles
///
/// Velocities are split along the line between the centers. Tangential parts
/// pass through; normal parts go through the 1D elastic formula. Coincident
/// centers fall back to a vertical normal.
pub fn elastic_bounce(p1: Vec2, v1: Vec2, m1: f32, p2: Vec2, v2: Vec2, m2: f32) -> (Vec2, Vec2) {
    let total_mass = m1 + m2;
    if total_mass <= 0.0 || !total_mass.is_finite() {
        return (v1, v2);
    }

    let normal = (p2 - p1).try_normalize().unwrap_or(Vec2::Y);
    let tangent = normal.perp();

    let v1n = normal.dot(v1);
    let v1t = tangent.dot(v1);
    let v2n = normal.dot(v2);
    let v2t = tangent.dot(v2);

    let v1n_after = (v1n * (m1 - m2) + 2.0 * m2 * v2n) / total_mass;
    let v2n_after = (v2n * (m2 - m1) + 2.0 * m1 * v1n) / total_mass;

    (
        normal * v1n_after + tangent * v1t,
        normal * v2n_after + tangent * v2t,
    )
}

/// Bounce an obstacle off the player, returning the player's knockback
///
/// The obstacle is stepped back one frame along its old velocity and takes
/// its new heading and speed. The knockback is the player's post-collision
/// velocity scaled by its own magnitude; it's fed to the controller rather
/// than applied as motion.
pub fn bounce_off_player(obstacle: &mut Obstacle, player_pos: Vec2, player_velocity: Vec2, player_mass: f32) -> Vec2 {
    let (player_after, obstacle_after) = elastic_bounce(
        player_pos,
        player_velocity,
        player_mass,
        obstacle.pos,
        obstacle.velocity(),
        obstacle.radius,
    );

    obstacle.pos -= obstacle.velocity();
    obstacle.vector = obstacle_after.try_normalize().unwrap_or(obstacle.vector);
    obstacle.speed = obstacle_after.length().max(STATIC_OBSTACLE_SPEED);

    player_after * player_after.length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::ObstacleKind;
    use proptest::prelude::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_equal_masses_swap_head_on() {
        let (a, b) = elastic_bounce(
            Vec2::ZERO,
            Vec2::new(2.0, 0.0),
            10.0,
            Vec2::new(5.0, 0.0),
            Vec2::new(-1.0, 0.0),
            10.0,
        );
        assert!(approx(a, Vec2::new(-1.0, 0.0)));
        assert!(approx(b, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_tangential_component_unchanged() {
        // Normal is +x; the y parts are tangential
        let (a, b) = elastic_bounce(
            Vec2::ZERO,
            Vec2::new(0.0, 3.0),
            10.0,
            Vec2::new(5.0, 0.0),
            Vec2::new(-2.0, -1.0),
            30.0,
        );
        assert!((a.y - 3.0).abs() < 1e-5);
        assert!((b.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_centers_do_not_nan() {
        let (a, b) = elastic_bounce(Vec2::ONE, Vec2::X, 1.0, Vec2::ONE, -Vec2::X, 1.0);
        assert!(a.is_finite() && b.is_finite());
    }

    #[test]
    fn test_bounce_off_player_steps_obstacle_back() {
        let mut obstacle = Obstacle::new(ObstacleKind::Avoid, Vec2::new(0.0, 20.0), 10.0)
            .with_velocity(Vec2::new(0.0, -1.0), 3.0);
        let knockback = bounce_off_player(&mut obstacle, Vec2::ZERO, Vec2::ZERO, 10.0);

        assert_eq!(obstacle.pos, Vec2::new(0.0, 23.0));
        // Equal masses: the obstacle stops dead and the player takes it all
        assert!(obstacle.speed < 1e-4);
        assert!(approx(knockback, Vec2::new(0.0, -9.0)));
    }

    #[test]
    fn test_heavy_obstacle_keeps_going() {
        let mut obstacle = Obstacle::new(ObstacleKind::Avoid, Vec2::new(0.0, 20.0), 90.0)
            .with_velocity(Vec2::new(0.0, -1.0), 2.0);
        bounce_off_player(&mut obstacle, Vec2::ZERO, Vec2::ZERO, 10.0);
        assert!(obstacle.vector.y < 0.0);
        assert!((obstacle.speed - 1.6).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_normal_momentum_conserved(
            r1 in 1.0f32..100.0, r2 in 1.0f32..100.0,
            v1x in -10.0f32..10.0, v1y in -10.0f32..10.0,
            v2x in -10.0f32..10.0, v2y in -10.0f32..10.0,
            px in -50.0f32..50.0, py in -50.0f32..50.0,
        ) {
            let p1 = Vec2::ZERO;
            let p2 = Vec2::new(px, py);
            prop_assume!(p2.length() > 0.01);
            let (v1, v2) = (Vec2::new(v1x, v1y), Vec2::new(v2x, v2y));
            let (a, b) = elastic_bounce(p1, v1, r1, p2, v2, r2);

            let n = p2.normalize();
            let before = r1 * n.dot(v1) + r2 * n.dot(v2);
            let after = r1 * n.dot(a) + r2 * n.dot(b);
            prop_assert!((before - after).abs() <= 1e-3 * (1.0 + before.abs()));

            let t = n.perp();
            prop_assert!((t.dot(a) - t.dot(v1)).abs() < 1e-3);
            prop_assert!((t.dot(b) - t.dot(v2)).abs() < 1e-3);
        }
    }
}
