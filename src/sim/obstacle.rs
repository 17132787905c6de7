//! Obstacle entities
//!
//! Every moving body in the tube is an `Obstacle`. Its `kind` decides where it
//! spawns, which rectangle it wraps in and whether the player can touch it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::SoundId;
use crate::color::Rgba;
use crate::consts::*;

/// What an obstacle is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleKind {
    /// Eaten by the player to grow and clear the level
    Collect,
    /// Damages and knocks back the player
    Avoid,
    /// Decorative particles behind everything, wrap in the background rect
    Background,
    /// Decorative bodies drifting over the tube, wrap in the floating rect
    Floating,
    /// Preview shapes on the front page
    LevelIntro,
}

impl ObstacleKind {
    /// Only COLLECT and AVOID are ever checked against the player
    pub fn interacts_with_player(self) -> bool {
        matches!(self, ObstacleKind::Collect | ObstacleKind::Avoid)
    }

    /// Decorative kinds wrap across left/right edges too
    pub fn wraps_laterally(self) -> bool {
        !self.interacts_with_player()
    }
}

/// Shape variant (rendering only, apart from appendage count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subtype {
    Flower,
    Star,
    Squarcle,
    SkewedCircle,
}

impl Subtype {
    /// FLOWER/STAR draw petals/points and need an appendage count
    pub fn has_appendages(self) -> bool {
        matches!(self, Subtype::Flower | Subtype::Star)
    }
}

/// Per-obstacle randomized decay used while exploding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionParams {
    /// Degrees added to the heading each frame (negative: spins clockwise)
    pub angle_increase: f32,
    pub speed_multiplier: f32,
    pub radius_multiplier: f32,
}

impl Default for ExplosionParams {
    fn default() -> Self {
        Self {
            angle_increase: -(EXPLODING_ANGLE_INCREASE_MIN + EXPLODING_ANGLE_INCREASE_MAX) / 2.0,
            speed_multiplier: (EXPLODING_SPEED_MULTIPLIER_MIN + EXPLODING_SPEED_MULTIPLIER_MAX) / 2.0,
            radius_multiplier: (EXPLODING_RADIUS_MULTIPLIER_MIN + EXPLODING_RADIUS_MULTIPLIER_MAX)
                / 2.0,
        }
    }
}

/// A live obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub subtype: Option<Subtype>,
    pub color: Option<Rgba>,
    pub shape_center_color: Option<Rgba>,
    pub pos: Vec2,
    /// Unit direction of travel
    pub vector: Vec2,
    /// Current speed (pixels per frame); collisions may change it
    pub speed: f32,
    /// Speed at spawn
    pub native_speed: f32,
    pub radius: f32,
    /// Degrees, for drawing
    pub rotation: f32,
    /// Degrees per frame; 0 for shapes that don't spin
    pub rotation_speed: f32,
    pub num_appendages: Option<u32>,
    pub shape_center_radius_divisor: Option<f32>,
    pub explosion: ExplosionParams,
    /// > 0 while the death animation runs
    pub exploding_frames_counter: u32,
    /// > 0 while repeat hits on the player are ignored (AVOID)
    pub damage_safety_counter: u32,
    /// Set once the center is first inside the gameplay rect
    pub has_entered_gameplay_area: bool,
    /// Pitch-bucketed sound played when eaten (COLLECT)
    pub sound_id: Option<SoundId>,
    /// Sound played when the player is damaged (AVOID)
    pub damage_sfx: Option<SoundId>,
    pub is_deleted: bool,
}

impl Obstacle {
    /// A bare obstacle at rest, used as the starting point for spawning
    pub fn new(kind: ObstacleKind, pos: Vec2, radius: f32) -> Self {
        Self {
            kind,
            subtype: None,
            color: None,
            shape_center_color: None,
            pos,
            vector: Vec2::Y,
            speed: STATIC_OBSTACLE_SPEED,
            native_speed: STATIC_OBSTACLE_SPEED,
            radius,
            rotation: 0.0,
            rotation_speed: 0.0,
            num_appendages: None,
            shape_center_radius_divisor: None,
            explosion: ExplosionParams::default(),
            exploding_frames_counter: 0,
            damage_safety_counter: 0,
            has_entered_gameplay_area: false,
            sound_id: None,
            damage_sfx: None,
            is_deleted: false,
        }
    }

    /// Builder: set direction and speed together
    pub fn with_velocity(mut self, vector: Vec2, speed: f32) -> Self {
        self.vector = vector.normalize_or_zero();
        self.speed = speed.max(STATIC_OBSTACLE_SPEED);
        self.native_speed = self.speed;
        self.rotation = crate::vector_to_degrees(self.vector);
        self
    }

    #[inline]
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.vector * self.speed
    }

    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.exploding_frames_counter > 0
    }

    /// Start the death animation (no-op if already running)
    pub fn explode(&mut self) {
        if !self.is_exploding() {
            self.exploding_frames_counter = EXPLODING_FRAMES_TOTAL;
        }
    }
}
