//! Pipe Dream - a top-down tube-runner arcade game
//!
//! Core modules:
//! - `sim`: Frame-paced simulation (obstacles, collisions, level transitions)
//! - `level`: Data-driven level definitions
//! - `layout`: Viewport rectangles and proportional sizing
//! - `color`: Hex/RGBA colors used by levels and transitions
//! - `audio`: Sound ids, pitch tables and playback sinks
//! - `settings`: URL hash parameters
//! - `session`: Repaint-driven game session

pub mod audio;
pub mod color;
pub mod layout;
pub mod level;
pub mod session;
pub mod settings;
pub mod sim;

pub use color::Rgba;
pub use layout::Layout;
pub use level::{LevelCatalog, LevelError};
pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Frame rate the simulation is tuned for
    pub const TARGET_FPS: u32 = 60;
    /// Wall-clock budget of one simulation frame
    pub const FRAME_BUDGET_MS: f64 = 1000.0 / TARGET_FPS as f64;
    /// Rolling FPS average window (readings)
    pub const FPS_WINDOW: usize = TARGET_FPS as usize * 7;

    /// Smallest speed an obstacle may have ("static" obstacles still move by this)
    pub const STATIC_OBSTACLE_SPEED: f32 = f32::MIN_POSITIVE;
    /// Added to authored direction ranges so 0 degrees points along the tube
    pub const DIRECTION_OFFSET_DEGREES: f32 = 90.0;

    /// Explosion (retirement) animation
    pub const EXPLODING_FRAMES_TOTAL: u32 = 50;
    pub const EXPLODING_ANGLE_INCREASE_MIN: f32 = 0.05;
    pub const EXPLODING_ANGLE_INCREASE_MAX: f32 = 0.15;
    pub const EXPLODING_SPEED_MULTIPLIER_MIN: f32 = 0.7;
    pub const EXPLODING_SPEED_MULTIPLIER_MAX: f32 = 0.9;
    pub const EXPLODING_RADIUS_MULTIPLIER_MIN: f32 = 0.7;
    pub const EXPLODING_RADIUS_MULTIPLIER_MAX: f32 = 0.99;

    /// Player
    pub const DAMAGE_SAFETY_SECS: f64 = 0.8;
    pub const PLAYER_EATS_SECS: f64 = 0.8;
    pub const EATEN_OBSTACLE_GROWTH: f32 = 1.33;
    pub const LOSS_OF_CONTROL_MAGNITUDE_DIVISOR: f32 = 3000.0;
    pub const LOSS_OF_CONTROL_MAX_SECS: f64 = 4.0;
    /// Distance of the player from the top of the tube (before scaling)
    pub const PLAYER_ORIGIN_LONGITUDINAL: f32 = 230.0;

    /// Controller defaults (levels may override)
    pub const CONTROLLER_SPEED_DAMP: f32 = 30.0;
    pub const CONTROLLER_SLIPPERINESS: f32 = 6.0;
    /// Fraction of the canvas height used by the virtual joystick
    pub const CONTROLLER_HEIGHT_RATIO: f32 = 0.25;

    /// Scoring and timing
    pub const TIME_LOW_SECONDS: i64 = 10;
    pub const SCORE_PER_SEC_REMAINING: f64 = 10.0;
    pub const SCORE_PER_LEVEL_MULTIPLIER: f64 = 1.1;

    /// Layout
    pub const SCALING_TARGET_SIZE: f32 = 1000.0;
    pub const MAX_PIXEL_SCALE: f32 = 2.0;
    pub const BACKGROUND_LATERAL_MULTIPLIER: f32 = 0.2;
    pub const FLOATING_LATERAL_MULTIPLIER: f32 = 1.0;

    /// Level life cycle (milliseconds)
    pub const LEVEL_INTRO_ADD_OBSTACLES_MS: f64 = 3500.0;
    pub const LEVEL_INTRO_TEXT_FADEOUT_MS: f64 = 3000.0;
    pub const LEVEL_INTRO_END_MS: f64 = 6000.0;
    pub const LEVEL_OUTRO_EXPLOSIONS_MS: f64 = 3000.0;
    pub const LEVEL_OUTRO_TEXT_FADEOUT_MS: f64 = 3000.0;
    pub const LEVEL_OUTRO_END_MS: f64 = 6000.0;

    /// Overlay text fades
    pub const TEXT_FADEIN_SECS: f64 = 0.5;
    pub const TEXT_FADEOUT_SLOW_SECS: f64 = 2.0;
}

/// Unit vector pointing along `degrees` (0 = +x, 90 = +y)
#[inline]
pub fn degrees_to_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Heading of a vector in degrees, in [0, 360)
#[inline]
pub fn vector_to_degrees(vector: Vec2) -> f32 {
    true_modulo(vector.y.atan2(vector.x).to_degrees(), 360.0)
}

/// Modulo that keeps the sign of the divisor (-10 mod 360 = 350)
#[inline]
pub fn true_modulo(n: f32, m: f32) -> f32 {
    let r = ((n % m) + m) % m;
    // (-tiny % m) + m can round up to exactly m
    if r >= m { 0.0 } else { r }
}

/// Round to a fixed number of decimal places
#[inline]
pub fn round_to_places(value: f32, places: i32) -> f32 {
    let factor = 10f32.powi(places);
    (value * factor).round() / factor
}
