//! Frame-paced simulation
//!
//! Everything gameplay lives here: the frame clock, obstacles and the
//! player, collisions, timers and the level life cycle. Nothing in this
//! module draws or plays sound; it emits `GameEvent`s instead.

pub mod clock;
pub mod collision;
pub mod controller;
pub mod obstacle;
pub mod player;
pub mod random;
pub mod rect;
pub mod state;
pub mod step;
pub mod store;
pub mod tick;
pub mod timers;
pub mod transition;

pub use clock::FrameClock;
pub use collision::{bounce_off_player, circles_overlap, elastic_bounce};
pub use controller::Controller;
pub use obstacle::{ExplosionParams, Obstacle, ObstacleKind, Subtype};
pub use player::Player;
pub use rect::Rect;
pub use state::{GameEvent, GameOverReason, GamePhase, GameState, ObstacleTotals, Palette, TextFade};
pub use store::{ObstacleCounts, ObstacleStore};
pub use tick::{TickInput, tick};
pub use timers::{TimerId, Timers};
pub use transition::{LevelTransition, TransitionTargets};
