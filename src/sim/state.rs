//! Game state and session-level types
//!
//! Everything the per-frame update touches lives in `GameState`. It is
//! created once per session and handed to the tick functions by reference.

use serde::{Deserialize, Serialize};

use super::controller::Controller;
use super::player::Player;
use super::store::ObstacleStore;
use super::timers::Timers;
use super::transition::LevelTransition;
use crate::audio::SoundId;
use crate::color::Rgba;
use crate::layout::Layout;
use crate::level::{Level, LevelCatalog, LevelData, LevelError};
use crate::sim::obstacle::ObstacleKind;

/// Why a run ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    HealthDepleted,
    TimesUp,
}

/// Where the session is in the level life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for a tap
    FrontPage,
    /// Level name and tip showing; obstacles scroll in, clock not running
    LevelIntro,
    /// Clock running
    Playing,
    /// Level cleared, fading into the next one
    LevelOutro,
    GameOver(GameOverReason),
    /// Every level cleared
    Complete,
}

/// Things the host may want to react to (sound, HUD, logging)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlaySound(SoundId),
    PlayerDamaged { health: u32 },
    CollectableEaten { remaining: u32 },
    LevelStarted { index: usize, id: String },
    LevelCompleted { index: usize, score: u64 },
    TextFadeOut,
    GameOver(GameOverReason),
    GameComplete { score: u64 },
}

/// Display colors the transition engine fades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub bg_color: Rgba,
    pub bg_fade_alpha: f32,
    pub text_color: Rgba,
    pub text_color_highlight: Rgba,
    pub text_color_shadow: Rgba,
    pub is_dark: bool,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg_color: Rgba::BLACK,
            bg_fade_alpha: 0.5,
            text_color: Rgba::WHITE,
            text_color_highlight: Rgba::WHITE,
            text_color_shadow: Rgba::BLACK,
            is_dark: true,
        }
    }
}

impl Palette {
    pub fn from_level(level: &LevelData) -> Self {
        Self {
            bg_color: level.bg_color,
            bg_fade_alpha: level.bg_fade_alpha,
            text_color: level.text_color,
            text_color_highlight: level.text_color_highlight.unwrap_or(Rgba::WHITE),
            text_color_shadow: level.text_color_shadow.unwrap_or(Rgba::BLACK),
            is_dark: level.is_dark,
        }
    }
}

/// Authored obstacle totals for the current level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleTotals {
    pub collect: u32,
    pub avoid: u32,
    pub background: u32,
    pub floating: u32,
}

impl ObstacleTotals {
    pub fn from_level(level: &LevelData) -> Self {
        Self {
            collect: level.total_of(ObstacleKind::Collect),
            avoid: level.total_of(ObstacleKind::Avoid),
            background: level.total_of(ObstacleKind::Background),
            floating: level.total_of(ObstacleKind::Floating),
        }
    }
}

/// Overlay text opacity, faded in and out over a number of frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFade {
    pub opacity: f32,
    step: f32,
}

impl TextFade {
    pub fn fade_in(&mut self, frames: u32) {
        self.step = (1.0 - self.opacity) / frames.max(1) as f32;
    }

    pub fn fade_out(&mut self, frames: u32) {
        self.step = -self.opacity / frames.max(1) as f32;
    }

    pub fn update(&mut self, frames: u32) {
        if self.step == 0.0 {
            return;
        }
        self.opacity = (self.opacity + self.step * frames as f32).clamp(0.0, 1.0);
        if self.opacity == 0.0 || self.opacity == 1.0 {
            self.step = 0.0;
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub catalog: LevelCatalog,
    pub layout: Layout,
    pub level_index: usize,
    /// Level picked from the settings; its intro waits for a tap
    pub skip_to: Option<usize>,
    pub levels_completed: usize,
    pub phase: GamePhase,
    pub store: ObstacleStore,
    pub player: Player,
    pub controller: Controller,
    pub palette: Palette,
    pub timers: Timers,
    pub transition: LevelTransition,
    pub totals: ObstacleTotals,
    pub collectable_remaining: u32,
    pub score: u64,
    pub time_allowed: i64,
    pub time_remaining: i64,
    pub time_is_low: bool,
    /// Host timestamp (ms) when the level clock started
    pub play_started_ms: f64,
    pub awaiting_tap: bool,
    pub text: TextFade,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(catalog: LevelCatalog, layout: Layout, seed: u64) -> Self {
        let controller = Controller::new(&layout);
        Self {
            catalog,
            layout,
            level_index: 0,
            skip_to: None,
            levels_completed: 0,
            phase: GamePhase::FrontPage,
            store: ObstacleStore::new(seed),
            player: Player::default(),
            controller,
            palette: Palette::default(),
            timers: Timers::new(),
            transition: LevelTransition::new(),
            totals: ObstacleTotals::default(),
            collectable_remaining: 0,
            score: 0,
            time_allowed: 0,
            time_remaining: 0,
            time_is_low: false,
            play_started_ms: 0.0,
            awaiting_tap: false,
            text: TextFade::default(),
            events: Vec::new(),
        }
    }

    pub fn current_level(&self) -> Result<&Level, LevelError> {
        self.catalog.level(self.level_index)
    }

    pub fn is_front_page(&self) -> bool {
        self.level_index == 0
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
