//! Repaint-driven game session
//!
//! Owns the frame clock and the game state. The host calls `on_repaint`
//! from its animation-frame callback and re-arms the callback whatever the
//! result; input arriving between repaints is buffered until the next one.

use glam::Vec2;

use crate::audio::AudioSink;
use crate::layout::Layout;
use crate::level::{LevelCatalog, LevelError};
use crate::settings::Settings;
use crate::sim::tick::{self, TickInput};
use crate::sim::{FrameClock, GameEvent, GameState};

pub struct Session {
    clock: FrameClock,
    state: GameState,
    input: TickInput,
    muted: bool,
}

impl Session {
    /// Session for a canvas of `width` x `height` physical pixels
    pub fn new(settings: &Settings, width: f32, height: f32, pixel_scale: f32, seed: u64) -> Result<Self, LevelError> {
        let catalog = LevelCatalog::builtin()?;
        let skip_to = match settings.start_level.as_deref() {
            Some(id) => match catalog.index_of(id) {
                Ok(index) => Some(index),
                Err(e) => {
                    log::warn!("{e}, starting at the front page");
                    None
                }
            },
            None => None,
        };

        let mut state = GameState::new(catalog, Layout::new(width, height, pixel_scale), seed);
        state.skip_to = skip_to;
        log::info!("Session created (seed {}, {} levels)", seed, state.catalog.len());

        Ok(Self {
            clock: FrameClock::new(),
            state,
            input: TickInput::default(),
            muted: settings.mute,
        })
    }

    /// Set the clock baseline and load the first level
    pub fn start(&mut self, now_ms: f64) -> Result<(), LevelError> {
        self.clock.start(now_ms);
        tick::reset_and_start_first_level(&mut self.state, &self.clock, now_ms)
    }

    /// Rebuild the layout after the canvas changed size
    pub fn resize(&mut self, width: f32, height: f32, pixel_scale: f32) -> Result<(), LevelError> {
        let ratio = self.state.current_level()?.data.gameplay_area_to_canvas_lateral_ratio;
        let mut layout = Layout::new(width, height, pixel_scale);
        layout.update(ratio);

        let state = &mut self.state;
        state.layout = layout;
        state.controller.update_layout(&state.layout);
        state.player.update_sizes(&state.layout);
        Ok(())
    }

    /// Pointer position in canvas (simulation) pixels
    pub fn set_pointer(&mut self, pos: Vec2) {
        self.input.pointer = Some(pos);
    }

    pub fn tap(&mut self) {
        self.input.tap = true;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Handle one repaint, returning the number of frames simulated
    pub fn on_repaint(&mut self, timestamp_ms: f64) -> Result<u32, LevelError> {
        let frames = self.clock.tick(timestamp_ms);
        let input = std::mem::take(&mut self.input);
        tick::tick(&mut self.state, &input, frames, &self.clock, timestamp_ms)?;
        Ok(frames)
    }

    /// Hand queued events to the host, playing sounds through `sink`
    pub fn drain_events(&mut self, sink: &mut dyn AudioSink) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        if !self.muted {
            for event in &events {
                if let GameEvent::PlaySound(id) = event {
                    sink.play(*id);
                }
            }
        }
        events
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullSink, RecordingSink, SoundId};
    use crate::sim::GamePhase;

    fn session(hash: &str) -> Session {
        Session::new(&Settings::from_hash(hash), 400.0, 800.0, 1.0, 5).unwrap()
    }

    #[test]
    fn test_starts_on_front_page() {
        let mut s = session("");
        s.start(0.0).unwrap();
        assert_eq!(s.state().phase, GamePhase::FrontPage);
    }

    #[test]
    fn test_level_setting_skips_front_page() {
        let mut s = session("#level=tooez");
        s.start(0.0).unwrap();
        assert_eq!(s.state().level_index, 2);
        assert_eq!(s.state().phase, GamePhase::LevelIntro);
        assert!(s.state().awaiting_tap);
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let mut s = session("#level=nope");
        s.start(0.0).unwrap();
        assert_eq!(s.state().level_index, 0);
    }

    #[test]
    fn test_repaints_drive_frames() {
        let mut s = session("");
        s.start(0.0).unwrap();
        assert_eq!(s.on_repaint(10.0).unwrap(), 0);
        assert_eq!(s.on_repaint(1000.0 / 60.0).unwrap(), 1);
        assert_eq!(s.on_repaint(1000.0 / 60.0 * 4.0).unwrap(), 3);
        assert_eq!(s.clock().frame_count(), 4);
    }

    #[test]
    fn test_tap_is_consumed_once() {
        let mut s = session("");
        s.start(0.0).unwrap();
        s.tap();
        s.on_repaint(20.0).unwrap();
        assert_eq!(s.state().phase, GamePhase::LevelIntro);
        let index = s.state().level_index;
        s.on_repaint(40.0).unwrap();
        assert_eq!(s.state().level_index, index);
    }

    #[test]
    fn test_muted_session_plays_nothing() {
        let mut s = session("#mute");
        s.state.emit(GameEvent::PlaySound(SoundId::Pop(3)));
        let mut sink = RecordingSink::default();
        let events = s.drain_events(&mut sink);
        assert_eq!(events.len(), 1);
        assert!(sink.played.is_empty());

        s.set_muted(false);
        s.state.emit(GameEvent::PlaySound(SoundId::Pop(3)));
        s.drain_events(&mut sink);
        assert_eq!(sink.played, vec![SoundId::Pop(3)]);
        assert!(s.drain_events(&mut NullSink).is_empty());
    }

    #[test]
    fn test_resize_keeps_level_ratio() {
        let mut s = session("#level=basic");
        s.start(0.0).unwrap();
        s.resize(800.0, 1000.0, 1.0).unwrap();
        let layout = &s.state().layout;
        assert_eq!(layout.canvas.width(), 800.0);
        assert!((layout.gameplay_width - 800.0 * 0.7).abs() < 1e-3);
    }
}
