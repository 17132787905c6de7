//! Frame clock
//!
//! Turns repaint callbacks (millisecond timestamps) into whole simulation
//! frames and keeps a rolling FPS estimate. Durations authored in seconds are
//! converted to frames with the measured rate, so effects last about as long
//! on a slow device as on a fast one.

use std::collections::VecDeque;

use crate::consts::{FPS_WINDOW, FRAME_BUDGET_MS, TARGET_FPS};

/// Tolerance so an interval of exactly one budget counts as a frame
const BUDGET_EPSILON_MS: f64 = 1e-6;
/// Longest catch-up in one tick; longer stalls are dropped (1 second)
pub const MAX_FRAMES_PER_TICK: u32 = TARGET_FPS;

#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Timestamp the next frame boundary is measured from
    frame_origin_ms: Option<f64>,
    /// Timestamp of the last tick that did work (FPS readings)
    last_work_ms: f64,
    frame_count: u64,
    /// Instantaneous FPS readings, newest first
    fps_readings: VecDeque<f64>,
    window: usize,
    current_fps: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_window(FPS_WINDOW)
    }

    /// Clock with a custom FPS averaging window
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            frame_origin_ms: None,
            last_work_ms: 0.0,
            frame_count: 0,
            fps_readings: VecDeque::with_capacity(window),
            window,
            current_fps: TARGET_FPS as f64,
        }
    }

    /// Set the baseline timestamp without doing any work
    pub fn start(&mut self, timestamp_ms: f64) {
        self.frame_origin_ms = Some(timestamp_ms);
        self.last_work_ms = timestamp_ms;
    }

    pub fn is_started(&self) -> bool {
        self.frame_origin_ms.is_some()
    }

    /// Handle one repaint callback, returning how many frames elapsed
    ///
    /// Zero means the callback came in under budget and nothing should be
    /// simulated. The caller re-arms the repaint either way.
    pub fn tick(&mut self, timestamp_ms: f64) -> u32 {
        let Some(origin) = self.frame_origin_ms else {
            self.start(timestamp_ms);
            return 0;
        };

        let elapsed = timestamp_ms - origin;
        if elapsed < 0.0 {
            // Host clock went backwards; re-base and wait for the next one
            self.start(timestamp_ms);
            return 0;
        }
        if elapsed + BUDGET_EPSILON_MS < FRAME_BUDGET_MS {
            return 0;
        }

        let mut frames = ((elapsed + BUDGET_EPSILON_MS) / FRAME_BUDGET_MS).floor() as u32;
        if frames > MAX_FRAMES_PER_TICK {
            log::debug!("Frame clock dropped {} frames after a stall", frames - MAX_FRAMES_PER_TICK);
            frames = MAX_FRAMES_PER_TICK;
        }
        // The leftover part of a frame is dropped, so the simulated rate
        // matches the FPS reading taken below
        self.frame_origin_ms = Some(timestamp_ms);
        self.frame_count += frames as u64;

        let since_work = timestamp_ms - self.last_work_ms;
        if since_work > 0.0 {
            self.update_fps_average(1000.0 / since_work);
        }
        self.last_work_ms = timestamp_ms;

        frames
    }

    /// Total frames simulated since creation (monotonic)
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Rolling average FPS, rounded
    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }

    /// Frames needed to cover `seconds` at the measured rate
    pub fn seconds_to_frames(&self, seconds: f64) -> u32 {
        (seconds * self.current_fps).ceil().max(0.0) as u32
    }

    fn update_fps_average(&mut self, reading: f64) {
        self.fps_readings.push_front(reading);
        self.fps_readings.truncate(self.window);

        let mean = self.fps_readings.iter().sum::<f64>() / self.fps_readings.len() as f64;
        self.current_fps = if mean.is_finite() && mean >= 1.0 {
            mean.round()
        } else {
            TARGET_FPS as f64
        };
    }
}
