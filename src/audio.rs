//! Sound ids, pitch tables and playback sinks
//!
//! The simulation never plays audio itself: it emits `GameEvent::PlaySound`
//! and the session hands those ids to an `AudioSink`. On the web the sink
//! synthesizes each id with Web Audio oscillators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of pitches in each ordered table
pub const SFX_TABLE_LEN: u8 = 10;

/// Pentatonic ladder, highest first (index 0 = smallest obstacle)
const PITCH_LADDER_HZ: [f32; SFX_TABLE_LEN as usize] = [
    1760.0, 1568.0, 1318.5, 1174.7, 1046.5, 880.0, 784.0, 659.3, 587.3, 523.3,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoundIdError {
    #[error("unknown sound id {0:?}")]
    Unknown(String),
}

/// A playable sound. Numbered variants are 1-based pitch steps (1 = highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SoundId {
    Twang(u8),
    Pop(u8),
    Clack(u8),
    Drop(u8),
    Chomp(u8),
    Damage,
}

impl SoundId {
    /// Pitch step, 1-based; `None` for one-off effects
    pub fn step(&self) -> Option<u8> {
        match *self {
            SoundId::Twang(n)
            | SoundId::Pop(n)
            | SoundId::Clack(n)
            | SoundId::Drop(n)
            | SoundId::Chomp(n) => Some(n),
            SoundId::Damage => None,
        }
    }

    /// Base frequency for synthesized playback
    pub fn frequency(&self) -> f32 {
        match self.step() {
            Some(n) => {
                let idx = (n.max(1) - 1).min(SFX_TABLE_LEN - 1) as usize;
                PITCH_LADDER_HZ[idx]
            }
            None => 110.0,
        }
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundId::Twang(n) => write!(f, "sfxTwang{n}"),
            SoundId::Pop(n) => write!(f, "sfxPop{n}"),
            SoundId::Clack(n) => write!(f, "sfxClack{n}"),
            SoundId::Drop(n) => write!(f, "sfxDrop{n}"),
            SoundId::Chomp(n) => write!(f, "sfxChomp{n}"),
            SoundId::Damage => f.write_str("sfxDamage"),
        }
    }
}

impl FromStr for SoundId {
    type Err = SoundIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "sfxDamage" {
            return Ok(SoundId::Damage);
        }
        let unknown = || SoundIdError::Unknown(s.to_string());
        let rest = s.strip_prefix("sfx").ok_or_else(unknown)?;
        let split = rest.find(|c: char| c.is_ascii_digit()).ok_or_else(unknown)?;
        let (name, digits) = rest.split_at(split);
        let n: u8 = digits.parse().map_err(|_| unknown())?;
        if n == 0 || n > SFX_TABLE_LEN {
            return Err(unknown());
        }
        match name {
            "Twang" => Ok(SoundId::Twang(n)),
            "Pop" => Ok(SoundId::Pop(n)),
            "Clack" => Ok(SoundId::Clack(n)),
            "Drop" => Ok(SoundId::Drop(n)),
            "Chomp" => Ok(SoundId::Chomp(n)),
            _ => Err(unknown()),
        }
    }
}

impl TryFrom<String> for SoundId {
    type Error = SoundIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SoundId> for String {
    fn from(id: SoundId) -> Self {
        id.to_string()
    }
}

/// Ordered pitch table a COLLECT group draws its sounds from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SfxTable {
    Twang,
    Pop,
    Clack,
    Drop,
    Chomp,
}

impl SfxTable {
    /// Sound at a 0-based bucket, clamped to the table
    pub fn at(self, index: usize) -> SoundId {
        let n = (index.min(SFX_TABLE_LEN as usize - 1) + 1) as u8;
        match self {
            SfxTable::Twang => SoundId::Twang(n),
            SfxTable::Pop => SoundId::Pop(n),
            SfxTable::Clack => SoundId::Clack(n),
            SfxTable::Drop => SoundId::Drop(n),
            SfxTable::Chomp => SoundId::Chomp(n),
        }
    }

    pub fn len(self) -> usize {
        SFX_TABLE_LEN as usize
    }

    /// All ids, highest pitch first
    pub fn ordered(self) -> Vec<SoundId> {
        (0..self.len()).map(|i| self.at(i)).collect()
    }
}

/// Something that can play sounds by id
pub trait AudioSink {
    fn play(&mut self, id: SoundId);
}

/// Discards everything (headless runs, muted sessions)
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _id: SoundId) {}
}

/// Keeps every id it was asked to play
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub played: Vec<SoundId>,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, id: SoundId) {
        self.played.push(id);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundId};

    /// Web Audio synthesizer
    pub struct WebAudioSink {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for WebAudioSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioSink {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.3,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// One enveloped tone; `glide_to` bends the pitch over the decay
        fn tone(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType, decay: f64, glide_to: Option<f32>) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(self.volume, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + decay).ok();
            if let Some(end) = glide_to {
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency().exponential_ramp_to_value_at_time(end, t + decay).ok();
            }
            osc.start().ok();
            osc.stop_with_when(t + decay + 0.05).ok();
        }
    }

    impl AudioSink for WebAudioSink {
        fn play(&mut self, id: SoundId) {
            if self.muted || self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let freq = id.frequency();
            match id {
                SoundId::Twang(_) => self.tone(ctx, freq, OscillatorType::Triangle, 0.35, Some(freq * 0.98)),
                SoundId::Pop(_) => self.tone(ctx, freq, OscillatorType::Sine, 0.08, Some(freq * 1.5)),
                SoundId::Clack(_) => self.tone(ctx, freq, OscillatorType::Square, 0.05, None),
                SoundId::Drop(_) => self.tone(ctx, freq, OscillatorType::Sine, 0.2, Some(freq * 0.5)),
                SoundId::Chomp(_) => self.tone(ctx, freq / 2.0, OscillatorType::Sawtooth, 0.1, Some(freq / 4.0)),
                SoundId::Damage => self.tone(ctx, freq, OscillatorType::Sawtooth, 0.3, Some(40.0)),
            }
        }
    }
}
