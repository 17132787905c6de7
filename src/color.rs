//! Hex/RGBA colors
//!
//! Level data authors colors as `"#rrggbb"` strings. Transitions need them as
//! separate channels so they can be stepped linearly, frame by frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
}

/// A color with floating point channels (0-255 for rgb, 0-1 for alpha)
///
/// Channels are kept unrounded so a fade can accumulate fractional steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32,
            g: g as f32,
            b: b as f32,
            a: 1.0,
        }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(hex.to_string());
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#rrggbb`, channels rounded and clamped
    pub fn to_hex(&self) -> String {
        let ch = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        format!("#{:02x}{:02x}{:02x}", ch(self.r), ch(self.g), ch(self.b))
    }

    /// Per-channel step that takes `self` to `target` in `frames` additions
    pub fn fade_step(&self, target: &Rgba, frames: u32) -> Rgba {
        let n = frames.max(1) as f32;
        Rgba {
            r: (target.r - self.r) / n,
            g: (target.g - self.g) / n,
            b: (target.b - self.b) / n,
            a: (target.a - self.a) / n,
        }
    }

    pub fn add_step(&self, step: &Rgba) -> Rgba {
        Rgba {
            r: self.r + step.r,
            g: self.g + step.g,
            b: self.b + step.b,
            a: self.a + step.a,
        }
    }

    /// CSS `rgba(...)` string, for canvas fills
    pub fn to_css(&self, opacity: f32) -> String {
        let ch = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        format!(
            "rgba({}, {}, {}, {})",
            ch(self.r),
            ch(self.g),
            ch(self.b),
            (self.a * opacity).clamp(0.0, 1.0)
        )
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_long_and_short_hex() {
        let c = Rgba::from_hex("#ff4400").unwrap();
        assert_eq!((c.r, c.g, c.b), (255.0, 68.0, 0.0));
        assert_eq!(Rgba::from_hex("#f40").unwrap(), c);
        assert_eq!(Rgba::from_hex("ff4400").unwrap(), c);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgba::from_hex("#ff44").is_err());
        assert!(Rgba::from_hex("#gg0000").is_err());
        assert!(Rgba::from_hex("").is_err());
    }

    #[test]
    fn test_fade_reaches_target() {
        let from = Rgba::from_hex("#000000").unwrap();
        let to = Rgba::from_hex("#ddddff").unwrap();
        let step = from.fade_step(&to, 4);
        let mut c = from;
        for _ in 0..4 {
            c = c.add_step(&step);
        }
        assert_eq!(c.to_hex(), "#ddddff");
    }

    #[test]
    fn test_deserialize_from_json_string() {
        let c: Rgba = serde_json::from_str("\"#16c1c4\"").unwrap();
        assert_eq!(c.to_hex(), "#16c1c4");
        assert!(serde_json::from_str::<Rgba>("\"teal\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_hex_survives_parse(r: u8, g: u8, b: u8) {
            let hex = format!("#{:02x}{:02x}{:02x}", r, g, b);
            prop_assert_eq!(Rgba::from_hex(&hex).unwrap().to_hex(), hex);
        }
    }
}
