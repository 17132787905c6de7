//! Session settings
//!
//! Read once at startup from the URL hash (`#mute&fps&level=basic&seed=7`).
//! Keys are case-insensitive; a bare key means `true`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// No sound at all
    pub mute: bool,
    /// Show the FPS counter
    pub show_fps: bool,
    /// Draw wrap rectangles and log more
    pub debug: bool,
    /// Level id to jump to instead of the front page
    pub start_level: Option<String>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

fn flag(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
    }
}

impl Settings {
    /// Parse a hash fragment; unknown keys and bad values are skipped
    pub fn from_hash(hash: &str) -> Self {
        let mut settings = Self::default();
        let hash = hash.trim_start_matches('#');

        for pair in hash.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (pair, None),
            };
            match key.to_ascii_lowercase().as_str() {
                "mute" => settings.mute = flag(value),
                "fps" => settings.show_fps = flag(value),
                "debug" => settings.debug = flag(value),
                "level" => settings.start_level = value.filter(|v| !v.is_empty()).map(str::to_string),
                "seed" => match value.map(str::parse::<u64>) {
                    Some(Ok(seed)) => settings.seed = Some(seed),
                    _ => log::warn!("Ignoring bad seed {:?}", value),
                },
                other => log::debug!("Unknown setting {:?}", other),
            }
        }
        settings
    }

    /// Inverse of `from_hash`, for sharing a run
    pub fn to_hash(&self) -> String {
        let mut parts = Vec::new();
        if self.mute {
            parts.push("mute".to_string());
        }
        if self.show_fps {
            parts.push("fps".to_string());
        }
        if self.debug {
            parts.push("debug".to_string());
        }
        if let Some(level) = &self.start_level {
            parts.push(format!("level={level}"));
        }
        if let Some(seed) = self.seed {
            parts.push(format!("seed={seed}"));
        }
        format!("#{}", parts.join("&"))
    }

    /// Settings from `window.location.hash`
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        let settings = Self::from_hash(&hash);
        log::info!("Settings: {:?}", settings);
        settings
    }

    /// Settings from the first command line argument
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let hash = std::env::args().nth(1).unwrap_or_default();
        Self::from_hash(&hash)
    }
}
