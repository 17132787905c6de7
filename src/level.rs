//! Data-driven level definitions
//!
//! Levels are authored as JSON (camelCase keys) and embedded in the binary.
//! The first level is the front page; the rest are played in file order.
//! Bad data is an authoring bug, so the catalog validates every group up front
//! and refuses to load rather than defaulting.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::audio::{SfxTable, SoundId};
use crate::color::Rgba;
use crate::sim::obstacle::{ObstacleKind, Subtype};

const BUILTIN_LEVELS: &str = include_str!("../levels/levels.json");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to parse level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level data must be a non-empty array of levels")]
    NoLevels,
    #[error("{kind:?} group is missing required `{field}`")]
    MissingRange {
        kind: ObstacleKind,
        field: &'static str,
    },
    #[error("{kind:?} group has invalid `{field}`: {detail}")]
    InvalidRange {
        kind: ObstacleKind,
        field: &'static str,
        detail: String,
    },
    #[error("unknown level {0:?}")]
    UnknownLevel(String),
    #[error("level {level}: {source}")]
    Invalid {
        level: String,
        #[source]
        source: Box<LevelError>,
    },
    #[error("transition property `{0}` has no value and no default")]
    MissingProperty(&'static str),
}

/// Player settings for a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    pub color: Rgba,
    /// Larger divisor = slower growth per obstacle eaten
    pub growth_divisor: f32,
    pub radius: f32,
}

/// A declarative group of obstacles to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDescriptor {
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
    #[serde(default)]
    pub subtype: Option<Subtype>,
    pub total: u32,
    /// One picked per obstacle; may be empty (shape drawn with a gradient)
    #[serde(default)]
    pub colors: Vec<Rgba>,
    #[serde(default)]
    pub radius_range: Option<[f32; 2]>,
    #[serde(default)]
    pub speed_range: Option<[f32; 2]>,
    /// Degrees
    #[serde(default)]
    pub direction_range: Option<[f32; 2]>,
    /// Degrees per frame
    #[serde(default)]
    pub rotation_speed_range: Option<[f32; 2]>,
    #[serde(default)]
    pub num_appendages_range: Option<[i32; 2]>,
    #[serde(default)]
    pub shape_center_radius_divisor: Option<f32>,
    #[serde(default)]
    pub shape_center_colors: Vec<Rgba>,
    #[serde(default)]
    pub collect_sfx: Option<SfxTable>,
    #[serde(default)]
    pub damage_sfx: Option<SoundId>,
}

impl GroupDescriptor {
    /// Minimal group for tests and tooling
    pub fn new(kind: ObstacleKind, total: u32) -> Self {
        Self {
            kind,
            subtype: None,
            total,
            colors: Vec::new(),
            radius_range: None,
            speed_range: None,
            direction_range: None,
            rotation_speed_range: None,
            num_appendages_range: None,
            shape_center_radius_divisor: None,
            shape_center_colors: Vec::new(),
            collect_sfx: None,
            damage_sfx: None,
        }
    }

    fn require(&self, range: Option<[f32; 2]>, field: &'static str) -> Result<[f32; 2], LevelError> {
        let [a, b] = range.ok_or(LevelError::MissingRange {
            kind: self.kind,
            field,
        })?;
        if !a.is_finite() || !b.is_finite() {
            return Err(LevelError::InvalidRange {
                kind: self.kind,
                field,
                detail: "values must be finite".into(),
            });
        }
        Ok([a, b])
    }

    pub fn radius_range(&self) -> Result<[f32; 2], LevelError> {
        let [min, max] = self.require(self.radius_range, "radiusRange")?;
        if min <= 0.0 || max <= 0.0 {
            return Err(LevelError::InvalidRange {
                kind: self.kind,
                field: "radiusRange",
                detail: format!("radius must be positive, got [{min}, {max}]"),
            });
        }
        Ok([min, max])
    }

    pub fn speed_range(&self) -> Result<[f32; 2], LevelError> {
        self.require(self.speed_range, "speedRange")
    }

    pub fn direction_range(&self) -> Result<[f32; 2], LevelError> {
        self.require(self.direction_range, "directionRange")
    }

    /// Required for FLOWER/STAR, ignored otherwise
    pub fn num_appendages_range(&self) -> Result<Option<[i32; 2]>, LevelError> {
        match self.subtype {
            Some(sub) if sub.has_appendages() => {
                let [min, max] = self.num_appendages_range.ok_or(LevelError::MissingRange {
                    kind: self.kind,
                    field: "numAppendagesRange",
                })?;
                if min < 1 || max < min {
                    return Err(LevelError::InvalidRange {
                        kind: self.kind,
                        field: "numAppendagesRange",
                        detail: format!("need 1 <= min <= max, got [{min}, {max}]"),
                    });
                }
                Ok(Some([min, max]))
            }
            _ => Ok(None),
        }
    }

    /// Check everything `spawn` will need
    pub fn validate(&self) -> Result<(), LevelError> {
        self.radius_range()?;
        self.speed_range()?;
        self.direction_range()?;
        if let Some(range) = self.rotation_speed_range {
            self.require(Some(range), "rotationSpeedRange")?;
        }
        self.num_appendages_range()?;
        Ok(())
    }
}

fn default_fade_alpha() -> f32 {
    0.5
}

fn default_lateral_ratio() -> f32 {
    1.0
}

/// Configuration for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub id: String,
    #[serde(default)]
    pub is_dark: bool,
    pub start_health: u32,
    pub time_allowed_secs: u32,
    pub text_color: Rgba,
    #[serde(default)]
    pub text_color_highlight: Option<Rgba>,
    #[serde(default)]
    pub text_color_shadow: Option<Rgba>,
    pub bg_color: Rgba,
    #[serde(default = "default_fade_alpha")]
    pub bg_fade_alpha: f32,
    /// Width of the play area between the pipe walls, relative to the canvas
    #[serde(default = "default_lateral_ratio")]
    pub gameplay_area_to_canvas_lateral_ratio: f32,
    #[serde(default)]
    pub controller_speed_damp: Option<f32>,
    #[serde(default)]
    pub controller_slipperiness: Option<f32>,
    #[serde(default)]
    pub tip: Option<String>,
    pub player: PlayerConfig,
    pub obstacles: Vec<GroupDescriptor>,
}

impl LevelData {
    /// Groups of one kind, in authored order
    pub fn groups(&self, kind: ObstacleKind) -> impl Iterator<Item = &GroupDescriptor> {
        self.obstacles.iter().filter(move |g| g.kind == kind)
    }

    /// Sum of `total` over groups of one kind
    pub fn total_of(&self, kind: ObstacleKind) -> u32 {
        self.groups(kind).map(|g| g.total).sum()
    }
}

/// A parsed level plus the raw JSON it came from
///
/// Transitions look properties up by dotted path in `raw`.
#[derive(Debug, Clone)]
pub struct Level {
    pub data: LevelData,
    pub raw: Value,
}

impl Level {
    pub fn from_value(raw: Value) -> Result<Self, LevelError> {
        let data: LevelData = serde_json::from_value(raw.clone())?;
        for group in &data.obstacles {
            group.validate().map_err(|e| LevelError::Invalid {
                level: data.id.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(Self { data, raw })
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }
}

/// Walk a dot-separated path (`"player.radius"`) through nested JSON objects
pub fn get_nested_property_value<'a>(object: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(object, |value, key| value.get(key))
}

/// All levels in play order
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Levels shipped with the game
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let raw: Value = serde_json::from_str(json)?;
        let Value::Array(items) = raw else {
            return Err(LevelError::NoLevels);
        };
        let levels = items
            .into_iter()
            .map(Level::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        if levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        log::debug!("Loaded {} levels", levels.len());
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn level(&self, index: usize) -> Result<&Level, LevelError> {
        self.get(index)
            .ok_or_else(|| LevelError::UnknownLevel(format!("#{index}")))
    }

    /// Case-insensitive lookup by id
    pub fn index_of(&self, id: &str) -> Result<usize, LevelError> {
        self.levels
            .iter()
            .position(|l| l.id().eq_ignore_ascii_case(id))
            .ok_or_else(|| LevelError::UnknownLevel(id.to_string()))
    }

    /// Level after `index`; the last one wraps to the first playable level
    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 >= self.levels.len() {
            1.min(self.levels.len() - 1)
        } else {
            index + 1
        }
    }

    /// Levels a full run must complete (everything except the front page)
    pub fn playable_count(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn level_json(id: &str, groups: Value) -> Value {
        json!({
            "id": id,
            "startHealth": 10,
            "timeAllowedSecs": 60,
            "textColor": "#ffffff",
            "bgColor": "#000000",
            "player": { "color": "#ffffff", "growthDivisor": 100, "radius": 15 },
            "obstacles": groups,
        })
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert!(catalog.len() >= 3);
        assert_eq!(catalog.get(0).unwrap().id(), "INTRO");
        assert_eq!(catalog.index_of("basic").unwrap(), 1);
    }

    #[test]
    fn test_missing_range_fails_fast() {
        let raw = level_json(
            "BAD",
            json!([{ "type": "AVOID", "total": 3, "radiusRange": [10, 20], "directionRange": [0, 10] }]),
        );
        let err = Level::from_value(raw).unwrap_err();
        match err {
            LevelError::Invalid { level, source } => {
                assert_eq!(level, "BAD");
                assert!(matches!(*source, LevelError::MissingRange { field: "speedRange", .. }));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_flower_needs_appendages() {
        let raw = level_json(
            "PETAL",
            json!([{
                "type": "COLLECT", "subtype": "FLOWER", "total": 1,
                "radiusRange": [10, 20], "speedRange": [1, 2], "directionRange": [0, 10]
            }]),
        );
        assert!(Level::from_value(raw).is_err());
    }

    #[test]
    fn test_bad_color_is_parse_error() {
        let mut raw = level_json("C", json!([]));
        raw["bgColor"] = json!("black");
        assert!(matches!(Level::from_value(raw), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_nested_property_lookup() {
        let raw = level_json("N", json!([]));
        assert_eq!(get_nested_property_value(&raw, "player.radius"), Some(&json!(15)));
        assert_eq!(get_nested_property_value(&raw, "bgColor"), Some(&json!("#000000")));
        assert_eq!(get_nested_property_value(&raw, "player.hat"), None);
        assert_eq!(get_nested_property_value(&raw, "textColor.deeper"), None);
    }

    #[test]
    fn test_next_index_wraps_past_front_page() {
        let json = Value::Array(vec![
            level_json("A", json!([])),
            level_json("B", json!([])),
            level_json("C", json!([])),
        ]);
        let catalog = LevelCatalog::from_json(&json.to_string()).unwrap();
        assert_eq!(catalog.next_index(0), 1);
        assert_eq!(catalog.next_index(1), 2);
        assert_eq!(catalog.next_index(2), 1);
        assert_eq!(catalog.playable_count(), 2);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(LevelCatalog::from_json("[]"), Err(LevelError::NoLevels)));
        assert!(matches!(LevelCatalog::from_json("{}"), Err(LevelError::NoLevels)));
    }

    #[test]
    fn test_group_totals() {
        let catalog = LevelCatalog::builtin().unwrap();
        let basic = &catalog.get(1).unwrap().data;
        assert_eq!(basic.total_of(ObstacleKind::Collect), 66);
        assert_eq!(basic.total_of(ObstacleKind::Avoid), 3);
    }
}
