//! Level transition engine
//!
//! During a level outro, colors and tuning values fade from the finished
//! level to the next one over a fixed number of frames. At the same time the
//! remaining AVOID obstacles are exploded one by one and the background
//! thins out.
//!
//! The set of fading values is a static table: each entry names a dotted
//! path into the level JSON and a typed setter on the live objects.

use serde_json::Value;

use super::clock::FrameClock;
use super::controller::Controller;
use super::player::Player;
use super::state::Palette;
use super::store::ObstacleStore;
use crate::color::Rgba;
use crate::consts::{
    CONTROLLER_SLIPPERINESS, CONTROLLER_SPEED_DAMP, LEVEL_OUTRO_END_MS, LEVEL_OUTRO_EXPLOSIONS_MS,
};
use crate::level::{LevelError, get_nested_property_value};

/// Live objects a transition writes to
pub struct TransitionTargets<'a> {
    pub palette: &'a mut Palette,
    pub player: &'a mut Player,
    pub controller: &'a mut Controller,
}

type ColorSetter = fn(&mut TransitionTargets<'_>, Rgba);
type NumberGetter = fn(&TransitionTargets<'_>) -> f32;
type NumberSetter = fn(&mut TransitionTargets<'_>, f32);

enum Binding {
    Color {
        default: Option<Rgba>,
        write: ColorSetter,
    },
    Number {
        default: Option<f32>,
        /// Read the start value from the live object instead of the level
        live: Option<NumberGetter>,
        write: NumberSetter,
    },
}

struct TransitionProperty {
    path: &'static str,
    binding: Binding,
}

static PROPERTIES: &[TransitionProperty] = &[
    TransitionProperty {
        path: "bgColor",
        binding: Binding::Color {
            default: None,
            write: |t, c| t.palette.bg_color = c,
        },
    },
    TransitionProperty {
        path: "textColor",
        binding: Binding::Color {
            default: None,
            write: |t, c| t.palette.text_color = c,
        },
    },
    TransitionProperty {
        path: "textColorHighlight",
        binding: Binding::Color {
            default: Some(Rgba::WHITE),
            write: |t, c| t.palette.text_color_highlight = c,
        },
    },
    TransitionProperty {
        path: "textColorShadow",
        binding: Binding::Color {
            default: Some(Rgba::BLACK),
            write: |t, c| t.palette.text_color_shadow = c,
        },
    },
    TransitionProperty {
        path: "player.color",
        binding: Binding::Color {
            default: None,
            write: |t, c| t.player.color = c,
        },
    },
    TransitionProperty {
        path: "player.radius",
        binding: Binding::Number {
            default: None,
            live: Some(|t| t.player.radius),
            write: |t, v| t.player.radius = v,
        },
    },
    TransitionProperty {
        path: "controllerSpeedDamp",
        binding: Binding::Number {
            default: Some(CONTROLLER_SPEED_DAMP),
            live: None,
            write: |t, v| t.controller.speed_damp = v,
        },
    },
    TransitionProperty {
        path: "controllerSlipperiness",
        binding: Binding::Number {
            default: Some(CONTROLLER_SLIPPERINESS),
            live: None,
            write: |t, v| t.controller.slipperiness = v,
        },
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum FadeState {
    Color { current: Rgba, aim: Rgba, step: Rgba },
    Number { current: f32, aim: f32, step: f32 },
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    /// Index into `PROPERTIES`
    property: usize,
    state: FadeState,
}

impl Fade {
    fn advance(&mut self, last_frame: bool) {
        match &mut self.state {
            FadeState::Color { current, aim, step } => {
                *current = if last_frame { *aim } else { current.add_step(step) };
            }
            FadeState::Number { current, aim, step } => {
                *current = if last_frame { *aim } else { *current + *step };
            }
        }
    }

    fn write(&self, targets: &mut TransitionTargets<'_>) {
        match (&PROPERTIES[self.property].binding, self.state) {
            (Binding::Color { write, .. }, FadeState::Color { current, .. }) => write(targets, current),
            (Binding::Number { write, .. }, FadeState::Number { current, .. }) => write(targets, current),
            _ => {}
        }
    }
}

fn color_at(level: &Value, path: &str) -> Option<Rgba> {
    get_nested_property_value(level, path)?
        .as_str()
        .and_then(|hex| Rgba::from_hex(hex).ok())
}

fn number_at(level: &Value, path: &str) -> Option<f32> {
    get_nested_property_value(level, path)?.as_f64().map(|n| n as f32)
}

fn plan_fade(
    property: &'static TransitionProperty,
    from: &Value,
    to: &Value,
    targets: &TransitionTargets<'_>,
    total_frames: u32,
) -> Result<FadeState, LevelError> {
    let missing = || LevelError::MissingProperty(property.path);
    match &property.binding {
        Binding::Color { default, .. } => {
            let current = color_at(from, property.path).or(*default).ok_or_else(missing)?;
            let aim = color_at(to, property.path).or(*default).ok_or_else(missing)?;
            Ok(FadeState::Color {
                current,
                aim,
                step: current.fade_step(&aim, total_frames),
            })
        }
        Binding::Number { default, live, .. } => {
            let current = match live {
                Some(read) => Some(read(targets)),
                None => number_at(from, property.path).or(*default),
            }
            .ok_or_else(missing)?;
            let aim = number_at(to, property.path).or(*default).ok_or_else(missing)?;
            Ok(FadeState::Number {
                current,
                aim,
                step: (aim - current) / total_frames as f32,
            })
        }
    }
}

/// Runtime state of one outro
#[derive(Debug, Clone, Default)]
pub struct LevelTransition {
    fades: Vec<Fade>,
    active: bool,
    total_frames: u32,
    frames_remaining: u32,
    background_per_frame: usize,
    explode_interval: u32,
    explode_countdown: u32,
}

impl LevelTransition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan every fade from `from` to `to` and start retiring obstacles
    ///
    /// Fails without touching anything if a value is missing from a level
    /// and its property has no default.
    pub fn start(
        &mut self,
        from: &Value,
        to: &Value,
        targets: &TransitionTargets<'_>,
        clock: &FrameClock,
        store: &mut ObstacleStore,
    ) -> Result<(), LevelError> {
        let total_frames = clock.seconds_to_frames(LEVEL_OUTRO_END_MS / 1000.0).max(1);

        let fades = PROPERTIES
            .iter()
            .enumerate()
            .map(|(property, descriptor)| {
                plan_fade(descriptor, from, to, targets, total_frames).map(|state| Fade { property, state })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let counts = store.counts();
        let explosion_frames = clock.seconds_to_frames(LEVEL_OUTRO_EXPLOSIONS_MS / 1000.0);
        self.explode_interval = (explosion_frames / counts.avoid.max(1) as u32).max(1);
        self.explode_countdown = self.explode_interval;
        self.background_per_frame = counts.background.div_ceil(total_frames as usize);
        store.explode_next_avoid();

        log::debug!(
            "Transition over {} frames: {} fades, explode every {} frames, {} background per frame",
            total_frames,
            fades.len(),
            self.explode_interval,
            self.background_per_frame
        );

        self.fades = fades;
        self.total_frames = total_frames;
        self.frames_remaining = total_frames;
        self.active = true;
        Ok(())
    }

    /// Advance one simulation frame
    ///
    /// The call that uses up the last frame writes the aim values exactly.
    /// Calls after that leave the targets alone.
    pub fn next_frame(&mut self, targets: &mut TransitionTargets<'_>, store: &mut ObstacleStore) {
        if !self.active {
            return;
        }

        if self.frames_remaining > 0 {
            self.frames_remaining -= 1;
            let last_frame = self.frames_remaining == 0;
            for fade in &mut self.fades {
                fade.advance(last_frame);
                fade.write(targets);
            }
        }

        self.explode_countdown = self.explode_countdown.saturating_sub(1);
        if self.explode_countdown == 0 {
            store.explode_next_avoid();
            self.explode_countdown = self.explode_interval;
        }

        if self.background_per_frame > 0 {
            store.remove_background(self.background_per_frame);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True once every fade has reached its aim
    pub fn is_settled(&self) -> bool {
        self.frames_remaining == 0
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn finish(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::level::LevelCatalog;
    use crate::sim::obstacle::ObstacleKind;
    use serde_json::json;

    struct Live {
        palette: Palette,
        player: Player,
        controller: Controller,
    }

    impl Live {
        fn new(level: &crate::level::LevelData, layout: &Layout) -> Self {
            let mut player = Player::default();
            player.setup_for_level(&level.player, level.start_health, layout);
            let mut controller = Controller::new(layout);
            controller.setup_for_level(level);
            Self {
                palette: Palette::from_level(level),
                player,
                controller,
            }
        }

        fn targets(&mut self) -> TransitionTargets<'_> {
            TransitionTargets {
                palette: &mut self.palette,
                player: &mut self.player,
                controller: &mut self.controller,
            }
        }
    }

    #[test]
    fn test_converges_exactly_on_last_frame() {
        let catalog = LevelCatalog::builtin().unwrap();
        let layout = Layout::new(400.0, 800.0, 1.0);
        let (from, to) = (catalog.get(1).unwrap(), catalog.get(2).unwrap());
        let mut live = Live::new(&from.data, &layout);
        live.player.radius = 17.3;

        let clock = FrameClock::new();
        let mut store = ObstacleStore::new(1);
        let mut transition = LevelTransition::new();
        transition
            .start(&from.raw, &to.raw, &live.targets(), &clock, &mut store)
            .unwrap();
        let total = transition.total_frames();
        assert_eq!(total, 360);

        for _ in 0..total - 1 {
            transition.next_frame(&mut live.targets(), &mut store);
        }
        assert!(!transition.is_settled());
        transition.next_frame(&mut live.targets(), &mut store);
        assert!(transition.is_settled());

        let next = &to.data;
        assert_eq!(live.palette.bg_color, next.bg_color);
        assert_eq!(live.palette.text_color, next.text_color);
        assert_eq!(live.palette.text_color_highlight, next.text_color_highlight.unwrap_or(Rgba::WHITE));
        assert_eq!(live.player.color, next.player.color);
        assert_eq!(live.player.radius, next.player.radius);
        assert_eq!(live.controller.speed_damp, next.controller_speed_damp.unwrap_or(CONTROLLER_SPEED_DAMP));

        // Nothing drifts afterwards
        transition.next_frame(&mut live.targets(), &mut store);
        assert_eq!(live.player.radius, next.player.radius);
    }

    #[test]
    fn test_values_move_toward_aim() {
        let from = json!({
            "bgColor": "#000000", "textColor": "#000000",
            "player": { "color": "#000000", "radius": 10 },
        });
        let to = json!({
            "bgColor": "#ffffff", "textColor": "#000000",
            "player": { "color": "#000000", "radius": 20 },
            "controllerSpeedDamp": 90,
        });
        let layout = Layout::new(400.0, 800.0, 1.0);
        let mut live = Live {
            palette: Palette::default(),
            player: Player::default(),
            controller: Controller::new(&layout),
        };
        live.player.radius = 10.0;

        let clock = FrameClock::new();
        let mut store = ObstacleStore::new(1);
        let mut transition = LevelTransition::new();
        transition.start(&from, &to, &live.targets(), &clock, &mut store).unwrap();
        transition.next_frame(&mut live.targets(), &mut store);

        let n = transition.total_frames() as f32;
        assert!((live.palette.bg_color.r - 255.0 / n).abs() < 1e-4);
        assert!((live.player.radius - (10.0 + 10.0 / n)).abs() < 1e-4);
        assert!((live.controller.speed_damp - (30.0 + 60.0 / n)).abs() < 1e-4);
    }

    #[test]
    fn test_missing_value_without_default_fails() {
        let layout = Layout::new(400.0, 800.0, 1.0);
        let mut live = Live {
            palette: Palette::default(),
            player: Player::default(),
            controller: Controller::new(&layout),
        };
        let mut store = ObstacleStore::new(1);
        let err = LevelTransition::new()
            .start(&json!({}), &json!({}), &live.targets(), &FrameClock::new(), &mut store)
            .unwrap_err();
        assert!(matches!(err, LevelError::MissingProperty("bgColor")));
    }

    #[test]
    fn test_retires_obstacles_while_fading() {
        let catalog = LevelCatalog::builtin().unwrap();
        let layout = Layout::new(400.0, 800.0, 1.0);
        let (from, to) = (catalog.get(1).unwrap(), catalog.get(2).unwrap());
        let mut live = Live::new(&from.data, &layout);

        let mut store = ObstacleStore::new(3);
        store.add_all_background(&from.data, &layout).unwrap();
        store.add_all_collect_and_avoid(&from.data, &layout).unwrap();
        let avoid = from.data.total_of(ObstacleKind::Avoid) as usize;

        let clock = FrameClock::new();
        let mut transition = LevelTransition::new();
        transition
            .start(&from.raw, &to.raw, &live.targets(), &clock, &mut store)
            .unwrap();
        let exploding = |s: &ObstacleStore| {
            s.iter()
                .filter(|o| o.kind == ObstacleKind::Avoid && o.is_exploding())
                .count()
        };
        assert_eq!(exploding(&store), 1);

        // 180 explosion frames / 3 AVOID = one every 60 frames
        for _ in 0..60 {
            transition.next_frame(&mut live.targets(), &mut store);
        }
        assert_eq!(exploding(&store), 2);
        for _ in 0..60 {
            transition.next_frame(&mut live.targets(), &mut store);
        }
        assert_eq!(exploding(&store), avoid);

        for _ in 120..transition.total_frames() {
            transition.next_frame(&mut live.targets(), &mut store);
        }
        assert_eq!(store.counts().background, 0);
    }
}
