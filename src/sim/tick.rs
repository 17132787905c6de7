//! Per-frame update and level life cycle
//!
//! `tick` is called once per repaint with however many whole frames the
//! clock says have elapsed (possibly zero). Timers and input are handled on
//! every call; simulation only runs when frames > 0.

use glam::Vec2;

use super::clock::FrameClock;
use super::collision::{bounce_off_player, circles_overlap};
use super::obstacle::ObstacleKind;
use super::state::{GameEvent, GameOverReason, GamePhase, GameState, ObstacleTotals, Palette};
use super::timers::TimerId;
use super::transition::TransitionTargets;
use crate::audio::SoundId;
use crate::consts::*;
use crate::level::LevelError;

/// Input gathered since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer position in canvas space
    pub pointer: Option<Vec2>,
    /// Click/tap
    pub tap: bool,
}

/// Handle one repaint
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    frames: u32,
    clock: &FrameClock,
    now_ms: f64,
) -> Result<(), LevelError> {
    if let Some(pointer) = input.pointer {
        state.controller.set_pointer(pointer);
    }
    if input.tap {
        handle_tap(state, clock, now_ms)?;
    }
    handle_timers(state, clock, now_ms)?;

    if frames > 0 {
        update_by_frame_count(state, frames, clock, now_ms)?;
    }
    Ok(())
}

/// Advance the simulation by `frames` frames
///
/// Order matters: steering, then obstacle motion, then collisions against
/// the moved obstacles, then level bookkeeping.
pub fn update_by_frame_count(
    state: &mut GameState,
    frames: u32,
    clock: &FrameClock,
    now_ms: f64,
) -> Result<(), LevelError> {
    state
        .controller
        .update_lateral_multiplier(state.layout.gameplay_width, state.player.drawn_radius);
    state.controller.update_pointer_pos();
    if state.player.update(frames, &state.layout, &state.controller) {
        state.controller.clear_damage();
    }

    state.store.update(frames, &state.layout);

    if matches!(
        state.phase,
        GamePhase::LevelIntro | GamePhase::Playing | GamePhase::LevelOutro
    ) {
        check_player_hits(state, clock);
    }

    match state.phase {
        GamePhase::Playing => {
            if state.collectable_remaining == 0 {
                do_level_completed(state, clock, now_ms)?;
            } else {
                update_timer(state, clock, now_ms);
            }
        }
        GamePhase::LevelOutro => {
            let mut targets = TransitionTargets {
                palette: &mut state.palette,
                player: &mut state.player,
                controller: &mut state.controller,
            };
            for _ in 0..frames {
                state.transition.next_frame(&mut targets, &mut state.store);
            }
        }
        _ => {}
    }

    state.text.update(frames);
    Ok(())
}

/// Test every player-facing obstacle against the player, newest first
pub fn check_player_hits(state: &mut GameState, clock: &FrameClock) {
    let player_pos = state.player.pos;
    let player_radius = state.player.drawn_radius;

    for index in (0..state.store.len()).rev() {
        let kind = match state.store.get(index) {
            Some(o)
                if !o.is_deleted
                    && o.kind.interacts_with_player()
                    && circles_overlap(player_pos, player_radius, o.pos, o.radius) =>
            {
                o.kind
            }
            _ => continue,
        };
        match kind {
            ObstacleKind::Collect => player_eats(state, index, clock),
            ObstacleKind::Avoid => player_hit_obstacle(state, index, clock),
            _ => {}
        }
    }
}

/// Bounce an AVOID obstacle off the player and, outside the outro, hurt
pub fn player_hit_obstacle(state: &mut GameState, index: usize, clock: &FrameClock) {
    let (player_pos, player_velocity, player_mass) =
        (state.player.pos, state.player.velocity, state.player.radius);
    let Some(obstacle) = state.store.get_mut(index) else {
        return;
    };
    if obstacle.damage_safety_counter > 0 {
        return;
    }

    let knockback = bounce_off_player(obstacle, player_pos, player_velocity, player_mass);
    obstacle.damage_safety_counter = clock.seconds_to_frames(DAMAGE_SAFETY_SECS);
    let sfx = obstacle.damage_sfx;

    state.controller.kick(knockback);

    if state.phase == GamePhase::LevelOutro {
        return;
    }
    damage_player(state, knockback, sfx, clock);
}

/// Absorb a COLLECT obstacle
pub fn player_eats(state: &mut GameState, index: usize, clock: &FrameClock) {
    let Some(obstacle) = state.store.get_mut(index) else {
        return;
    };
    if obstacle.is_exploding() {
        return;
    }

    let eaten_radius = obstacle.radius;
    obstacle.radius *= EATEN_OBSTACLE_GROWTH;
    obstacle.explode();
    let (color, sound) = (obstacle.color, obstacle.sound_id);

    state.player.grow(eaten_radius);
    state.player.eats_counter = clock.seconds_to_frames(PLAYER_EATS_SECS);
    state.player.eaten_color = color;
    state.collectable_remaining = state.collectable_remaining.saturating_sub(1);

    if let Some(id) = sound {
        state.emit(GameEvent::PlaySound(id));
    }
    let remaining = state.collectable_remaining;
    state.emit(GameEvent::CollectableEaten { remaining });
}

/// Take one health point and lose some control, scaled by the knockback
pub fn damage_player(state: &mut GameState, knockback: Vec2, sfx: Option<SoundId>, clock: &FrameClock) {
    let adjustment = knockback.length() / LOSS_OF_CONTROL_MAGNITUDE_DIVISOR;
    let reeling = (adjustment as f64 * clock.current_fps()).ceil() as u32;
    state.player.damaged_counter = reeling.min(clock.seconds_to_frames(LOSS_OF_CONTROL_MAX_SECS));
    state.controller.damage_added_slipperiness = adjustment;

    let health = state.player.lose_health();
    if let Some(id) = sfx {
        state.emit(GameEvent::PlaySound(id));
    }
    state.emit(GameEvent::PlayerDamaged { health });

    if state.player.is_dead() {
        end(state, GameOverReason::HealthDepleted, clock);
    }
}

/// Run every timer that has come due
pub fn handle_timers(state: &mut GameState, clock: &FrameClock, now_ms: f64) -> Result<(), LevelError> {
    for id in state.timers.take_due(now_ms) {
        match id {
            TimerId::LevelIntroAddObstacles => {
                let level = &state.catalog.level(state.level_index)?.data;
                let added = state.store.add_all_collect_and_avoid(level, &state.layout)?;
                log::debug!("Intro added {} play obstacles", added);
            }
            TimerId::TextFadeOut => {
                state.text.fade_out(clock.seconds_to_frames(TEXT_FADEOUT_SLOW_SECS));
                state.emit(GameEvent::TextFadeOut);
            }
            TimerId::LevelIntroEnd => start_play(state, now_ms),
            TimerId::LevelOutroEnd => next_level(state, clock, now_ms)?,
        }
    }
    Ok(())
}

/// A click/tap: leave the front page, start a skipped-to level, or restart
pub fn handle_tap(state: &mut GameState, clock: &FrameClock, now_ms: f64) -> Result<(), LevelError> {
    match state.phase {
        GamePhase::FrontPage if state.awaiting_tap => {
            state.awaiting_tap = false;
            state.level_index = state.catalog.next_index(state.level_index);
            setup_current_level(state, clock, now_ms)
        }
        GamePhase::LevelIntro if state.awaiting_tap => {
            state.awaiting_tap = false;
            start_intro_timers(state, now_ms);
            Ok(())
        }
        GamePhase::GameOver(_) | GamePhase::Complete if state.awaiting_tap => {
            state.skip_to = None;
            reset_and_start_first_level(state, clock, now_ms)
        }
        _ => Ok(()),
    }
}

/// Fresh run: score cleared, first level (or the skip target) set up
pub fn reset_and_start_first_level(state: &mut GameState, clock: &FrameClock, now_ms: f64) -> Result<(), LevelError> {
    state.level_index = state.skip_to.unwrap_or(0);
    state.levels_completed = 0;
    state.score = 0;
    state.transition.finish();
    state.controller.set_pointer(state.layout.controller.center());
    setup_current_level(state, clock, now_ms)
}

/// Build the current level from scratch and start its intro
pub fn setup_current_level(state: &mut GameState, clock: &FrameClock, now_ms: f64) -> Result<(), LevelError> {
    let level = state.current_level()?.data.clone();

    state.time_allowed = i64::from(level.time_allowed_secs);
    state.time_remaining = state.time_allowed;
    state.time_is_low = false;

    state.layout.update(level.gameplay_area_to_canvas_lateral_ratio);
    state.controller.update_layout(&state.layout);
    state.controller.setup_for_level(&level);
    state.player.setup_for_level(&level.player, level.start_health, &state.layout);
    state
        .controller
        .update_lateral_multiplier(state.layout.gameplay_width, state.player.drawn_radius);
    state.palette = Palette::from_level(&level);

    state.store.reset();
    state.store.add_all_background(&level, &state.layout)?;
    state.store.add_all_floating(&level, &state.layout)?;
    if state.is_front_page() {
        state.store.add_all_level_intro(&level, &state.layout)?;
    }
    state.totals = ObstacleTotals::from_level(&level);
    state.collectable_remaining = state.totals.collect;

    log::info!("Level {} ({}) set up", state.level_index, level.id);
    start_level_intro(state, clock, now_ms);
    Ok(())
}

pub fn start_level_intro(state: &mut GameState, clock: &FrameClock, now_ms: f64) {
    state.timers.clear();
    state.text.opacity = 0.0;
    state.text.fade_in(clock.seconds_to_frames(TEXT_FADEIN_SECS));

    if state.is_front_page() {
        state.phase = GamePhase::FrontPage;
        state.awaiting_tap = true;
        return;
    }

    state.phase = GamePhase::LevelIntro;
    let id = state.catalog.get(state.level_index).map(|l| l.id().to_string()).unwrap_or_default();
    let index = state.level_index;
    state.emit(GameEvent::LevelStarted { index, id });

    if state.levels_completed == 0 && state.skip_to == Some(state.level_index) {
        state.awaiting_tap = true;
    } else {
        state.awaiting_tap = false;
        start_intro_timers(state, now_ms);
    }
}

fn start_intro_timers(state: &mut GameState, now_ms: f64) {
    state.timers.set(TimerId::LevelIntroAddObstacles, now_ms, LEVEL_INTRO_ADD_OBSTACLES_MS);
    state.timers.set(TimerId::TextFadeOut, now_ms, LEVEL_INTRO_TEXT_FADEOUT_MS);
    state.timers.set(TimerId::LevelIntroEnd, now_ms, LEVEL_INTRO_END_MS);
}

pub fn start_play(state: &mut GameState, now_ms: f64) {
    state.phase = GamePhase::Playing;
    state.play_started_ms = now_ms;
    log::info!("Level {} playing", state.level_index);
}

/// Recompute the seconds left; out of time ends the run
pub fn update_timer(state: &mut GameState, clock: &FrameClock, now_ms: f64) {
    let elapsed = ((now_ms - state.play_started_ms) / 1000.0).round() as i64;
    state.time_remaining = state.time_allowed - elapsed;
    if state.time_remaining <= 0 {
        state.time_remaining = 0;
        end(state, GameOverReason::TimesUp, clock);
        return;
    }
    state.time_is_low = state.time_remaining <= TIME_LOW_SECONDS;
}

/// Score the level and start the outro
pub fn do_level_completed(state: &mut GameState, clock: &FrameClock, now_ms: f64) -> Result<(), LevelError> {
    state.levels_completed += 1;
    let bonus = state.time_remaining.max(0) as f64
        * SCORE_PER_SEC_REMAINING
        * state.levels_completed as f64
        * SCORE_PER_LEVEL_MULTIPLIER;
    state.score += bonus.round() as u64;

    let (index, score) = (state.level_index, state.score);
    log::info!("Level {} completed, score {}", index, score);
    state.emit(GameEvent::LevelCompleted { index, score });
    start_level_outro(state, clock, now_ms)
}

/// Fade toward the next level while the survivors blow up
pub fn start_level_outro(state: &mut GameState, clock: &FrameClock, now_ms: f64) -> Result<(), LevelError> {
    let next_index = state.catalog.next_index(state.level_index);
    let from = &state.catalog.level(state.level_index)?.raw;
    let to = &state.catalog.level(next_index)?.raw;

    let targets = TransitionTargets {
        palette: &mut state.palette,
        player: &mut state.player,
        controller: &mut state.controller,
    };
    state.transition.start(from, to, &targets, clock, &mut state.store)?;

    state.phase = GamePhase::LevelOutro;
    state.text.opacity = 0.0;
    state.text.fade_in(clock.seconds_to_frames(TEXT_FADEIN_SECS));
    state.timers.set(TimerId::TextFadeOut, now_ms, LEVEL_OUTRO_TEXT_FADEOUT_MS);
    state.timers.set(TimerId::LevelOutroEnd, now_ms, LEVEL_OUTRO_END_MS);
    Ok(())
}

/// Move on after an outro, or finish the run
pub fn next_level(state: &mut GameState, clock: &FrameClock, now_ms: f64) -> Result<(), LevelError> {
    state.store.reset();
    state.transition.finish();

    if state.levels_completed < state.catalog.playable_count() {
        state.level_index = state.catalog.next_index(state.level_index);
        return setup_current_level(state, clock, now_ms);
    }

    state.timers.clear();
    state.phase = GamePhase::Complete;
    state.awaiting_tap = true;
    let score = state.score;
    log::info!("Game complete, score {}", score);
    state.emit(GameEvent::GameComplete { score });
    Ok(())
}

/// Stop the run
pub fn end(state: &mut GameState, reason: GameOverReason, clock: &FrameClock) {
    state.timers.clear();
    state.phase = GamePhase::GameOver(reason);
    state.awaiting_tap = true;
    state.text.opacity = 0.0;
    state.text.fade_in(clock.seconds_to_frames(TEXT_FADEIN_SECS));
    log::info!("Game over ({:?}) on level {}", reason, state.level_index);
    state.emit(GameEvent::GameOver(reason));
}
