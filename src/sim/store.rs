//! Obstacle store and spawner
//!
//! Owns every live obstacle for the session. Groups from level data are
//! expanded into randomized obstacles here; removal is deferred through the
//! `is_deleted` flag and swept by `compact`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::obstacle::{ExplosionParams, Obstacle, ObstacleKind};
use super::random::{coin_flip, random_float_between, random_int_between, random_item};
use crate::audio::{SfxTable, SoundId};
use crate::consts::*;
use crate::layout::Layout;
use crate::level::{GroupDescriptor, LevelData, LevelError};
use crate::{degrees_to_vector, vector_to_degrees};

/// Live obstacles per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObstacleCounts {
    pub collect: usize,
    pub avoid: usize,
    pub background: usize,
    pub floating: usize,
    pub level_intro: usize,
}

#[derive(Debug, Clone)]
pub struct ObstacleStore {
    obstacles: Vec<Obstacle>,
    rng: Pcg32,
    /// Smallest and largest authored COLLECT radius seen this level
    radius_range: Option<(f32, f32)>,
}

impl ObstacleStore {
    pub fn new(seed: u64) -> Self {
        Self {
            obstacles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            radius_range: None,
        }
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    pub fn get(&self, index: usize) -> Option<&Obstacle> {
        self.obstacles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Obstacle> {
        self.obstacles.get_mut(index)
    }

    /// Add an already built obstacle
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Drop every obstacle and forget the radius range
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.radius_range = None;
    }

    /// Widen the COLLECT radius range used for sound bucketing
    pub fn register_radius_range(&mut self, group: &GroupDescriptor) -> Result<(), LevelError> {
        let [a, b] = group.radius_range()?;
        let (lo, hi) = (a.min(b), a.max(b));
        self.radius_range = Some(match self.radius_range {
            Some((min, max)) => (min.min(lo), max.max(hi)),
            None => (lo, hi),
        });
        Ok(())
    }

    pub fn radius_range(&self) -> Option<(f32, f32)> {
        self.radius_range
    }

    /// Pitch-bucketed sound for an (unscaled) radius: small = high
    pub fn sound_for_radius(&self, radius: f32, table: SfxTable) -> SoundId {
        let Some((min, max)) = self.radius_range else {
            return table.at(0);
        };
        let bucket_size = (max - min) / table.len() as f32;
        let position = ((radius - min) / bucket_size).floor();
        let index = if position.is_nan() || position < 0.0 {
            0
        } else {
            // +inf saturates, then the table clamps
            position as usize
        };
        table.at(index)
    }

    /// Create one randomized obstacle from a group and store it
    pub fn spawn(&mut self, group: &GroupDescriptor, layout: &Layout) -> Result<&Obstacle, LevelError> {
        let [radius_min, radius_max] = group.radius_range()?;
        let [speed_min, speed_max] = group.speed_range()?;
        let [dir_a, dir_b] = group.direction_range()?;
        let appendages = group.num_appendages_range()?;

        if group.kind == ObstacleKind::Collect && group.collect_sfx.is_some() {
            self.register_radius_range(group)?;
        }

        let rng = &mut self.rng;
        let native_speed = (random_float_between(rng, speed_min, speed_max) / layout.pixel_scale)
            .max(STATIC_OBSTACLE_SPEED);
        let (dir_lo, dir_hi) = (dir_a.min(dir_b), dir_a.max(dir_b));
        let degrees = random_int_between(
            rng,
            dir_lo.round() as i32 + DIRECTION_OFFSET_DEGREES as i32,
            dir_hi.round() as i32 + DIRECTION_OFFSET_DEGREES as i32,
        );
        let vector = degrees_to_vector(degrees as f32);
        let radius = random_float_between(rng, radius_min, radius_max);

        let bounds = match group.kind {
            ObstacleKind::Background | ObstacleKind::LevelIntro => layout.background,
            ObstacleKind::Floating => layout.floating,
            ObstacleKind::Collect | ObstacleKind::Avoid => layout.gameplay,
        };
        let x = random_float_between(rng, bounds.left + radius, bounds.right - radius);
        let y = if group.kind.interacts_with_player() {
            // Below the play area so it scrolls into view
            random_float_between(rng, bounds.bottom + radius * 2.0, bounds.bottom * 2.0 + radius * 2.0)
        } else {
            random_float_between(rng, bounds.top + radius, bounds.bottom - radius)
        };

        let mut obstacle = Obstacle::new(group.kind, Vec2::new(x, y), radius);
        obstacle.subtype = group.subtype;
        obstacle.color = random_item(rng, &group.colors).copied();
        obstacle.vector = vector;
        obstacle.native_speed = native_speed;
        obstacle.speed = native_speed;

        match group.kind {
            ObstacleKind::Avoid => {
                obstacle.damage_sfx = Some(group.damage_sfx.unwrap_or(SoundId::Damage));
            }
            ObstacleKind::Collect => {
                obstacle.sound_id = group.collect_sfx.map(|table| self.sound_for_radius(radius, table));
            }
            _ => {}
        }

        let rng = &mut self.rng;
        if group.kind.interacts_with_player() {
            obstacle.explosion = ExplosionParams {
                angle_increase: -random_float_between(
                    rng,
                    EXPLODING_ANGLE_INCREASE_MIN,
                    EXPLODING_ANGLE_INCREASE_MAX,
                ),
                speed_multiplier: random_float_between(
                    rng,
                    EXPLODING_SPEED_MULTIPLIER_MIN,
                    EXPLODING_SPEED_MULTIPLIER_MAX,
                ),
                radius_multiplier: random_float_between(
                    rng,
                    EXPLODING_RADIUS_MULTIPLIER_MIN,
                    EXPLODING_RADIUS_MULTIPLIER_MAX,
                ),
            };
        }

        // Sound and position were picked from the authored size
        obstacle.radius *= layout.proportional_multiplier;

        obstacle.rotation = vector_to_degrees(obstacle.vector);
        if let Some([min, max]) = group.rotation_speed_range {
            let mut speed = random_float_between(rng, min, max);
            if coin_flip(rng) {
                speed = -speed;
            }
            obstacle.rotation_speed = speed;
        }

        if let Some([min, max]) = appendages {
            let count = random_int_between(rng, min, max).max(1) as u32;
            obstacle.num_appendages = Some(count);
            obstacle.shape_center_radius_divisor = group.shape_center_radius_divisor;
            // Spinning petals read as spinning too fast otherwise
            obstacle.rotation_speed /= count as f32;
        }

        obstacle.shape_center_color = random_item(rng, &group.shape_center_colors).copied();

        self.obstacles.push(obstacle);
        let index = self.obstacles.len() - 1;
        Ok(&self.obstacles[index])
    }

    /// Spawn `group.total` obstacles, returning how many were added
    pub fn add_group(&mut self, group: &GroupDescriptor, layout: &Layout) -> Result<usize, LevelError> {
        let mut surface_area = 0.0;
        for _ in 0..group.total {
            let obstacle = self.spawn(group, layout)?;
            surface_area += std::f32::consts::PI * obstacle.radius * obstacle.radius;
        }
        log::debug!(
            "Spawned {} {:?} obstacles (surface area {:.0})",
            group.total,
            group.kind,
            surface_area
        );
        Ok(group.total as usize)
    }

    fn add_all_of(
        &mut self,
        level: &LevelData,
        layout: &Layout,
        kinds: &[ObstacleKind],
    ) -> Result<usize, LevelError> {
        let mut added = 0;
        for group in level.obstacles.iter().filter(|g| kinds.contains(&g.kind)) {
            added += self.add_group(group, layout)?;
        }
        Ok(added)
    }

    pub fn add_all_background(&mut self, level: &LevelData, layout: &Layout) -> Result<usize, LevelError> {
        self.add_all_of(level, layout, &[ObstacleKind::Background])
    }

    pub fn add_all_floating(&mut self, level: &LevelData, layout: &Layout) -> Result<usize, LevelError> {
        self.add_all_of(level, layout, &[ObstacleKind::Floating])
    }

    /// Front page preview shapes
    pub fn add_all_level_intro(&mut self, level: &LevelData, layout: &Layout) -> Result<usize, LevelError> {
        self.add_all_of(level, layout, &[ObstacleKind::LevelIntro])
    }

    /// COLLECT and AVOID groups, in authored order
    ///
    /// Every COLLECT range is registered first so the first group's sounds
    /// are bucketed against the whole level, not just itself.
    pub fn add_all_collect_and_avoid(&mut self, level: &LevelData, layout: &Layout) -> Result<usize, LevelError> {
        for group in level.groups(ObstacleKind::Collect) {
            self.register_radius_range(group)?;
        }
        self.add_all_of(level, layout, &[ObstacleKind::Collect, ObstacleKind::Avoid])
    }

    /// Start the explosion of the newest AVOID obstacle that isn't exploding
    pub fn explode_next_avoid(&mut self) -> bool {
        let next = self
            .obstacles
            .iter_mut()
            .rev()
            .find(|o| o.kind == ObstacleKind::Avoid && !o.is_exploding() && !o.is_deleted);
        match next {
            Some(obstacle) => {
                obstacle.explode();
                true
            }
            None => false,
        }
    }

    /// Remove up to `count` BACKGROUND obstacles, newest first
    pub fn remove_background(&mut self, count: usize) -> usize {
        let mut removed = 0;
        for obstacle in self.obstacles.iter_mut().rev() {
            if removed == count {
                break;
            }
            if obstacle.kind == ObstacleKind::Background && !obstacle.is_deleted {
                obstacle.is_deleted = true;
                removed += 1;
            }
        }
        self.compact();
        removed
    }

    /// Sweep deleted obstacles out of the store
    pub fn compact(&mut self) {
        self.obstacles.retain(|o| !o.is_deleted);
    }

    pub fn counts(&self) -> ObstacleCounts {
        let mut counts = ObstacleCounts::default();
        for obstacle in self.obstacles.iter().filter(|o| !o.is_deleted) {
            match obstacle.kind {
                ObstacleKind::Collect => counts.collect += 1,
                ObstacleKind::Avoid => counts.avoid += 1,
                ObstacleKind::Background => counts.background += 1,
                ObstacleKind::Floating => counts.floating += 1,
                ObstacleKind::LevelIntro => counts.level_intro += 1,
            }
        }
        counts
    }
}
