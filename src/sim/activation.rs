//! Activation policy
//!
//! Decides when the next object appears, what it is, where it goes and how
//! long it stays, from the current difficulty stage and the preset.

use glam::Vec2;
use rand::Rng;

use super::clock::Millis;
use super::motion::Bounds;
use super::object::ObjectKind;
use crate::config::{DifficultyPreset, Variant};
use crate::tuning::{self, BalloonTuning, TileTuning};

/// `min(max_stage, floor(progress / interval))`, 0 for non-positive progress
pub fn difficulty_stage(progress: i64, interval: i64, max_stage: u32) -> u32 {
    if progress <= 0 || interval <= 0 {
        return 0;
    }
    let stage = (progress / interval).min(max_stage as i64);
    stage as u32
}

/// Balloon spawn interval after `rounds` spawns
pub fn spawn_interval(tuning: &BalloonTuning, rounds: u32) -> Millis {
    let steps = (rounds / tuning.rounds_per_step.max(1)) as Millis;
    let speedup = steps.saturating_mul(tuning.spawn_acceleration_ms);
    tuning
        .spawn_interval_ms
        .saturating_sub(speedup)
        .max(tuning.min_spawn_interval_ms)
}

fn scale(ms: Millis, multiplier: f64) -> Millis {
    (ms as f64 * multiplier).round() as Millis
}

/// How long a tile stays active at `stage`
pub fn active_duration(tuning: &TileTuning, stage: u32, multiplier: f64) -> Millis {
    let base = tuning
        .base_active_ms
        .saturating_sub((stage as Millis).saturating_mul(tuning.active_step_ms))
        .max(tuning.min_active_ms);
    scale(base, multiplier).max(tuning::tiles::SCALED_ACTIVE_FLOOR)
}

/// Inclusive (min, max) delay between tile activation decisions at `stage`
pub fn delay_bounds(tuning: &TileTuning, stage: u32, multiplier: f64) -> (Millis, Millis) {
    let stage = stage as Millis;
    let min_delay = tuning
        .base_min_delay_ms
        .saturating_sub(stage.saturating_mul(tuning.delay_step_ms))
        .max(tuning.min_delay_floor_ms);
    let max_candidate = tuning
        .base_max_delay_ms
        .saturating_sub(stage.saturating_mul(tuning.delay_step_ms).saturating_mul(2));
    let max_delay = max_candidate
        .max(tuning.max_delay_floor_ms)
        .max(min_delay.saturating_add(tuning::tiles::DELAY_SPREAD));

    let scaled_min = scale(min_delay, multiplier).max(tuning::tiles::SCALED_MIN_DELAY_FLOOR);
    let scaled_max = scale(max_delay, multiplier)
        .max(scaled_min.saturating_add(tuning::tiles::SCALED_DELAY_SPREAD));
    (scaled_min, scaled_max)
}

/// Trap (blue) with probability `blue_chance`, target (red) otherwise
pub fn pick_tile_kind(rng: &mut impl Rng, blue_chance: f64) -> ObjectKind {
    if rng.random_bool(blue_chance.clamp(0.0, 1.0)) {
        ObjectKind::Blue
    } else {
        ObjectKind::Red
    }
}

/// Uniform choice among cells for which `occupied` is false
pub fn pick_idle_cell(
    rng: &mut impl Rng,
    cells: usize,
    occupied: impl Fn(usize) -> bool,
) -> Option<usize> {
    let idle: Vec<usize> = (0..cells).filter(|&c| !occupied(c)).collect();
    if idle.is_empty() {
        return None;
    }
    Some(idle[rng.random_range(0..idle.len())])
}

/// Uniform top-left corner keeping a `size` footprint fully inside `bounds`
pub fn random_point(rng: &mut impl Rng, bounds: Bounds, size: Vec2) -> Vec2 {
    let max = bounds.max_corner(size);
    Vec2::new(rng.random::<f32>() * max.x, rng.random::<f32>() * max.y)
}

/// Balloon footprint for the current playfield width
pub fn balloon_size(bounds: Bounds) -> Vec2 {
    use tuning::balloon::*;
    let width = (bounds.width * WIDTH_FRACTION).clamp(MIN_WIDTH, MAX_WIDTH);
    Vec2::new(width, width * ASPECT)
}

/// Random heading with speed in `[min_speed, max_speed)`
pub fn random_velocity(rng: &mut impl Rng, min_speed: f32, max_speed: f32) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let speed = if max_speed > min_speed {
        rng.random_range(min_speed..max_speed)
    } else {
        min_speed
    };
    Vec2::from_angle(angle) * speed
}

/// Progress and pacing for one run
#[derive(Debug, Clone)]
pub struct ActivationPolicy {
    variant: Variant,
    preset: DifficultyPreset,
    /// Activations so far this run
    rounds: u32,
    /// High-water difficulty stage; never decreases within a run
    stage: u32,
}

impl ActivationPolicy {
    pub fn new(variant: Variant, preset: DifficultyPreset) -> Self {
        Self {
            variant,
            preset,
            rounds: 0,
            stage: 0,
        }
    }

    pub fn preset(&self) -> DifficultyPreset {
        self.preset
    }

    pub fn set_preset(&mut self, preset: DifficultyPreset) {
        self.preset = preset;
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    /// Back to baseline for a new run
    pub fn reset(&mut self) {
        self.rounds = 0;
        self.stage = 0;
    }

    /// Count one activation and refresh the stage
    pub fn record_activation(&mut self) {
        self.rounds = self.rounds.saturating_add(1);
        if let Variant::Balloon(t) = &self.variant {
            let max_stage = Self::balloon_max_stage(t);
            let stage = difficulty_stage(self.rounds as i64, t.rounds_per_step as i64, max_stage);
            self.stage = self.stage.max(stage);
        }
    }

    /// Feed the latest score; score-driven games move their stage from it
    pub fn observe_score(&mut self, score: i64) {
        if let Variant::Tiles(t) = &self.variant {
            let stage = difficulty_stage(score, t.speedup_interval, t.max_stage);
            if stage > self.stage {
                log::debug!("Difficulty stage {} -> {}", self.stage, stage);
                self.stage = stage;
            }
        }
    }

    /// Stage at which the balloon interval bottoms out
    fn balloon_max_stage(t: &BalloonTuning) -> u32 {
        let span = t.spawn_interval_ms.saturating_sub(t.min_spawn_interval_ms);
        span.div_ceil(t.spawn_acceleration_ms.max(1)) as u32
    }

    /// Active objects allowed at once; `None` = unlimited
    pub fn concurrency_cap(&self) -> Option<usize> {
        match &self.variant {
            Variant::Balloon(_) => None,
            Variant::Bounce(t) => Some(t.max_balls),
            Variant::Tiles(_) => Some(self.preset.max_concurrent()),
        }
    }

    /// Whether another activation fits under the cap
    pub fn has_capacity(&self, active: usize) -> bool {
        self.concurrency_cap().is_none_or(|cap| active < cap)
    }

    /// Lifetime of a freshly activated object; `None` if it lives until clicked
    pub fn active_duration(&self) -> Option<Millis> {
        match &self.variant {
            Variant::Balloon(t) => Some(t.lifetime_ms),
            Variant::Bounce(_) => None,
            Variant::Tiles(t) => Some(active_duration(t, self.stage, self.preset.speed_multiplier())),
        }
    }

    /// Grace window for target kinds
    pub fn grace_duration(&self) -> Option<Millis> {
        match &self.variant {
            Variant::Tiles(t) => Some(t.grace_ms),
            _ => None,
        }
    }

    /// Delay until the next activation decision
    pub fn next_delay(&self, rng: &mut impl Rng) -> Millis {
        match &self.variant {
            Variant::Balloon(t) => spawn_interval(t, self.rounds),
            Variant::Bounce(t) => t.growth_interval_ms,
            Variant::Tiles(t) => {
                let (min, max) = delay_bounds(t, self.stage, self.preset.speed_multiplier());
                rng.random_range(min..=max)
            }
        }
    }
}
