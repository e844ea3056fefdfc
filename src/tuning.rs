//! Data-driven game balance
//!
//! Stock constants for the three games and the serializable tuning structs
//! built from them. Hosts can override any field through `GameConfig::from_json`.

use serde::{Deserialize, Serialize};

use crate::sim::Millis;

/// Balloon Dash
pub mod balloon {
    use crate::sim::Millis;

    pub const SPAWN_INTERVAL_MS: Millis = 900;
    pub const MIN_SPAWN_INTERVAL_MS: Millis = 450;
    /// Interval shrink per speed-up step
    pub const SPAWN_ACCELERATION: Millis = 12;
    /// Spawns per speed-up step
    pub const ROUNDS_PER_STEP: u32 = 10;
    pub const LIFETIME_MS: Millis = 2200;
    pub const SCORE_GAIN: i64 = 2;
    pub const SCORE_LOSS: i64 = 1;

    /// Balloon width as a fraction of the playfield width, clamped to px bounds
    pub const WIDTH_FRACTION: f32 = 0.06;
    pub const MIN_WIDTH: f32 = 40.0;
    pub const MAX_WIDTH: f32 = 72.0;
    pub const ASPECT: f32 = 1.5;
}

/// Hyper Bounce
pub mod bounce {
    use crate::sim::Millis;

    pub const INITIAL_BALLS: usize = 4;
    pub const MAX_BALLS: usize = 30;
    pub const GROWTH_INTERVAL_MS: Millis = 6000;
    /// Growth delay right after a successful click
    pub const REFILL_DELAY_MS: Millis = 400;
    pub const MIN_SPEED: f32 = 110.0;
    pub const MAX_SPEED: f32 = 180.0;
    pub const BALL_SIZE: f32 = 56.0;
    pub const CLICK_SCORE: i64 = 1;
}

/// Reaction Grid
pub mod tiles {
    use crate::sim::Millis;

    pub const GRID_SIZE: usize = 4;
    /// Largest grid side a configuration may ask for
    pub const MAX_GRID_SIZE: usize = 64;

    pub const BASE_ACTIVE_DURATION: Millis = 1500;
    pub const MIN_ACTIVE_DURATION: Millis = 650;
    pub const ACTIVE_DURATION_STEP: Millis = 75;
    /// Hard floor after the speed multiplier is applied
    pub const SCALED_ACTIVE_FLOOR: Millis = 180;

    pub const BASE_MIN_DELAY: Millis = 500;
    pub const BASE_MAX_DELAY: Millis = 1500;
    pub const MIN_DELAY_FLOOR: Millis = 230;
    pub const MAX_DELAY_FLOOR: Millis = 600;
    pub const DELAY_STEP: Millis = 60;
    /// Minimum spread between min and max delay before scaling
    pub const DELAY_SPREAD: Millis = 120;
    pub const SCALED_MIN_DELAY_FLOOR: Millis = 150;
    pub const SCALED_DELAY_SPREAD: Millis = 80;

    /// Score points per difficulty stage
    pub const SPEEDUP_INTERVAL: i64 = 5;
    pub const MAX_DIFFICULTY_STAGE: u32 = 10;

    pub const BLUE_CHANCE: f64 = 0.2;
    pub const RED_GRACE_MS: Millis = 200;
}

/// Balloon spawn pacing (round-counter driven)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonTuning {
    pub spawn_interval_ms: Millis,
    pub min_spawn_interval_ms: Millis,
    pub spawn_acceleration_ms: Millis,
    pub rounds_per_step: u32,
    pub lifetime_ms: Millis,
}

impl Default for BalloonTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: balloon::SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: balloon::MIN_SPAWN_INTERVAL_MS,
            spawn_acceleration_ms: balloon::SPAWN_ACCELERATION,
            rounds_per_step: balloon::ROUNDS_PER_STEP,
            lifetime_ms: balloon::LIFETIME_MS,
        }
    }
}

/// Bounce population growth and ball motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceTuning {
    pub initial_balls: usize,
    pub max_balls: usize,
    pub growth_interval_ms: Millis,
    pub refill_delay_ms: Millis,
    pub min_speed: f32,
    pub max_speed: f32,
    pub ball_size: f32,
}

impl Default for BounceTuning {
    fn default() -> Self {
        Self {
            initial_balls: bounce::INITIAL_BALLS,
            max_balls: bounce::MAX_BALLS,
            growth_interval_ms: bounce::GROWTH_INTERVAL_MS,
            refill_delay_ms: bounce::REFILL_DELAY_MS,
            min_speed: bounce::MIN_SPEED,
            max_speed: bounce::MAX_SPEED,
            ball_size: bounce::BALL_SIZE,
        }
    }
}

/// Reaction grid timing curves (score-stage driven)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileTuning {
    pub grid_size: usize,
    pub base_active_ms: Millis,
    pub min_active_ms: Millis,
    pub active_step_ms: Millis,
    pub base_min_delay_ms: Millis,
    pub base_max_delay_ms: Millis,
    pub min_delay_floor_ms: Millis,
    pub max_delay_floor_ms: Millis,
    pub delay_step_ms: Millis,
    pub speedup_interval: i64,
    pub max_stage: u32,
    pub blue_chance: f64,
    pub grace_ms: Millis,
}

impl Default for TileTuning {
    fn default() -> Self {
        Self {
            grid_size: tiles::GRID_SIZE,
            base_active_ms: tiles::BASE_ACTIVE_DURATION,
            min_active_ms: tiles::MIN_ACTIVE_DURATION,
            active_step_ms: tiles::ACTIVE_DURATION_STEP,
            base_min_delay_ms: tiles::BASE_MIN_DELAY,
            base_max_delay_ms: tiles::BASE_MAX_DELAY,
            min_delay_floor_ms: tiles::MIN_DELAY_FLOOR,
            max_delay_floor_ms: tiles::MAX_DELAY_FLOOR,
            delay_step_ms: tiles::DELAY_STEP,
            speedup_interval: tiles::SPEEDUP_INTERVAL,
            max_stage: tiles::MAX_DIFFICULTY_STAGE,
            blue_chance: tiles::BLUE_CHANCE,
            grace_ms: tiles::RED_GRACE_MS,
        }
    }
}

impl TileTuning {
    pub fn cell_count(&self) -> usize {
        self.grid_size.saturating_mul(self.grid_size)
    }
}
