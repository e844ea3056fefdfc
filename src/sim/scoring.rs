//! Scoring policy
//!
//! Outcomes map to deltas through `ScoreRules`; `apply` is the only way the
//! score changes.

use serde::{Deserialize, Serialize};

use crate::tuning;

/// How an object (or a stray click) was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Target clicked in time
    Hit,
    /// Target timed out (after grace, where there is one)
    Miss,
    /// Trap clicked
    TrapHit,
    /// Trap left alone until it expired
    TrapAvoided,
    /// Click on an empty cell
    IdleClick,
}

/// Score delta per outcome, plus the optional floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRules {
    pub hit: i64,
    pub miss: i64,
    pub trap_hit: i64,
    pub trap_avoided: i64,
    pub idle_click: i64,
    /// Lowest score allowed; `None` = unbounded
    pub floor: Option<i64>,
}

impl ScoreRules {
    pub fn balloon() -> Self {
        Self {
            hit: tuning::balloon::SCORE_GAIN,
            miss: -tuning::balloon::SCORE_LOSS,
            trap_hit: 0,
            trap_avoided: 0,
            idle_click: 0,
            floor: Some(0),
        }
    }

    /// Clicks only ever add; no floor needed
    pub fn bounce() -> Self {
        Self {
            hit: tuning::bounce::CLICK_SCORE,
            miss: 0,
            trap_hit: 0,
            trap_avoided: 0,
            idle_click: 0,
            floor: None,
        }
    }

    pub fn tiles() -> Self {
        Self {
            hit: 1,
            miss: -1,
            trap_hit: -1,
            trap_avoided: 1,
            idle_click: -1,
            floor: Some(0),
        }
    }

    pub fn delta(&self, outcome: Outcome) -> i64 {
        match outcome {
            Outcome::Hit => self.hit,
            Outcome::Miss => self.miss,
            Outcome::TrapHit => self.trap_hit,
            Outcome::TrapAvoided => self.trap_avoided,
            Outcome::IdleClick => self.idle_click,
        }
    }
}

/// Result of a score mutation, for the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    pub score: i64,
    /// Requested delta (its sign drives the gain/loss flash even when clamped)
    pub delta: i64,
}

/// Owns the score
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    rules: ScoreRules,
    score: i64,
}

impl ScoringPolicy {
    pub fn new(rules: ScoreRules) -> Self {
        Self {
            rules,
            score: rules.floor.map_or(0, |floor| floor.max(0)),
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }

    /// Add `delta`, clamping to the floor
    pub fn apply(&mut self, delta: i64) -> ScoreChange {
        let mut score = self.score.saturating_add(delta);
        if let Some(floor) = self.rules.floor {
            score = score.max(floor);
        }
        self.score = score;
        ScoreChange { score, delta }
    }

    pub fn record(&mut self, outcome: Outcome) -> ScoreChange {
        self.apply(self.rules.delta(outcome))
    }

    pub fn reset(&mut self) {
        self.score = 0;
        if let Some(floor) = self.rules.floor {
            self.score = self.score.max(floor);
        }
    }
}
