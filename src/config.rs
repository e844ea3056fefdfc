//! Game configuration
//!
//! A `GameConfig` fully describes one game: which variant, its tuning, its
//! scoring rules, the difficulty preset and an optional RNG seed. Hosts start
//! from one of the stock constructors and may apply a JSON override document.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::{Millis, ScoreRules};
use crate::tuning::{self, BalloonTuning, BounceTuning, TileTuning};

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreset {
    #[default]
    #[serde(alias = "slow")]
    Easy,
    #[serde(alias = "med")]
    Medium,
    #[serde(alias = "fast")]
    Hard,
}

impl DifficultyPreset {
    pub const ALL: [DifficultyPreset; 3] = [
        DifficultyPreset::Easy,
        DifficultyPreset::Medium,
        DifficultyPreset::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "easy",
            DifficultyPreset::Medium => "medium",
            DifficultyPreset::Hard => "hard",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Medium => "Medium",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" | "slow" => Some(DifficultyPreset::Easy),
            "medium" | "med" => Some(DifficultyPreset::Medium),
            "hard" | "fast" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Scale applied to active durations and activation delays
    pub fn speed_multiplier(&self) -> f64 {
        match self {
            DifficultyPreset::Easy => 1.0,
            DifficultyPreset::Medium => 0.5,
            DifficultyPreset::Hard => 1.0 / 3.0,
        }
    }

    /// Maximum simultaneously active (non-grace) objects
    pub fn max_concurrent(&self) -> usize {
        match self {
            DifficultyPreset::Easy => 1,
            DifficultyPreset::Medium => 2,
            DifficultyPreset::Hard => 3,
        }
    }
}

/// Which of the three games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Balloon,
    Bounce,
    Tiles,
}

impl GameKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "balloon" | "balloons" => Some(GameKind::Balloon),
            "bounce" => Some(GameKind::Bounce),
            "tiles" | "tile" | "grid" => Some(GameKind::Tiles),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Balloon => "Balloon Dash",
            GameKind::Bounce => "Hyper Bounce",
            GameKind::Tiles => "Reaction Grid",
        }
    }
}

/// Per-variant tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Variant {
    Balloon(BalloonTuning),
    Bounce(BounceTuning),
    Tiles(TileTuning),
}

impl Variant {
    pub fn kind(&self) -> GameKind {
        match self {
            Variant::Balloon(_) => GameKind::Balloon,
            Variant::Bounce(_) => GameKind::Bounce,
            Variant::Tiles(_) => GameKind::Tiles,
        }
    }
}

/// Complete configuration for one engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub variant: Variant,
    pub scoring: ScoreRules,
    /// Difficulty preset (only the tile game reads it)
    pub preset: DifficultyPreset,
    /// RNG seed; `None` lets the host pick one
    pub seed: Option<u64>,
}

/// JSON override document accepted by `GameConfig::from_json`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    game: GameKind,
    #[serde(default)]
    tuning: Option<serde_json::Value>,
    #[serde(default)]
    scoring: Option<ScoreRules>,
    #[serde(default)]
    preset: DifficultyPreset,
    #[serde(default)]
    seed: Option<u64>,
}

impl GameConfig {
    pub fn balloon() -> Self {
        Self {
            variant: Variant::Balloon(BalloonTuning::default()),
            scoring: ScoreRules::balloon(),
            preset: DifficultyPreset::default(),
            seed: None,
        }
    }

    pub fn bounce() -> Self {
        Self {
            variant: Variant::Bounce(BounceTuning::default()),
            scoring: ScoreRules::bounce(),
            preset: DifficultyPreset::default(),
            seed: None,
        }
    }

    pub fn tiles() -> Self {
        Self {
            variant: Variant::Tiles(TileTuning::default()),
            scoring: ScoreRules::tiles(),
            preset: DifficultyPreset::default(),
            seed: None,
        }
    }

    /// Stock configuration for a game
    pub fn for_kind(kind: GameKind) -> Self {
        match kind {
            GameKind::Balloon => Self::balloon(),
            GameKind::Bounce => Self::bounce(),
            GameKind::Tiles => Self::tiles(),
        }
    }

    pub fn kind(&self) -> GameKind {
        self.variant.kind()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_preset(mut self, preset: DifficultyPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Parse a JSON override document, e.g.
    /// `{"game": "tiles", "preset": "hard", "tuning": {"grid_size": 5}}`.
    /// Omitted tuning fields keep their stock values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument = serde_json::from_str(json)?;
        let mut config = Self::for_kind(doc.game);

        if let Some(tuning) = doc.tuning {
            config.variant = match doc.game {
                GameKind::Balloon => Variant::Balloon(serde_json::from_value(tuning)?),
                GameKind::Bounce => Variant::Bounce(serde_json::from_value(tuning)?),
                GameKind::Tiles => Variant::Tiles(serde_json::from_value(tuning)?),
            };
        }
        if let Some(scoring) = doc.scoring {
            config.scoring = scoring;
        }
        config.preset = doc.preset;
        config.seed = doc.seed;

        config.validate()?;
        log::info!("Loaded {} configuration", config.kind().title());
        Ok(config)
    }

    /// Reject values that would stall or break the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.variant {
            Variant::Balloon(t) => {
                if t.min_spawn_interval_ms == 0 {
                    return Err(ConfigError::invalid("min_spawn_interval_ms", "must be positive"));
                }
                if t.min_spawn_interval_ms > t.spawn_interval_ms {
                    return Err(ConfigError::invalid(
                        "min_spawn_interval_ms",
                        "must not exceed spawn_interval_ms",
                    ));
                }
                if t.rounds_per_step == 0 {
                    return Err(ConfigError::invalid("rounds_per_step", "must be positive"));
                }
                if t.lifetime_ms == 0 {
                    return Err(ConfigError::invalid("lifetime_ms", "must be positive"));
                }
            }
            Variant::Bounce(t) => {
                if t.initial_balls > t.max_balls {
                    return Err(ConfigError::invalid("initial_balls", "must not exceed max_balls"));
                }
                if t.growth_interval_ms == 0 {
                    return Err(ConfigError::invalid("growth_interval_ms", "must be positive"));
                }
                if !(t.min_speed >= 0.0 && t.min_speed < t.max_speed) {
                    return Err(ConfigError::invalid("min_speed", "must be in [0, max_speed)"));
                }
                if !(t.ball_size > 0.0) {
                    return Err(ConfigError::invalid("ball_size", "must be positive"));
                }
            }
            Variant::Tiles(t) => {
                if t.grid_size == 0 || t.grid_size > tuning::tiles::MAX_GRID_SIZE {
                    return Err(ConfigError::invalid("grid_size", "must be in 1..=64"));
                }
                if !(0.0..=1.0).contains(&t.blue_chance) {
                    return Err(ConfigError::invalid("blue_chance", "must be in [0, 1]"));
                }
                if t.speedup_interval <= 0 {
                    return Err(ConfigError::invalid("speedup_interval", "must be positive"));
                }
                if t.min_active_ms == 0 {
                    return Err(ConfigError::invalid("min_active_ms", "must be positive"));
                }
                if t.min_delay_floor_ms == 0 {
                    return Err(ConfigError::invalid("min_delay_floor_ms", "must be positive"));
                }
                if t.min_active_ms > t.base_active_ms {
                    return Err(ConfigError::invalid(
                        "min_active_ms",
                        "must not exceed base_active_ms",
                    ));
                }
                if t.base_min_delay_ms > t.base_max_delay_ms {
                    return Err(ConfigError::invalid(
                        "base_min_delay_ms",
                        "must not exceed base_max_delay_ms",
                    ));
                }
                if t.min_delay_floor_ms > t.max_delay_floor_ms {
                    return Err(ConfigError::invalid(
                        "min_delay_floor_ms",
                        "must not exceed max_delay_floor_ms",
                    ));
                }
                // Curves step by `stage * step` (twice that for the max delay)
                let stages = Millis::from(t.max_stage);
                if stages.checked_mul(t.active_step_ms).is_none() {
                    return Err(ConfigError::invalid("active_step_ms", "too large for max_stage"));
                }
                if stages
                    .checked_mul(t.delay_step_ms)
                    .and_then(|d| d.checked_mul(2))
                    .is_none()
                {
                    return Err(ConfigError::invalid("delay_step_ms", "too large for max_stage"));
                }
                if t.grace_ms == 0 {
                    return Err(ConfigError::invalid("grace_ms", "must be positive"));
                }
            }
        }
        if let Some(floor) = self.scoring.floor {
            if floor > 0 {
                return Err(ConfigError::invalid("scoring.floor", "must be zero or negative"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_table() {
        let caps: Vec<_> = DifficultyPreset::ALL.iter().map(|p| p.max_concurrent()).collect();
        assert_eq!(caps, vec![1, 2, 3]);
        assert_eq!(DifficultyPreset::Medium.speed_multiplier(), 0.5);
        assert_eq!(DifficultyPreset::from_str("FAST"), Some(DifficultyPreset::Hard));
        assert_eq!(DifficultyPreset::from_str("slow"), Some(DifficultyPreset::Easy));
        assert_eq!(DifficultyPreset::from_str("nightmare"), None);
    }

    #[test]
    fn test_stock_configs_validate() {
        for kind in [GameKind::Balloon, GameKind::Bounce, GameKind::Tiles] {
            let config = GameConfig::for_kind(kind);
            assert_eq!(config.kind(), kind);
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_from_json_overrides() {
        let config = GameConfig::from_json(
            r#"{"game": "tiles", "preset": "fast", "seed": 7, "tuning": {"grid_size": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.preset, DifficultyPreset::Hard);
        assert_eq!(config.seed, Some(7));
        match config.variant {
            Variant::Tiles(t) => {
                assert_eq!(t.grid_size, 5);
                assert_eq!(t.grace_ms, crate::tuning::tiles::RED_GRACE_MS);
            }
            other => panic!("unexpected variant {other:?}"),
        }
        assert_eq!(config.scoring, ScoreRules::tiles());
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = GameConfig::from_json(r#"{"game": "tiles", "tuning": {"blue_chance": 1.5}}"#);
        assert!(matches!(err, Err(ConfigError::Invalid { field: "blue_chance", .. })));

        let err = GameConfig::from_json(r#"{"game": "pinball"}"#);
        assert!(matches!(err, Err(ConfigError::Parse(_))));

        let err = GameConfig::from_json(r#"{"game": "bounce", "tuning": {"initial_balls": 40}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_from_json_rejects_oversized_grid() {
        // Too large to square in a usize; rejected before any engine sees it
        let err = GameConfig::from_json(r#"{"game": "tiles", "tuning": {"grid_size": 4294967296}}"#);
        assert!(err.is_err());

        let err = GameConfig::from_json(r#"{"game": "tiles", "tuning": {"grid_size": 65}}"#);
        assert!(matches!(err, Err(ConfigError::Invalid { field: "grid_size", .. })));
        assert!(GameConfig::from_json(r#"{"game": "tiles", "tuning": {"grid_size": 64}}"#).is_ok());
    }

    #[test]
    fn test_from_json_rejects_overflowing_steps() {
        let err = GameConfig::from_json(&format!(
            r#"{{"game": "tiles", "tuning": {{"delay_step_ms": {}}}}}"#,
            u64::MAX
        ));
        assert!(matches!(err, Err(ConfigError::Invalid { field: "delay_step_ms", .. })));

        let err = GameConfig::from_json(&format!(
            r#"{{"game": "tiles", "tuning": {{"active_step_ms": {}}}}}"#,
            u64::MAX
        ));
        assert!(matches!(err, Err(ConfigError::Invalid { field: "active_step_ms", .. })));
    }

    #[test]
    fn test_from_json_rejects_inverted_ranges() {
        let err = GameConfig::from_json(
            r#"{"game": "tiles", "tuning": {"base_min_delay_ms": 2000, "base_max_delay_ms": 1000}}"#,
        );
        assert!(matches!(err, Err(ConfigError::Invalid { field: "base_min_delay_ms", .. })));

        let err = GameConfig::from_json(
            r#"{"game": "tiles", "tuning": {"min_active_ms": 1600, "base_active_ms": 1500}}"#,
        );
        assert!(matches!(err, Err(ConfigError::Invalid { field: "min_active_ms", .. })));

        let err = GameConfig::from_json(
            r#"{"game": "tiles", "tuning": {"min_delay_floor_ms": 700, "max_delay_floor_ms": 600}}"#,
        );
        assert!(matches!(err, Err(ConfigError::Invalid { field: "min_delay_floor_ms", .. })));
    }

    #[test]
    fn test_zero_floors_name_their_field() {
        let err = GameConfig::from_json(r#"{"game": "tiles", "tuning": {"min_delay_floor_ms": 0}}"#);
        assert!(matches!(err, Err(ConfigError::Invalid { field: "min_delay_floor_ms", .. })));

        let err = GameConfig::from_json(r#"{"game": "tiles", "tuning": {"min_active_ms": 0}}"#);
        assert!(matches!(err, Err(ConfigError::Invalid { field: "min_active_ms", .. })));
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = GameConfig::balloon().with_seed(3);
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
