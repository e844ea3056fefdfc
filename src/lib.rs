//! Reflex Arcade - timed reflex mini-games on one engine
//!
//! Three games share a single timed-activation / scoring state machine:
//! - Balloon Dash: pop balloons before they float away
//! - Hyper Bounce: click bouncing balls while the population grows
//! - Reaction Grid: hit red tiles, leave blue ones alone
//!
//! Core modules:
//! - `sim`: Deterministic engine (scheduler, registry, policies, controller)
//! - `view`: Presentation interface the engine drives
//! - `config`: Game configuration and difficulty presets
//! - `tuning`: Data-driven game balance

pub mod config;
pub mod error;
pub mod sim;
pub mod tuning;
pub mod view;

pub use config::{DifficultyPreset, GameConfig, GameKind, Variant};
pub use error::{ConfigError, InitError};
pub use sim::{GameEngine, RunState};
pub use view::{Presenter, RecordingPresenter, Removal, Tone};
