//! Deterministic game core
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Virtual clock only (the host advances it)
//! - Seeded RNG only
//! - Stable iteration order (by object ID)
//! - No DOM or platform dependencies

pub mod activation;
pub mod clock;
pub mod engine;
pub mod motion;
pub mod object;
pub mod registry;
pub mod scoring;

pub use activation::ActivationPolicy;
pub use clock::{Millis, Scheduler, TimerHandle};
pub use engine::{DEFAULT_SEED, GameEngine, RunState, TimerEvent};
pub use motion::{Bounds, integrate, reflect_velocity};
pub use object::{GameObject, Lifecycle, ObjectId, ObjectKind, Position};
pub use registry::ObjectRegistry;
pub use scoring::{Outcome, ScoreChange, ScoreRules, ScoringPolicy};
