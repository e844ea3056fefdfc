//! Error types
//!
//! The engine itself never fails: stale timers and stale clicks are silent
//! no-ops. Errors only exist at the edges, when a host is wired up or a
//! configuration document is loaded.

use thiserror::Error;

/// Host initialization failure. The game refuses to run against a partial UI.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("{game}: required element `{element}` is missing")]
    MissingElement {
        game: &'static str,
        element: &'static str,
    },
    #[error("unknown game `{0}` (expected balloon, bounce or tiles)")]
    UnknownGame(String),
    #[error("host environment unavailable: {0}")]
    NoHost(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { field, reason }
    }
}
