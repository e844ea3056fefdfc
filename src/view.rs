//! Presentation interface
//!
//! The engine never touches the DOM. It drives a `Presenter`, which the web
//! host implements on top of real elements and tests implement by recording.

use crate::sim::{Bounds, ObjectId, ObjectKind, Outcome, Position, RunState};

/// Status line tone (tile game)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Positive,
    Negative,
}

/// Why a visual is going away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Resolved by play; the host may animate it
    Resolved(Outcome),
    /// Swept away by reset or a difficulty change
    Cleared,
}

/// Capabilities the engine needs from its host
pub trait Presenter {
    /// Draw a newly activated object
    fn render_object_at(&mut self, id: ObjectId, kind: ObjectKind, position: Position);

    /// Move an existing visual (bounce frames, resize)
    fn move_object_visual(&mut self, id: ObjectId, position: Position);

    /// Play the resolution animation and detach the visual
    fn remove_object_visual(&mut self, id: ObjectId, removal: Removal);

    /// Show the new score; the delta sign picks the gain/loss flash
    fn update_score_display(&mut self, score: i64, delta: i64);

    /// Tile-game status line
    fn set_status_message(&mut self, text: &str, tone: Tone);

    /// Relabel the run controls (start / pause-resume / reset)
    fn set_run_state(&mut self, state: RunState);

    /// Current playfield size, queried before each placement
    fn playfield_bounds(&self) -> Bounds;
}

/// One recorded presenter call
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Render(ObjectId, ObjectKind, Position),
    Move(ObjectId, Position),
    Remove(ObjectId, Removal),
    Score { score: i64, delta: i64 },
    Status(String, Tone),
    RunState(RunState),
}

/// Presenter that records every call, for headless hosts and tests
#[derive(Debug, Clone)]
pub struct RecordingPresenter {
    pub bounds: Bounds,
    pub calls: Vec<ViewCall>,
    /// Record `Move` calls (they dominate bounce sessions)
    pub record_moves: bool,
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self::new(Bounds::new(800.0, 600.0))
    }
}

impl RecordingPresenter {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            calls: Vec::new(),
            record_moves: false,
        }
    }

    /// Drain the recorded calls
    pub fn take(&mut self) -> Vec<ViewCall> {
        std::mem::take(&mut self.calls)
    }

    /// Last status message, if any
    pub fn last_status(&self) -> Option<(&str, Tone)> {
        self.calls.iter().rev().find_map(|c| match c {
            ViewCall::Status(text, tone) => Some((text.as_str(), *tone)),
            _ => None,
        })
    }

    /// Last score shown, if any
    pub fn last_score(&self) -> Option<i64> {
        self.calls.iter().rev().find_map(|c| match c {
            ViewCall::Score { score, .. } => Some(*score),
            _ => None,
        })
    }

    pub fn rendered(&self) -> Vec<(ObjectId, ObjectKind, Position)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ViewCall::Render(id, kind, pos) => Some((*id, *kind, *pos)),
                _ => None,
            })
            .collect()
    }

    pub fn removed(&self) -> Vec<(ObjectId, Removal)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ViewCall::Remove(id, removal) => Some((*id, *removal)),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn render_object_at(&mut self, id: ObjectId, kind: ObjectKind, position: Position) {
        self.calls.push(ViewCall::Render(id, kind, position));
    }

    fn move_object_visual(&mut self, id: ObjectId, position: Position) {
        if self.record_moves {
            self.calls.push(ViewCall::Move(id, position));
        }
    }

    fn remove_object_visual(&mut self, id: ObjectId, removal: Removal) {
        self.calls.push(ViewCall::Remove(id, removal));
    }

    fn update_score_display(&mut self, score: i64, delta: i64) {
        self.calls.push(ViewCall::Score { score, delta });
    }

    fn set_status_message(&mut self, text: &str, tone: Tone) {
        self.calls.push(ViewCall::Status(text.to_string(), tone));
    }

    fn set_run_state(&mut self, state: RunState) {
        self.calls.push(ViewCall::RunState(state));
    }

    fn playfield_bounds(&self) -> Bounds {
        self.bounds
    }
}
