//! Game objects and their lifecycle
//!
//! Balloons, balls and tiles are all the same shape here: an id, a kind, a
//! placement, a lifecycle state and at most one armed timer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::TimerHandle;

/// Unique object identity. Allocated by the registry, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the object is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Balloon,
    Ball,
    /// Tile to hit
    Red,
    /// Tile to leave alone
    Blue,
}

impl ObjectKind {
    /// Trap kinds reward the player for not touching them
    pub fn is_trap(&self) -> bool {
        matches!(self, ObjectKind::Blue)
    }

    /// Target kinds get a grace window when their time runs out
    pub fn has_grace(&self) -> bool {
        matches!(self, ObjectKind::Red)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Balloon => "balloon",
            ObjectKind::Ball => "ball",
            ObjectKind::Red => "red",
            ObjectKind::Blue => "blue",
        }
    }
}

/// Object lifecycle.
///
/// `Idle -> Active -> (Grace) -> Resolved`. Only registry methods move an
/// object between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Idle,
    Active,
    /// Red-tile forgiveness window; does not count toward the concurrency cap
    Grace,
    Resolved,
}

impl Lifecycle {
    /// Whether `self -> next` is a legal transition
    pub fn can_become(self, next: Lifecycle) -> bool {
        use Lifecycle::*;
        matches!(
            (self, next),
            (Idle, Active) | (Active, Grace) | (Active, Resolved) | (Grace, Resolved)
        )
    }

    /// Still interactable
    pub fn is_live(self) -> bool {
        matches!(self, Lifecycle::Active | Lifecycle::Grace)
    }
}

/// Where an object sits on the playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Position {
    /// Grid cell index (row-major)
    Cell(usize),
    /// Top-left corner in playfield pixels
    Point(Vec2),
}

/// A live game object
#[derive(Debug, Clone)]
pub struct GameObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub position: Position,
    /// Pixels per second; only moving objects have one
    pub velocity: Option<Vec2>,
    /// Footprint (width, height) in pixels; zero for grid cells
    pub size: Vec2,
    pub(crate) state: Lifecycle,
    pub(crate) timer: Option<TimerHandle>,
}

impl GameObject {
    /// New idle object. The registry assigns the id on insertion.
    pub fn new(kind: ObjectKind, position: Position) -> Self {
        Self {
            id: ObjectId(0),
            kind,
            position,
            velocity: None,
            size: Vec2::ZERO,
            state: Lifecycle::Idle,
            timer: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Grid cell, if placed on one
    pub fn cell(&self) -> Option<usize> {
        match self.position {
            Position::Cell(cell) => Some(cell),
            Position::Point(_) => None,
        }
    }
}
