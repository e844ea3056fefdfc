//! Playfield geometry and linear motion
//!
//! Objects are axis-aligned boxes positioned by their top-left corner. Moving
//! objects integrate linearly and reflect off the playfield edges.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Largest top-left corner that keeps a `size` footprint inside (never negative)
    pub fn max_corner(&self, size: Vec2) -> Vec2 {
        Vec2::new(
            (self.width - size.x).max(0.0),
            (self.height - size.y).max(0.0),
        )
    }

    /// Clamp a top-left corner so the footprint stays inside
    pub fn clamp(&self, pos: Vec2, size: Vec2) -> Vec2 {
        pos.clamp(Vec2::ZERO, self.max_corner(size))
    }
}

/// Reflect velocity off a surface with the given normal
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Advance one box by `dt` seconds. Reflects the velocity component of any
/// edge it reached while heading into it, and clamps the position back in.
/// Returns true if it bounced.
pub fn integrate(pos: &mut Vec2, vel: &mut Vec2, size: Vec2, bounds: Bounds, dt: f32) -> bool {
    *pos += *vel * dt;
    let max = bounds.max_corner(size);

    // (touching, inward normal)
    let walls = [
        (pos.x <= 0.0, Vec2::X),
        (pos.x >= max.x, Vec2::NEG_X),
        (pos.y <= 0.0, Vec2::Y),
        (pos.y >= max.y, Vec2::NEG_Y),
    ];

    let mut bounced = false;
    for (touching, normal) in walls {
        if touching && vel.dot(normal) < 0.0 {
            *vel = reflect_velocity(*vel, normal);
            bounced = true;
        }
    }
    *pos = pos.clamp(Vec2::ZERO, max);
    bounced
}
