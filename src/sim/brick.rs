//! Destructible bricks

use glam::Vec2;

use super::canvas::{Aabb, Canvas, Rgb, ShapeHandle, ShapeId};
use crate::consts::*;

/// Result of hitting a brick once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Brick survived with this many hits left
    Damaged { remaining: u32 },
    /// Brick reached zero and was removed from the canvas
    Destroyed,
}

/// A brick with a hit counter
#[derive(Debug, Clone)]
pub struct Brick {
    handle: ShapeHandle,
    hits: u32,
}

impl Brick {
    /// Draw a brick centered on `center` with the given durability
    pub fn new(canvas: &mut Canvas, center: Vec2, size: Vec2, hits: u32, color: Rgb) -> Self {
        let id = canvas.create_rectangle(
            Aabb::from_center(center, size),
            color,
            WHITE,
            1.0,
            &[BRICK_TAG],
        );
        Self {
            handle: ShapeHandle::new(id),
            hits,
        }
    }

    pub fn handle(&self) -> ShapeHandle {
        self.handle
    }

    pub fn id(&self) -> ShapeId {
        self.handle.id()
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Take one hit: tint when damaged, delete the shape at zero
    pub fn hit(&mut self, canvas: &mut Canvas) -> HitOutcome {
        debug_assert!(self.hits > 0, "hit on a destroyed brick");
        self.hits = self.hits.saturating_sub(1);
        if self.hits == 0 {
            self.handle.delete(canvas);
            HitOutcome::Destroyed
        } else {
            canvas.set_fill(self.handle.id(), BRICK_DAMAGED);
            HitOutcome::Damaged {
                remaining: self.hits,
            }
        }
    }
}
