//! Entities reachable from the canvas id map

use super::brick::Brick;
use super::canvas::{Aabb, Canvas, ShapeHandle};

/// A collidable entity, keyed by its shape id in the game's entity map
#[derive(Debug, Clone)]
pub enum Entity {
    /// The player's paddle (the `Paddle` itself lives on the controller)
    Paddle(ShapeHandle),
    Brick(Brick),
}

impl Entity {
    pub fn handle(&self) -> ShapeHandle {
        match self {
            Entity::Paddle(handle) => *handle,
            Entity::Brick(brick) => brick.handle(),
        }
    }

    pub fn bounds(&self, canvas: &Canvas) -> Option<Aabb> {
        self.handle().position(canvas)
    }

    pub fn is_brick(&self) -> bool {
        matches!(self, Entity::Brick(_))
    }
}
