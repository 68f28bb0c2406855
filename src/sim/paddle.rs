//! The player's paddle

use glam::Vec2;

use super::canvas::{Aabb, Canvas, ShapeHandle, ShapeId};
use crate::consts::*;

/// Player-controlled rectangle near the bottom of the playfield
#[derive(Debug, Clone)]
pub struct Paddle {
    handle: ShapeHandle,
    size: Vec2,
    /// Ball being carried before launch
    carried: Option<ShapeHandle>,
}

impl Paddle {
    pub fn new(canvas: &mut Canvas, center: Vec2, size: Vec2) -> Self {
        let id = canvas.create_rectangle(
            Aabb::from_center(center, size),
            PADDLE_FILL,
            PADDLE_OUTLINE,
            3.0,
            &[],
        );
        Self {
            handle: ShapeHandle::new(id),
            size,
            carried: None,
        }
    }

    pub fn handle(&self) -> ShapeHandle {
        self.handle
    }

    pub fn id(&self) -> ShapeId {
        self.handle.id()
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn position(&self, canvas: &Canvas) -> Option<Aabb> {
        self.handle.position(canvas)
    }

    /// Attach a ball so it follows the paddle until launch
    pub fn set_ball(&mut self, ball: ShapeHandle) {
        self.carried = Some(ball);
    }

    pub fn release_ball(&mut self) {
        self.carried = None;
    }

    pub fn carried_ball(&self) -> Option<ShapeHandle> {
        self.carried
    }

    /// Shift horizontally, dragging a carried ball along.
    ///
    /// Rejected (returns false) if either edge would leave the playfield.
    pub fn move_by(&mut self, canvas: &mut Canvas, offset: f32) -> bool {
        let Some(bounds) = self.position(canvas) else {
            return false;
        };
        if bounds.min.x + offset < 0.0 || bounds.max.x + offset > canvas.width() {
            return false;
        }
        let delta = Vec2::new(offset, 0.0);
        self.handle.move_by(canvas, delta);
        if let Some(ball) = self.carried {
            ball.move_by(canvas, delta);
        }
        true
    }
}
