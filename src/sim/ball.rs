//! The bouncing ball
//!
//! Movement is a fixed step per tick: `direction * speed`, where each
//! direction component is always exactly +1 or -1. Collision response only
//! ever flips or forces those signs.

use glam::Vec2;

use super::brick::HitOutcome;
use super::canvas::{Aabb, Canvas, ShapeHandle, ShapeId};
use super::entity::Entity;
use crate::consts::*;

/// Outcome of one brick being struck during `Ball::collide`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrickHit {
    pub id: ShapeId,
    pub outcome: HitOutcome,
}

/// A ball entity
#[derive(Debug, Clone)]
pub struct Ball {
    handle: ShapeHandle,
    radius: f32,
    direction: Vec2,
    /// Units per tick; `None` once the ball is out of play
    speed: Option<f32>,
}

impl Ball {
    /// Draw a new ball centered on `center`, heading up and to the right
    pub fn new(canvas: &mut Canvas, center: Vec2, radius: f32, speed: f32) -> Self {
        let id = canvas.create_oval(
            Aabb::from_center(center, Vec2::splat(radius * 2.0)),
            WHITE,
            CYAN,
            2.0,
        );
        Self {
            handle: ShapeHandle::new(id),
            radius,
            direction: Vec2::new(1.0, -1.0),
            speed: Some(speed),
        }
    }

    pub fn handle(&self) -> ShapeHandle {
        self.handle
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn speed(&self) -> Option<f32> {
        self.speed
    }

    pub fn is_active(&self) -> bool {
        self.speed.is_some()
    }

    pub fn position(&self, canvas: &Canvas) -> Option<Aabb> {
        self.handle.position(canvas)
    }

    /// Take the ball out of play (stops `update` from moving it)
    pub fn deactivate(&mut self) {
        self.speed = None;
    }

    /// Increase speed while active; returns the new speed
    pub fn accelerate(&mut self, step: f32) -> Option<f32> {
        if let Some(speed) = self.speed.as_mut() {
            *speed += step;
        }
        self.speed
    }

    /// Bounce off the side walls and ceiling, then advance one step
    pub fn update(&mut self, canvas: &mut Canvas) {
        let Some(speed) = self.speed else {
            return;
        };
        let Some(bounds) = self.position(canvas) else {
            return;
        };
        if bounds.min.x <= 0.0 || bounds.max.x >= canvas.width() {
            self.direction.x = -self.direction.x;
        }
        if bounds.min.y <= 0.0 {
            self.direction.y = -self.direction.y;
        }
        self.handle.move_by(canvas, self.direction * speed);
    }

    /// Respond to everything the ball currently overlaps.
    ///
    /// Several contacts at once just flip the vertical direction. A single
    /// contact redirects sideways when the ball's center is past one of its
    /// horizontal edges, and flips vertically otherwise. Every brick in
    /// `contacts` takes exactly one hit regardless.
    pub fn collide(&mut self, canvas: &mut Canvas, contacts: &mut [&mut Entity]) -> Vec<BrickHit> {
        let Some(bounds) = self.position(canvas) else {
            return Vec::new();
        };
        let x = bounds.center().x;

        match contacts {
            [] => {}
            [single] => {
                if let Some(other) = single.bounds(canvas) {
                    if x > other.max.x {
                        self.direction.x = 1.0;
                    } else if x < other.min.x {
                        self.direction.x = -1.0;
                    } else {
                        self.direction.y = -self.direction.y;
                    }
                }
            }
            _ => self.direction.y = -self.direction.y,
        }

        let mut hits = Vec::new();
        for entity in contacts.iter_mut() {
            if let Entity::Brick(brick) = &mut **entity {
                hits.push(BrickHit {
                    id: brick.id(),
                    outcome: brick.hit(canvas),
                });
            }
        }
        hits
    }
}
