//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick cadence only
//! - Seeded RNG only
//! - Stable iteration order (by shape ID)
//! - No rendering or platform dependencies

pub mod ball;
pub mod brick;
pub mod canvas;
pub mod entity;
pub mod game;
pub mod paddle;
pub mod scheduler;

pub use ball::Ball;
pub use brick::{Brick, HitOutcome};
pub use canvas::{Aabb, Canvas, Rgb, Shape, ShapeHandle, ShapeId, ShapeKind};
pub use entity::Entity;
pub use game::{Game, GameEvent, GamePhase, Key};
pub use paddle::Paddle;
pub use scheduler::{CancelToken, Scheduler, Timer};
