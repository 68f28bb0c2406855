//! Break Those Bricks - A classic paddle and bricks arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (canvas, entities, collisions, game state)
//! - `app`: Application context wiring input and timers to the game
//! - `renderer`: Text snapshots of the canvas
//! - `settings`: Data-driven game tuning

pub mod app;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use app::{AppContext, Autopilot, GameSummary};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use crate::sim::Rgb;

    /// Window title
    pub const WINDOW_TITLE: &str = "Game Break Those Bricks";

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Units moved per tick
    pub const BALL_START_SPEED: f32 = 5.0;
    /// Spawn height of a fresh ball (just above the paddle)
    pub const BALL_SPAWN_Y: f32 = 530.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 10.0;
    pub const PADDLE_Y: f32 = 550.0;
    /// Horizontal nudge per arrow key press
    pub const PADDLE_STEP: f32 = 20.0;

    /// Brick defaults
    pub const BRICK_WIDTH: f32 = 75.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    /// Horizontal distance between brick columns
    pub const BRICK_PITCH: f32 = 85.0;
    /// Left margin of the first brick column
    pub const BRICK_MARGIN: f32 = 5.0;
    /// Canvas tag shared by every live brick
    pub const BRICK_TAG: &str = "brick";

    /// Scoring and lives
    pub const START_LIVES: i32 = 3;
    pub const SCORE_PER_BRICK: u64 = 10;

    /// Scheduling (milliseconds)
    pub const TICK_MS: u64 = 50;
    pub const TIMER_MS: u64 = 1000;
    pub const RESPAWN_DELAY_MS: u64 = 1000;

    /// Difficulty ramp
    pub const SPEED_UP_SECS: u32 = 15;
    pub const SPEED_STEP: f32 = 1.0;

    /// Palette
    pub const BACKGROUND: Rgb = Rgb(0x2F4F4F);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);
    pub const CYAN: Rgb = Rgb(0x00FFFF);
    pub const GOLD: Rgb = Rgb(0xFFD700);
    pub const RED: Rgb = Rgb(0xFF0000);
    pub const PADDLE_FILL: Rgb = Rgb(0xFF5733);
    pub const PADDLE_OUTLINE: Rgb = Rgb(0xFFBD33);
    pub const BRICK_DAMAGED: Rgb = Rgb(0xD6D1F5);
    /// Fresh brick colors (blues), picked at random per brick
    pub const BRICK_PALETTE: [Rgb; 4] = [
        Rgb(0x00FFFF),
        Rgb(0x1E90FF),
        Rgb(0x4682B4),
        Rgb(0x5F9EA0),
    ];
}
