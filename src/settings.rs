//! Game tuning
//!
//! Every gameplay constant is data-driven through `Settings`. Defaults match
//! the classic layout; a JSON file can override any subset of fields.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// One horizontal band of bricks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrickRow {
    /// Vertical center of the row
    pub y: f32,
    /// Hits needed to destroy a brick in this row
    pub hits: u32,
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub width: f32,
    pub height: f32,

    // === Ball ===
    pub ball_radius: f32,
    /// Units per tick for a fresh ball
    pub ball_start_speed: f32,
    pub ball_spawn_y: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_y: f32,
    pub paddle_step: f32,

    // === Bricks ===
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_pitch: f32,
    pub brick_margin: f32,
    /// Rows from top to bottom
    pub brick_rows: Vec<BrickRow>,

    // === Rules ===
    pub lives: i32,
    pub score_per_brick: u64,

    // === Timing (ms) ===
    pub tick_ms: u64,
    pub timer_ms: u64,
    pub respawn_delay_ms: u64,

    // === Difficulty ramp ===
    /// Countdown length in timer periods
    pub speed_up_secs: u32,
    pub speed_step: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,

            ball_radius: BALL_RADIUS,
            ball_start_speed: BALL_START_SPEED,
            ball_spawn_y: BALL_SPAWN_Y,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_y: PADDLE_Y,
            paddle_step: PADDLE_STEP,

            brick_width: BRICK_WIDTH,
            brick_height: BRICK_HEIGHT,
            brick_pitch: BRICK_PITCH,
            brick_margin: BRICK_MARGIN,
            brick_rows: vec![
                BrickRow { y: 50.0, hits: 3 },
                BrickRow { y: 80.0, hits: 2 },
                BrickRow { y: 110.0, hits: 1 },
            ],

            lives: START_LIVES,
            score_per_brick: SCORE_PER_BRICK,

            tick_ms: TICK_MS,
            timer_ms: TIMER_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,

            speed_up_secs: SPEED_UP_SECS,
            speed_step: SPEED_STEP,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("invalid settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = Self::from_json(&json)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject layouts the game cannot run
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            bail!("playfield must have a positive size ({}x{})", self.width, self.height);
        }
        if self.paddle_width <= 0.0 || self.paddle_width > self.width {
            bail!("paddle width {} does not fit the playfield", self.paddle_width);
        }
        if self.ball_radius <= 0.0 {
            bail!("ball radius must be positive");
        }
        if self.ball_start_speed < 0.0 || self.speed_step < 0.0 {
            bail!("ball speed and speed step must not be negative");
        }
        if self.brick_pitch <= 0.0 {
            bail!("brick pitch must be positive");
        }
        if self.brick_rows.is_empty() {
            bail!("at least one brick row is required");
        }
        if let Some(row) = self.brick_rows.iter().find(|r| r.hits == 0) {
            bail!("brick row at y={} has zero hits", row.y);
        }
        if self.tick_ms == 0 || self.timer_ms == 0 {
            bail!("tick and timer periods must be non-zero");
        }
        if self.speed_up_secs == 0 {
            bail!("speed-up countdown must be at least one period");
        }
        Ok(())
    }

    /// Left edges of each brick column
    pub fn brick_columns(&self) -> impl Iterator<Item = f32> + '_ {
        let end = self.width - self.brick_margin;
        (0..)
            .map(move |i| self.brick_margin + i as f32 * self.brick_pitch)
            .take_while(move |x| *x < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.lives, 3);
        assert_eq!(settings.brick_columns().count(), 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "lives": 5, "tick_ms": 20 }"#).unwrap();
        assert_eq!(settings.lives, 5);
        assert_eq!(settings.tick_ms, 20);
        assert_eq!(settings.width, PLAYFIELD_WIDTH);
        assert_eq!(settings.brick_rows.len(), 3);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(Settings::from_json(r#"{ "brick_rows": [] }"#).is_err());
        assert!(Settings::from_json(r#"{ "brick_rows": [{ "y": 50.0, "hits": 0 }] }"#).is_err());
        assert!(Settings::from_json(r#"{ "paddle_width": 900.0 }"#).is_err());
        assert!(Settings::from_json(r#"{ "tick_ms": 0 }"#).is_err());
        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = Settings::load(Path::new("/nonexistent/bricks.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/bricks.json"));
    }
}
