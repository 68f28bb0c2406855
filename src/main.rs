//! Break Those Bricks entry point
//!
//! Builds the application context and runs the game loop with the autopilot
//! at the controls until the game ends or the time cap is hit.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use break_bricks::consts::WINDOW_TITLE;
use break_bricks::sim::GameEvent;
use break_bricks::{AppContext, Autopilot, Settings, renderer};

#[derive(Debug, Parser)]
#[command(name = "break-bricks")]
#[command(about = "Paddle-and-bricks arcade game (autopilot demo)")]
struct Cli {
    /// Seed for the brick colors (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this many seconds of game time
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,
    /// Pace the game loop to wall-clock time
    #[arg(long, default_value_t = false)]
    realtime: bool,
    /// Print a text snapshot of the playfield at the end
    #[arg(long, default_value_t = false)]
    frame: bool,
    /// Print the final summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seed = match cli.seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the Unix epoch")?
            .as_millis() as u64,
    };

    log::info!("{} starting (seed {})", WINDOW_TITLE, seed);
    let mut app = AppContext::new(settings, seed).with_autopilot(Autopilot::default());

    let mut last = app.now();
    let summary = app.run(cli.max_seconds * 1000, |now, events| {
        if cli.realtime {
            thread::sleep(Duration::from_millis(now.saturating_sub(last)));
        }
        last = now;
        for event in events {
            match event {
                GameEvent::LifeLost { lives } => log::debug!("{}s: life lost ({} left)", now / 1000, lives),
                GameEvent::SpeedIncreased { speed } => log::debug!("{}s: speed {}", now / 1000, speed),
                _ => {}
            }
        }
    });

    if cli.frame {
        println!("{}", renderer::render(app.game().canvas(), 80, 30));
    }
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
        );
    } else {
        println!(
            "{:?} after {:.1}s - score {}, lives {}, bricks left {}",
            summary.phase,
            summary.elapsed_ms as f64 / 1000.0,
            summary.score,
            summary.lives.max(0),
            summary.bricks_remaining
        );
    }
    Ok(())
}
