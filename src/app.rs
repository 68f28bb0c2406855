//! Application context
//!
//! Owns the game controller together with the scheduler that drives it, and
//! plays the part of the event loop: key presses go in through `press`, and
//! `advance` fires every timer that falls due.

use serde::Serialize;

use crate::settings::Settings;
use crate::sim::{Game, GameEvent, GamePhase, Key, Scheduler, Timer};

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: i32,
    pub bricks_remaining: usize,
    pub elapsed_ms: u64,
}

/// Scripted player for demo runs.
///
/// Launches the ball after a short delay, then nudges the paddle toward the
/// ball with a slowly drifting offset so rallies don't settle into one loop.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Ticks to wait on the start prompt before pressing Space
    pub serve_delay_ticks: u32,
    /// Dead zone around the target (in playfield units)
    pub dead_zone: f32,
    waited: u32,
    ticks: u64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            serve_delay_ticks: 2,
            dead_zone: 10.0,
            waited: 0,
            ticks: 0,
        }
    }
}

impl Autopilot {
    /// Pick the key to press for the current game state, if any
    pub fn decide(&mut self, game: &Game) -> Option<Key> {
        self.ticks += 1;
        match game.phase() {
            GamePhase::WaitingToStart => {
                self.waited += 1;
                if self.waited >= self.serve_delay_ticks {
                    self.waited = 0;
                    Some(Key::Space)
                } else {
                    None
                }
            }
            GamePhase::Running => {
                let ball = game.ball()?.position(game.canvas())?.center();
                let paddle = game.paddle().position(game.canvas())?;
                // Aim somewhere across the paddle face instead of dead center
                let t = self.ticks as f32 * 0.013;
                let offset = (t.sin() * 0.6 + (t * 0.37).sin() * 0.3) * paddle.width() / 2.0;
                let target = ball.x - offset;
                let x = paddle.center().x;
                if target < x - self.dead_zone {
                    Some(Key::Left)
                } else if target > x + self.dead_zone {
                    Some(Key::Right)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// The running application: controller plus its event loop state
#[derive(Debug)]
pub struct AppContext {
    game: Game,
    scheduler: Scheduler,
    autopilot: Option<Autopilot>,
}

impl AppContext {
    /// Build the game and schedule its first timers
    pub fn new(settings: Settings, seed: u64) -> Self {
        let mut scheduler = Scheduler::new();
        let mut game = Game::new(settings, seed);
        game.start(&mut scheduler);
        Self {
            game,
            scheduler,
            autopilot: None,
        }
    }

    /// Let an `Autopilot` play, one decision per game tick
    pub fn with_autopilot(mut self, autopilot: Autopilot) -> Self {
        self.autopilot = Some(autopilot);
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Live timers still queued
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn is_finished(&self) -> bool {
        self.game.phase().is_terminal()
    }

    /// Deliver a key press
    pub fn press(&mut self, key: Key) -> Vec<GameEvent> {
        self.game.handle_key(key, &mut self.scheduler);
        self.game.drain_events()
    }

    /// Fire every timer due in the next `ms` milliseconds
    pub fn advance(&mut self, ms: u64) -> Vec<GameEvent> {
        let deadline = self.scheduler.now() + ms;
        let mut events = Vec::new();
        while let Some(timer) = self.scheduler.pop_due(deadline) {
            self.dispatch(timer);
            events.append(&mut self.game.drain_events());
        }
        self.scheduler.advance_to(deadline);
        events
    }

    fn dispatch(&mut self, timer: Timer) {
        self.game.on_timer(timer, &mut self.scheduler);
        // The autopilot reacts on the tick cadence, and on the start prompt
        // where no ticks run
        let reacts = match timer {
            Timer::GameTick => true,
            Timer::SpeedTimer | Timer::NewRound => {
                self.game.phase() == GamePhase::WaitingToStart
            }
        };
        if !reacts {
            return;
        }
        if let Some(key) = self.autopilot.as_mut().and_then(|a| a.decide(&self.game)) {
            self.game.handle_key(key, &mut self.scheduler);
        }
    }

    /// Run until a terminal phase or until `max_ms` of game time has passed.
    ///
    /// `on_step` sees each batch of events along with the current time.
    pub fn run(&mut self, max_ms: u64, mut on_step: impl FnMut(u64, &[GameEvent])) -> GameSummary {
        let limit = self.scheduler.now() + max_ms;
        while !self.is_finished() {
            let Some(due) = self.scheduler.next_due() else {
                break;
            };
            if due > limit {
                break;
            }
            let step = due - self.scheduler.now();
            let events = self.advance(step);
            on_step(self.scheduler.now(), &events);
        }
        self.summary()
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            phase: self.game.phase(),
            score: self.game.score(),
            lives: self.game.lives(),
            bricks_remaining: self.game.bricks_remaining(),
            elapsed_ms: self.scheduler.now(),
        }
    }
}
