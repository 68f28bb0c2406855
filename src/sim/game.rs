//! Game controller
//!
//! Owns the canvas and every entity on it, and advances the game in response
//! to key presses and scheduler timers. Phase flow:
//!
//! ```text
//! WaitingToStart --Space--> Running --ball lost, lives >= 0--> LifeLost --1s--> WaitingToStart
//!                              |--no bricks left--> Won
//!                              `--ball lost, lives < 0--> GameOver
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::brick::{Brick, HitOutcome};
use super::canvas::{Canvas, Rgb, ShapeHandle, ShapeId};
use super::entity::Entity;
use super::paddle::Paddle;
use super::scheduler::{CancelToken, Scheduler, Timer};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball carried by the paddle, waiting for Space
    WaitingToStart,
    /// Ball in play, tick chain active
    Running,
    /// Ball lost with lives remaining; next round pending
    LifeLost,
    /// Every brick destroyed (terminal)
    Won,
    /// Out of lives (terminal)
    GameOver,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::GameOver)
    }
}

/// Keyboard input the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Space,
}

/// Notable things that happened, drained by the app layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Launched,
    BrickHit { id: ShapeId, remaining: u32 },
    BrickDestroyed { id: ShapeId },
    SpeedIncreased { speed: f32 },
    LifeLost { lives: i32 },
    Won { score: u64 },
    GameOver { score: u64 },
}

/// The game controller
#[derive(Debug)]
pub struct Game {
    settings: Settings,
    canvas: Canvas,
    paddle: Paddle,
    ball: Option<Ball>,
    /// Shape id -> entity for everything the ball can hit
    entities: BTreeMap<ShapeId, Entity>,
    lives: i32,
    score: u64,
    /// Seconds until the next speed increase
    time_left: u32,
    phase: GamePhase,
    hud: Option<ShapeHandle>,
    /// Centered overlay (start prompt, end text)
    message: Option<ShapeHandle>,
    speed_timer: Option<CancelToken>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Lay out the paddle and brick grid. Nothing is scheduled until `start`.
    pub fn new(settings: Settings, seed: u64) -> Self {
        let mut canvas = Canvas::new(settings.width, settings.height, BACKGROUND);
        let paddle = Paddle::new(
            &mut canvas,
            Vec2::new(settings.width / 2.0, settings.paddle_y),
            Vec2::new(settings.paddle_width, settings.paddle_height),
        );

        let mut entities = BTreeMap::new();
        entities.insert(paddle.id(), Entity::Paddle(paddle.handle()));

        let mut rng = Pcg32::seed_from_u64(seed);
        let size = Vec2::new(settings.brick_width, settings.brick_height);
        let half_pitch = settings.brick_pitch / 2.0;
        for x in settings.brick_columns() {
            for row in &settings.brick_rows {
                let color = BRICK_PALETTE[rng.random_range(0..BRICK_PALETTE.len())];
                let center = Vec2::new(x + half_pitch, row.y);
                let brick = Brick::new(&mut canvas, center, size, row.hits, color);
                entities.insert(brick.id(), Entity::Brick(brick));
            }
        }

        Self {
            time_left: settings.speed_up_secs,
            lives: settings.lives,
            settings,
            canvas,
            paddle,
            ball: None,
            entities,
            score: 0,
            phase: GamePhase::WaitingToStart,
            hud: None,
            message: None,
            speed_timer: None,
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn ball(&self) -> Option<&Ball> {
        self.ball.as_ref()
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn entities(&self) -> &BTreeMap<ShapeId, Entity> {
        &self.entities
    }

    pub fn bricks(&self) -> impl Iterator<Item = &Brick> {
        self.entities.values().filter_map(|e| match e {
            Entity::Brick(brick) => Some(brick),
            Entity::Paddle(_) => None,
        })
    }

    pub fn bricks_remaining(&self) -> usize {
        self.bricks().count()
    }

    /// Current HUD line
    pub fn hud_text(&self) -> Option<&str> {
        self.hud.and_then(|h| self.canvas.text(h.id()))
    }

    /// Current centered overlay text
    pub fn message_text(&self) -> Option<&str> {
        self.message.and_then(|h| self.canvas.text(h.id()))
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Set up the first round and start the speed timer (once per game)
    pub fn start(&mut self, sched: &mut Scheduler) {
        log::info!(
            "Game starting: {} bricks, {} lives",
            self.bricks_remaining(),
            self.lives
        );
        self.setup_round();

        let token = CancelToken::new();
        sched.after_with_token(self.settings.timer_ms, Timer::SpeedTimer, &token);
        self.speed_timer = Some(token);
    }

    /// Dispatch a key press
    pub fn handle_key(&mut self, key: Key, sched: &mut Scheduler) {
        match key {
            Key::Left => {
                self.paddle.move_by(&mut self.canvas, -self.settings.paddle_step);
            }
            Key::Right => {
                self.paddle.move_by(&mut self.canvas, self.settings.paddle_step);
            }
            Key::Space => {
                if self.phase == GamePhase::WaitingToStart {
                    self.launch(sched);
                }
            }
        }
    }

    /// Dispatch a fired timer
    pub fn on_timer(&mut self, timer: Timer, sched: &mut Scheduler) {
        match timer {
            Timer::GameTick => self.game_loop(sched),
            Timer::SpeedTimer => self.update_timer(sched),
            Timer::NewRound => {
                if self.phase == GamePhase::LifeLost {
                    self.setup_round();
                }
            }
        }
    }

    /// Fresh ball on the paddle, HUD refresh and start prompt
    fn setup_round(&mut self) {
        self.add_ball();
        self.update_hud();
        self.show_message("Press Space to Start", 30, WHITE);
        self.phase = GamePhase::WaitingToStart;
        log::debug!("Round ready, {} lives left", self.lives);
    }

    fn add_ball(&mut self) {
        if let Some(old) = self.ball.take() {
            old.handle().delete(&mut self.canvas);
        }
        let x = self
            .paddle
            .position(&self.canvas)
            .map(|b| b.center().x)
            .unwrap_or(self.settings.width / 2.0);
        let ball = Ball::new(
            &mut self.canvas,
            Vec2::new(x, self.settings.ball_spawn_y),
            self.settings.ball_radius,
            self.settings.ball_start_speed,
        );
        self.paddle.set_ball(ball.handle());
        self.ball = Some(ball);
    }

    fn launch(&mut self, sched: &mut Scheduler) {
        self.clear_message();
        self.paddle.release_ball();
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Launched);
        log::info!("Ball launched");
        self.game_loop(sched);
    }

    /// One tick: collide, score, then win/loss check or advance
    fn game_loop(&mut self, sched: &mut Scheduler) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.check_collisions();

        let ball_bottom = self
            .ball
            .as_ref()
            .and_then(|b| b.position(&self.canvas))
            .map(|b| b.max.y);

        if self.bricks_remaining() == 0 {
            self.finish(GamePhase::Won);
        } else if ball_bottom.is_none_or(|y| y >= self.settings.height) {
            self.lose_ball(sched);
        } else {
            if let Some(ball) = self.ball.as_mut() {
                ball.update(&mut self.canvas);
            }
            log::trace!("tick at {}ms", sched.now());
            sched.after(self.settings.tick_ms, Timer::GameTick);
        }
    }

    fn check_collisions(&mut self) {
        let Some(ball) = self.ball.as_mut() else {
            return;
        };
        let Some(area) = ball.position(&self.canvas) else {
            return;
        };
        let overlapping = self.canvas.find_overlapping(&area);
        let mut contacts: Vec<&mut Entity> = self
            .entities
            .iter_mut()
            .filter(|(id, _)| overlapping.contains(*id))
            .map(|(_, entity)| entity)
            .collect();

        let bricks_touched = contacts.iter().filter(|e| e.is_brick()).count() as u64;
        let hits = ball.collide(&mut self.canvas, &mut contacts);
        self.score += bricks_touched * self.settings.score_per_brick;

        for hit in hits {
            match hit.outcome {
                HitOutcome::Destroyed => {
                    self.entities.remove(&hit.id);
                    log::debug!("Brick {:?} destroyed", hit.id);
                    self.events.push(GameEvent::BrickDestroyed { id: hit.id });
                }
                HitOutcome::Damaged { remaining } => {
                    self.events.push(GameEvent::BrickHit {
                        id: hit.id,
                        remaining,
                    });
                }
            }
        }
        self.update_hud();
    }

    fn lose_ball(&mut self, sched: &mut Scheduler) {
        if let Some(ball) = self.ball.as_mut() {
            ball.deactivate();
        }
        self.lives -= 1;
        if self.lives < 0 {
            self.finish(GamePhase::GameOver);
        } else {
            log::info!("Ball lost, {} lives left", self.lives);
            self.events.push(GameEvent::LifeLost { lives: self.lives });
            self.phase = GamePhase::LifeLost;
            self.update_hud();
            sched.after(self.settings.respawn_delay_ms, Timer::NewRound);
        }
    }

    /// Enter a terminal phase and stop the speed timer
    fn finish(&mut self, phase: GamePhase) {
        if let Some(ball) = self.ball.as_mut() {
            ball.deactivate();
        }
        self.phase = phase;
        self.stop_speed_timer();
        self.update_hud();
        match phase {
            GamePhase::Won => {
                log::info!("You win! Final score {}", self.score);
                self.events.push(GameEvent::Won { score: self.score });
                self.show_message("You Win!", 40, GOLD);
            }
            _ => {
                log::info!("Game over. Final score {}", self.score);
                self.events.push(GameEvent::GameOver { score: self.score });
                self.show_message("Game Over", 40, RED);
            }
        }
    }

    /// Once-a-second countdown toward the next speed increase
    fn update_timer(&mut self, sched: &mut Scheduler) {
        let Some(token) = self.speed_timer.clone() else {
            return;
        };
        if token.is_cancelled() {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.increase_ball_speed();
            self.time_left = self.settings.speed_up_secs;
        }
        self.update_hud();
        sched.after_with_token(self.settings.timer_ms, Timer::SpeedTimer, &token);
    }

    fn increase_ball_speed(&mut self) {
        let step = self.settings.speed_step;
        match self.ball.as_mut().and_then(|b| b.accelerate(step)) {
            Some(speed) => {
                log::info!("Ball speed increased: {}", speed);
                self.events.push(GameEvent::SpeedIncreased { speed });
            }
            None => log::debug!("Speed increase skipped, no ball in play"),
        }
    }

    fn stop_speed_timer(&mut self) {
        if let Some(token) = self.speed_timer.take() {
            token.cancel();
        }
    }

    fn update_hud(&mut self) {
        let text = format!(
            "Score: {}       Lives: {}      Level Up in: {}s",
            self.score,
            self.lives.max(0),
            self.time_left
        );
        match self.hud {
            Some(hud) => self.canvas.set_text(hud.id(), &text),
            None => {
                let id = self.canvas.create_text(Vec2::new(200.0, 20.0), &text, 15, WHITE);
                self.hud = Some(ShapeHandle::new(id));
            }
        }
    }

    fn show_message(&mut self, text: &str, size: u32, color: Rgb) {
        self.clear_message();
        let center = Vec2::new(self.settings.width / 2.0, self.settings.height / 2.0);
        let id = self.canvas.create_text(center, text, size, color);
        self.message = Some(ShapeHandle::new(id));
    }

    fn clear_message(&mut self) {
        if let Some(message) = self.message.take() {
            message.delete(&mut self.canvas);
        }
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.stop_speed_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game() -> (Game, Scheduler) {
        let mut game = Game::new(Settings::default(), 42);
        let mut sched = Scheduler::new();
        game.start(&mut sched);
        (game, sched)
    }

    /// Fire every timer due within `ms`
    fn run(game: &mut Game, sched: &mut Scheduler, ms: u64) {
        let deadline = sched.now() + ms;
        while let Some(timer) = sched.pop_due(deadline) {
            game.on_timer(timer, sched);
        }
        sched.advance_to(deadline);
    }

    fn ball_center(game: &Game) -> Vec2 {
        game.ball().unwrap().position(game.canvas()).unwrap().center()
    }

    /// Teleport the ball so its center sits at `to`
    fn place_ball(game: &mut Game, to: Vec2) {
        let from = ball_center(game);
        let id = game.ball().unwrap().handle().id();
        game.canvas.move_by(id, to - from);
    }

    fn remove_all_bricks(game: &mut Game) {
        let ids: Vec<ShapeId> = game.bricks().map(|b| b.id()).collect();
        for id in ids {
            game.canvas.delete(id);
            game.entities.remove(&id);
        }
    }

    #[test]
    fn test_initial_layout() {
        let (game, _) = new_game();
        assert_eq!(game.lives(), 3);
        assert_eq!(game.score(), 0);
        assert_eq!(game.time_left(), 15);
        assert_eq!(game.phase(), GamePhase::WaitingToStart);
        assert_eq!(game.bricks_remaining(), 30);
        assert_eq!(game.canvas().find_with_tag(BRICK_TAG).len(), 30);

        for (y, hits) in [(50.0, 3), (80.0, 2), (110.0, 1)] {
            let row: Vec<_> = game
                .bricks()
                .filter(|b| b.handle().position(game.canvas()).unwrap().center().y == y)
                .collect();
            assert_eq!(row.len(), 10);
            assert!(row.iter().all(|b| b.hits() == hits));
        }

        let first = game.bricks().next().unwrap();
        assert_eq!(first.handle().position(game.canvas()).unwrap().center().x, 47.5);

        let paddle = game.paddle().position(game.canvas()).unwrap();
        assert_eq!(paddle.center(), Vec2::new(400.0, 550.0));
        assert_eq!(ball_center(&game), Vec2::new(400.0, 530.0));
        assert_eq!(game.message_text(), Some("Press Space to Start"));
        assert_eq!(
            game.hud_text(),
            Some("Score: 0       Lives: 3      Level Up in: 15s")
        );
    }

    #[test]
    fn test_same_seed_same_colors() {
        let fills = |seed| {
            let game = Game::new(Settings::default(), seed);
            game.bricks()
                .map(|b| game.canvas().get(b.id()).unwrap().fill)
                .collect::<Vec<_>>()
        };
        assert_eq!(fills(7), fills(7));
        assert!(fills(7).iter().all(|c| BRICK_PALETTE.contains(c)));
    }

    #[test]
    fn test_paddle_carries_ball_until_launch() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Left, &mut sched);
        assert_eq!(ball_center(&game), Vec2::new(380.0, 530.0));

        game.handle_key(Key::Space, &mut sched);
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(game.paddle().carried_ball().is_none());
        assert!(game.message_text().is_none());
        // First tick runs immediately
        assert_eq!(ball_center(&game), Vec2::new(385.0, 525.0));

        game.handle_key(Key::Right, &mut sched);
        assert_eq!(ball_center(&game), Vec2::new(385.0, 525.0));
        assert_eq!(game.drain_events(), vec![GameEvent::Launched]);
    }

    #[test]
    fn test_space_ignored_while_running() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Space, &mut sched);
        let pending = sched.pending();
        game.handle_key(Key::Space, &mut sched);
        assert_eq!(sched.pending(), pending);
    }

    #[test]
    fn test_ticks_advance_ball_every_50ms() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Space, &mut sched);
        run(&mut game, &mut sched, 100);
        assert_eq!(ball_center(&game), Vec2::new(415.0, 515.0));
    }

    #[test]
    fn test_score_counts_each_overlapping_brick() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Space, &mut sched);
        // Straddle two bottom-row bricks (x 95..170 and 180..255)
        place_ball(&mut game, Vec2::new(170.0, 125.0));
        run(&mut game, &mut sched, 50);

        assert_eq!(game.score(), 20);
        assert_eq!(game.bricks_remaining(), 28);
        assert_eq!(game.canvas().find_with_tag(BRICK_TAG).len(), 28);
        let destroyed = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::BrickDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn test_score_independent_of_remaining_hits() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Space, &mut sched);
        // Inside a single top-row brick (3 hits), clear of neighbours
        place_ball(&mut game, Vec2::new(47.5, 50.0));
        run(&mut game, &mut sched, 50);
        assert_eq!(game.score(), 10);
        assert_eq!(game.bricks_remaining(), 30);
    }

    #[test]
    fn test_clearing_bricks_wins() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Space, &mut sched);
        remove_all_bricks(&mut game);
        run(&mut game, &mut sched, 50);

        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(game.message_text(), Some("You Win!"));
        assert!(!game.ball().unwrap().is_active());
        assert!(sched.is_idle());
    }

    #[test]
    fn test_losing_ball_respawns_after_pause() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Space, &mut sched);
        game.handle_key(Key::Right, &mut sched);
        let old_ball = game.ball().unwrap().handle().id();
        place_ball(&mut game, Vec2::new(300.0, 595.0));
        run(&mut game, &mut sched, 50);

        assert_eq!(game.phase(), GamePhase::LifeLost);
        assert_eq!(game.lives(), 2);
        assert!(!game.ball().unwrap().is_active());
        assert!(sched.is_scheduled(Timer::NewRound));

        run(&mut game, &mut sched, 999);
        assert_eq!(game.phase(), GamePhase::LifeLost);
        run(&mut game, &mut sched, 1);
        assert_eq!(game.phase(), GamePhase::WaitingToStart);

        let ball = game.ball().unwrap();
        assert_ne!(ball.handle().id(), old_ball);
        assert!(!game.canvas().contains(old_ball));
        assert_eq!(ball.speed(), Some(BALL_START_SPEED));
        assert_eq!(game.paddle().carried_ball(), Some(ball.handle()));
        assert_eq!(ball_center(&game), Vec2::new(420.0, 530.0));
        assert_eq!(game.message_text(), Some("Press Space to Start"));
    }

    #[test]
    fn test_game_over_after_last_life() {
        let (mut game, mut sched) = new_game();
        for expected in [2, 1, 0] {
            game.handle_key(Key::Space, &mut sched);
            place_ball(&mut game, Vec2::new(300.0, 595.0));
            run(&mut game, &mut sched, 50);
            assert_eq!(game.lives(), expected);
            assert_eq!(game.phase(), GamePhase::LifeLost);
            run(&mut game, &mut sched, 1000);
        }

        game.handle_key(Key::Space, &mut sched);
        place_ball(&mut game, Vec2::new(300.0, 595.0));
        run(&mut game, &mut sched, 50);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.lives(), -1);
        assert_eq!(game.message_text(), Some("Game Over"));
        assert!(game.hud_text().unwrap().contains("Lives: 0"));

        // Nothing left to run
        assert!(sched.is_idle());
        run(&mut game, &mut sched, 60_000);
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_speed_ramps_every_fifteen_seconds() {
        let (mut game, mut sched) = new_game();
        run(&mut game, &mut sched, 1000);
        assert_eq!(game.time_left(), 14);
        assert!(game.hud_text().unwrap().ends_with("Level Up in: 14s"));

        run(&mut game, &mut sched, 14_000);
        assert_eq!(game.time_left(), 15);
        assert_eq!(game.ball().unwrap().speed(), Some(BALL_START_SPEED + SPEED_STEP));
        assert!(
            game.drain_events()
                .contains(&GameEvent::SpeedIncreased { speed: 6.0 })
        );
    }

    #[test]
    fn test_single_speed_timer_across_lives() {
        let (mut game, mut sched) = new_game();
        game.handle_key(Key::Space, &mut sched);
        place_ball(&mut game, Vec2::new(300.0, 595.0));
        run(&mut game, &mut sched, 50);
        run(&mut game, &mut sched, 1000);
        assert_eq!(game.phase(), GamePhase::WaitingToStart);

        // One countdown step per second, never doubled up
        let before = game.time_left();
        run(&mut game, &mut sched, 1000);
        assert_eq!(game.time_left(), before - 1);
    }

    #[test]
    fn test_drop_cancels_speed_timer() {
        let (game, mut sched) = new_game();
        assert!(sched.is_scheduled(Timer::SpeedTimer));
        drop(game);
        assert!(!sched.is_scheduled(Timer::SpeedTimer));
        assert_eq!(sched.pop_due(u64::MAX), None);
    }
}
