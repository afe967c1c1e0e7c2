use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clap::ValueEnum;
use mineboard_core::*;
use rand::prelude::*;

/// Built-in board presets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    Junior,
    Middle,
    Senior,
}

impl Difficulty {
    pub fn config(self) -> Result<GameConfig> {
        use Difficulty::*;
        match self {
            Junior => GameConfig::new(5, 5, 6),
            Middle => GameConfig::new(9, 9, 25),
            Senior => GameConfig::new(15, 15, 50),
        }
    }
}

pub const CUSTOM_MIN_SIDE: Coord = 5;
pub const CUSTOM_MAX_SIDE: Coord = 30;

/// Clamps a user-chosen board into the supported custom range.
///
/// Sides are kept within `5..=30`, mines within half the board and always
/// leaving at least one safe cell.
pub fn custom_config(rows: Coord, cols: Coord, mines: CellCount) -> Result<GameConfig> {
    let rows = rows.clamp(CUSTOM_MIN_SIDE, CUSTOM_MAX_SIDE);
    let cols = cols.clamp(CUSTOM_MIN_SIDE, CUSTOM_MAX_SIDE);
    let total = mult(rows, cols);
    let mines = mines.clamp(1, (total / 2).max(1)).min(total - 1);
    GameConfig::new(rows, cols, mines)
}

/// One player's sitting: the current game plus the seed stream for new ones.
#[derive(Debug)]
pub struct Session {
    game: Game,
    rng: SmallRng,
}

impl Session {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let game = Game::random(config, rng.random());
        Self { game, rng }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn config(&self) -> GameConfig {
        self.game.config()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealEffect> {
        self.game.reveal(coords)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.game.toggle_flag(coords)
    }

    pub fn force_win(&mut self) -> RevealEffect {
        self.game.force_win()
    }

    pub fn tick(&mut self) {
        self.game.tick();
    }

    /// Same difficulty, fresh layout.
    pub fn new_game(&mut self) -> Result<()> {
        self.game.reset_with(None, None, None, self.rng.random())
    }

    pub fn change_difficulty(&mut self, config: GameConfig) -> Result<()> {
        self.game.reset_with(
            Some(config.mines()),
            Some(config.rows()),
            Some(config.cols()),
            self.rng.random(),
        )
    }
}

/// Drives the session clock from a background thread, one tick per second.
///
/// Every tick goes through the session mutex, so it never interleaves with a
/// player move. Dropping the shutdown sender wakes the thread immediately.
#[derive(Debug)]
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(session: Arc<Mutex<Session>>) -> Self {
        Self::spawn_with_period(session, Duration::from_secs(1))
    }

    pub fn spawn_with_period(session: Arc<Mutex<Session>>, period: Duration) -> Self {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(period) {
                match session.lock() {
                    Ok(mut session) => session.tick(),
                    Err(_) => {
                        log::error!("Session lock poisoned, ticker stopping");
                        break;
                    }
                }
            }
            log::debug!("Ticker stopped");
        });
        Self {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        // disconnecting the channel ends the wait
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
