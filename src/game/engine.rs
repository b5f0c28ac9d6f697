use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use super::config::EngineConfig;
use super::direction::Direction;
use super::error::{EngineError, EngineResult};
use super::simulation::{Simulation, TickOutcome};
use super::state::{Board, GameStatus, Point};

/// Copy of the engine state taken under the tick lock
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    /// Immutable board, shared with the engine
    pub board: Arc<Board>,
    /// Body points, head first
    pub snake: Vec<Point>,
    pub fruits: Vec<Point>,
    pub direction: Direction,
    pub status: GameStatus,
    /// Displayed score
    pub score: u32,
    pub tick: u64,
}

/// State shared between the engine handle and its driver thread
struct Shared {
    board: Arc<Board>,
    sim: Mutex<Simulation>,
    status: AtomicU8,
    direction: AtomicU8,
    terminated: AtomicBool,
    poll_interval: Duration,
}

impl Shared {
    fn status(&self) -> GameStatus {
        GameStatus::from_bits(self.status.load(Ordering::Acquire))
    }

    fn direction(&self) -> Direction {
        Direction::from_bits(self.direction.load(Ordering::Acquire))
    }

    /// Lock for readers; a poisoned lock still holds a whole board
    fn lock_sim(&self) -> MutexGuard<'_, Simulation> {
        self.sim.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attempt one tick. Returns true if a tick ran.
    fn update_frame(&self) -> bool {
        if self.status() != GameStatus::Running || self.terminated.load(Ordering::Acquire) {
            return false;
        }

        // A held lock means a tick is already in flight
        let mut sim = match self.sim.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(std::sync::TryLockError::WouldBlock) => return false,
        };

        let now = Instant::now();
        if !sim.is_due(now) {
            return false;
        }

        let outcome = sim.step(self.direction(), now);
        if outcome.is_fatal() && self.finish_game() {
            info!(
                tick = sim.tick(),
                score = sim.score(),
                ?outcome,
                "game over"
            );
        } else if outcome == TickOutcome::AteFruit {
            trace!(tick = sim.tick(), "snake grew");
        }

        true
    }

    /// Move a running or paused game to game-over.
    ///
    /// Paused counts because a tick that passed its status check can land
    /// after a pause. Any other status set meanwhile is kept.
    fn finish_game(&self) -> bool {
        let game_over = GameStatus::GameOver.to_bits();
        [GameStatus::Running, GameStatus::Paused]
            .into_iter()
            .any(|from| {
                self.status
                    .compare_exchange(from.to_bits(), game_over, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            })
    }

    /// Driver loop: tick while running, idle otherwise, until terminated
    fn run_driver(&self) {
        debug!("tick driver started");
        while !self.terminated.load(Ordering::Acquire) {
            while self.status() == GameStatus::Running && !self.terminated.load(Ordering::Acquire)
            {
                self.update_frame();
                thread::park_timeout(self.poll_interval);
            }
            thread::park_timeout(self.poll_interval);
        }
        debug!("tick driver stopped");
    }
}

/// Authoritative snake game state advanced by a background driver.
///
/// The driver thread starts with the engine and only does work while the
/// status is [`GameStatus::Running`]. Every mutator is non-blocking;
/// readers take the tick lock briefly and get copies.
pub struct SnakeEngine {
    shared: Arc<Shared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl SnakeEngine {
    /// Create an engine with the default [`EngineConfig`].
    pub fn new(width: i32, height: i32) -> EngineResult<Self> {
        Self::with_config(width, height, EngineConfig::default())
    }

    /// Create an engine and start its driver thread in the stopped state.
    pub fn with_config(width: i32, height: i32, config: EngineConfig) -> EngineResult<Self> {
        let sim = Simulation::new(width, height, &config)?;
        let board = Arc::new(sim.board().clone());

        let shared = Arc::new(Shared {
            board,
            sim: Mutex::new(sim),
            status: AtomicU8::new(GameStatus::Stopped.to_bits()),
            direction: AtomicU8::new(Direction::Up.to_bits()),
            terminated: AtomicBool::new(false),
            poll_interval: config.poll_interval(),
        });

        let driver_shared = Arc::clone(&shared);
        let driver = thread::Builder::new()
            .name("snake-tick-driver".to_string())
            .spawn(move || driver_shared.run_driver())
            .map_err(|e| EngineError::DriverSpawn(e.to_string()))?;

        info!(
            width,
            height,
            frame_rate = config.frame_rate,
            fruit_count = config.fruit_count,
            "snake engine created"
        );

        Ok(Self {
            shared,
            driver: Mutex::new(Some(driver)),
        })
    }

    /// Attempt one tick now.
    ///
    /// Runs only when the status is running, no other tick holds the lock,
    /// and a full frame interval has passed. Returns whether a tick ran.
    pub fn update_frame(&self) -> bool {
        self.shared.update_frame()
    }

    /// Whether a tick attempt right now would run
    pub fn can_update(&self) -> bool {
        if self.status() != GameStatus::Running || self.is_terminated() {
            return false;
        }
        match self.shared.sim.try_lock() {
            Ok(sim) => sim.is_due(Instant::now()),
            Err(_) => false,
        }
    }

    /// Adopt a new heading unless it reverses the current one
    pub fn set_direction(&self, direction: Direction) {
        let result = self
            .shared
            .direction
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                if Direction::from_bits(bits).is_opposite(direction) {
                    None
                } else {
                    Some(direction.to_bits())
                }
            });
        if result.is_err() {
            trace!(?direction, "reversal ignored");
        }
    }

    /// Force the status, e.g. `Running` to start the game
    pub fn set_status(&self, status: GameStatus) {
        let previous = self.shared.status.swap(status.to_bits(), Ordering::AcqRel);
        debug!(from = ?GameStatus::from_bits(previous), to = ?status, "status set");
        if let Some(handle) = self.driver_thread() {
            handle.unpark();
        }
    }

    /// Toggle running and paused; any other status is left alone
    pub fn pause_game(&self) {
        let status = &self.shared.status;
        let running = GameStatus::Running.to_bits();
        let paused = GameStatus::Paused.to_bits();

        if status
            .compare_exchange(running, paused, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            debug!("game paused");
        } else if status
            .compare_exchange(paused, running, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            debug!("game resumed");
        }
    }

    /// Ask the driver to stop. The last state stays readable.
    pub fn quit_game(&self) {
        if !self.shared.terminated.swap(true, Ordering::AcqRel) {
            debug!("quit requested");
        }
        if let Some(handle) = self.driver_thread() {
            handle.unpark();
        }
    }

    /// Whether the driver has been told to stop
    pub fn is_terminated(&self) -> bool {
        self.shared.terminated.load(Ordering::Acquire)
    }

    pub fn status(&self) -> GameStatus {
        self.shared.status()
    }

    pub fn direction(&self) -> Direction {
        self.shared.direction()
    }

    /// Wall points; the board never changes so no lock is taken
    pub fn wall_points(&self) -> &[Point] {
        self.shared.board.walls()
    }

    /// Body points, head first
    pub fn snake_points(&self) -> Vec<Point> {
        self.shared.lock_sim().snake().to_vec()
    }

    pub fn fruit_points(&self) -> Vec<Point> {
        self.shared.lock_sim().fruits().to_vec()
    }

    /// Displayed score, fruit eaten times points per fruit
    pub fn score(&self) -> u32 {
        self.shared.lock_sim().score()
    }

    pub fn tick(&self) -> u64 {
        self.shared.lock_sim().tick()
    }

    /// Consistent copy of everything a renderer needs
    pub fn snapshot(&self) -> EngineSnapshot {
        let sim = self.shared.lock_sim();
        EngineSnapshot {
            board: Arc::clone(&self.shared.board),
            snake: sim.snake().to_vec(),
            fruits: sim.fruits().to_vec(),
            direction: self.direction(),
            status: self.status(),
            score: sim.score(),
            tick: sim.tick(),
        }
    }

    fn driver_thread(&self) -> Option<thread::Thread> {
        let driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        driver.as_ref().map(|handle| handle.thread().clone())
    }

    #[cfg(test)]
    fn with_sim<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> R {
        f(&mut self.shared.lock_sim())
    }
}

impl Drop for SnakeEngine {
    fn drop(&mut self) {
        self.quit_game();
        let handle = self
            .driver
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                debug!("tick driver panicked");
            }
        }
    }
}
