//! Simulation core for the snake game
//!
//! Owns the board, snake, fruit, score and status, and advances them on a
//! fixed tick from a background driver thread. Nothing in here touches the
//! terminal; front-ends read snapshots and call the mutators.

pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod simulation;
pub mod state;

// Re-export commonly used types
pub use config::EngineConfig;
pub use direction::Direction;
pub use engine::{EngineSnapshot, SnakeEngine};
pub use error::{EngineError, EngineResult};
pub use simulation::{Simulation, TickOutcome};
pub use state::{Board, GameStatus, Point, PointKind, Snake};
