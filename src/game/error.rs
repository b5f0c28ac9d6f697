//! Construction errors for the simulation engine.

use derive_more::{Display, Error};

/// Reasons an engine cannot be built.
///
/// Once constructed, no engine operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// The board leaves no room for walls plus the starting snake
    #[display(
        "board {width}x{height} is too small: need width >= {} and height >= {}",
        super::Board::MIN_WIDTH,
        super::Board::MIN_HEIGHT
    )]
    BoardTooSmall { width: i32, height: i32 },

    /// The board exceeds the supported size
    #[display(
        "board {width}x{height} is too large: width and height must be at most {} and {}",
        super::Board::MAX_WIDTH,
        super::Board::MAX_HEIGHT
    )]
    BoardTooLarge { width: i32, height: i32 },

    /// Fewer free interior cells than fruit to place
    #[display("board has {free} free cells but {needed} fruit must be placed")]
    NotEnoughRoom { free: usize, needed: usize },

    /// Engine tuning rejected by validation
    #[display("invalid engine config: {_0}")]
    InvalidConfig(#[error(not(source))] String),

    /// The background driver thread could not be started
    #[display("failed to spawn tick driver: {_0}")]
    DriverSpawn(#[error(not(source))] String),
}

pub type EngineResult<T> = Result<T, EngineError>;
