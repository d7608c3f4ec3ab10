//! Recoverable error types
//!
//! Contract violations inside the engine (playing a cell that is not on the
//! frontier, undoing an empty history) panic instead; these errors cover
//! input that comes from outside the engine.

use crate::board::Cell;

/// Rejected move from an external caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("cell {0} is outside the board")]
    OutOfBounds(Cell),

    #[error("cell {0} is already occupied")]
    Occupied(Cell),

    #[error("cell {0} is not a legal move in this position")]
    NotOnFrontier(Cell),

    #[error("the game is already over")]
    GameOver,

    #[error("there is no move to undo")]
    NoHistory,
}

/// Failure to parse an `"x,y"` cell
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCellError {
    #[error("expected \"x,y\", got {0:?}")]
    Format(String),

    #[error("cell {0} is outside the board")]
    OutOfBounds(Cell),
}

/// Invalid or unreadable configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_depth must be at least 1")]
    ZeroDepth,

    #[error("playouts_per_move must be at least 1")]
    ZeroPlayouts,

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
