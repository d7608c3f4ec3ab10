//! Andantino Core - Game engine and search
//!
//! This crate provides the engine for Andantino on a side-10 hexagon:
//! - Board geometry (offset hex grid, neighbours, five-cell windows)
//! - Game state with incremental make/undo and a move frontier
//! - Position hashing and evaluation
//! - Alpha-beta search with a transposition table
//! - Background iterative deepening and Monte Carlo playouts

pub mod board;
pub mod error;
pub mod hash;
pub mod game;
pub mod eval;
pub mod search;
pub mod control;
pub mod playout;
pub mod config;

// Re-exports for convenient access
pub use board::{Board, Cell, Direction, CELL_COUNT, CENTER, DIRECTIONS, LINE_LENGTH};
pub use error::{ConfigError, MoveError, ParseCellError};
pub use hash::StateHash;
pub use game::{FreeSpot, GameResult, GameState, Move, MoveGuard, Player, Score};
pub use eval::{evaluate, MAX_SCORE};
pub use search::{search, search_fixed_depth, SearchResult, StopSignal, TranspositionTable, SEARCH_BOUND};
pub use control::{SearchControl, SearchReport, StopReason};
pub use playout::{MonteCarlo, MoveStats};
pub use config::{EngineConfig, EngineKind, MonteCarloConfig, SearchConfig};
