//! Shared helpers: move lists, config files, board rendering

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use andantino_core::{Board, Cell, EngineConfig, GameState, Player};

/// Parse a whitespace-separated list of `x,y` cells
pub fn parse_moves(text: &str) -> Result<Vec<Cell>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<Cell>()
                .with_context(|| format!("Invalid cell {token:?}"))
        })
        .collect()
}

/// Replay a move list from the empty board
pub fn replay(text: &str) -> Result<GameState> {
    let cells = parse_moves(text)?;
    GameState::from_moves(&cells).context("Illegal move sequence")
}

/// Config file if given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Text diagram of the board; odd rows are shifted right by half a cell
pub fn render(state: &GameState) -> String {
    let board = Board::get();
    let mut out = String::new();
    let mut row = None;

    for &cell in board.cells() {
        if row != Some(cell.y) {
            if row.is_some() {
                out.push('\n');
            }
            row = Some(cell.y);
            // Two columns per cell, one extra on odd rows; the middle row
            // starts at x = 1
            let indent = (2 * cell.x + (cell.y & 1) - 2) as usize;
            out.extend(std::iter::repeat(' ').take(indent));
        }
        let mark = match state.occupant(cell) {
            Some(Player::White) => 'W',
            Some(Player::Black) => 'B',
            None if state.is_free_spot(cell) => '+',
            None => '.',
        };
        let _ = write!(out, "{mark} ");
    }
    out.push('\n');
    out
}
