//! Random playouts
//!
//! A cheap alternative move picker: every candidate move is followed by a
//! number of uniformly random games, and the move whose games the mover won
//! most often is chosen. Playouts run in place with make/undo.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::board::Cell;
use crate::config::MonteCarloConfig;
use crate::game::{GameResult, GameState};

// ============================================================================
// SINGLE PLAYOUT
// ============================================================================

/// Result of a playout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayoutResult {
    /// Final game result
    pub result: GameResult,
    /// Number of moves played
    pub moves_played: u32,
}

/// Play random legal moves until the game ends or `max_moves` is reached,
/// then undo them all
pub fn playout<R: Rng>(state: &mut GameState, max_moves: u32, rng: &mut R) -> PlayoutResult {
    let mut moves_played = 0;

    while !state.is_end_game() && moves_played < max_moves {
        let Some(cell) = state.legal_moves().choose(rng) else {
            break;
        };
        state.make_move(cell);
        moves_played += 1;
    }

    let result = state.result();
    for _ in 0..moves_played {
        state.undo_move();
    }

    PlayoutResult {
        result,
        moves_played,
    }
}

// ============================================================================
// MOVE SELECTION
// ============================================================================

/// Playout statistics for one candidate move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveStats {
    pub cell: Cell,
    pub wins: u32,
    pub playouts: u32,
}

impl MoveStats {
    pub fn win_ratio(&self) -> f64 {
        if self.playouts == 0 {
            0.0
        } else {
            self.wins as f64 / self.playouts as f64
        }
    }
}

/// Monte Carlo move picker with its own seeded generator
pub struct MonteCarlo {
    config: MonteCarloConfig,
    rng: ChaCha8Rng,
}

impl MonteCarlo {
    pub fn new(config: MonteCarloConfig, rng: ChaCha8Rng) -> Self {
        Self { config, rng }
    }

    /// Seed from `config.seed`, or from entropy when unset
    pub fn from_config(config: MonteCarloConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(config, rng)
    }

    /// Statistics for every legal move, in frontier order
    pub fn evaluate_moves(&mut self, state: &mut GameState) -> Vec<MoveStats> {
        let mover = state.current_player();
        let candidates: Vec<Cell> = state.legal_moves().collect();

        candidates
            .into_iter()
            .map(|cell| {
                let mut guard = state.play(cell);
                let mut wins = 0;
                for _ in 0..self.config.playouts_per_move {
                    let outcome = playout(&mut guard, self.config.max_playout_moves, &mut self.rng);
                    if outcome.result.winner() == Some(mover) {
                        wins += 1;
                    }
                }
                MoveStats {
                    cell,
                    wins,
                    playouts: self.config.playouts_per_move,
                }
            })
            .collect()
    }

    /// Move with the highest win ratio; the first one on ties
    ///
    /// `None` when the game is over or nothing is playable.
    pub fn best_move(&mut self, state: &mut GameState) -> Option<MoveStats> {
        if state.is_end_game() {
            return None;
        }
        let stats = self.evaluate_moves(state);
        let mut best: Option<MoveStats> = None;
        for candidate in stats {
            if best.map_or(true, |b| candidate.wins > b.wins) {
                best = Some(candidate);
            }
        }
        tracing::debug!(
            best_move = ?best.map(|b| b.cell),
            ratio = best.map_or(0.0, |b| b.win_ratio()),
            "playouts complete"
        );
        best
    }
}

// ============================================================================
// TESTS
// ============================================================================
