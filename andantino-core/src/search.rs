//! Negamax alpha-beta search with a transposition table
//!
//! The search works directly on one mutable [`GameState`] through guarded
//! make/undo pairs; no positions are cloned. Cancellation is cooperative and
//! only polled between root moves, so a running subtree always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::Cell;
use crate::eval::MAX_SCORE;
use crate::game::GameState;
use crate::hash::StateHash;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Initial window half-width; wider than any reachable value
pub const SEARCH_BOUND: i32 = 999;

const _: () = assert!(SEARCH_BOUND > MAX_SCORE);

// ============================================================================
// RESULT AND TABLE TYPES
// ============================================================================

/// Outcome of a search call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Value from the point of view of the player to move
    pub value: i32,
    /// Best move found; `None` at leaves and when nothing was explored
    pub best_move: Option<Cell>,
    /// Nodes visited, this one included
    pub nodes: u64,
    /// Depth searched
    pub depth: u32,
    /// The stop signal fired before every root move was searched
    #[serde(skip)]
    pub cancelled: bool,
}

impl SearchResult {
    fn leaf(value: i32) -> Self {
        Self {
            value,
            best_move: None,
            nodes: 1,
            depth: 0,
            cancelled: false,
        }
    }
}

/// How a stored value relates to the true value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    Exact,
    /// True value is at least the stored one (beta cutoff)
    Lower,
    /// True value is at most the stored one (failed low)
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranspositionEntry {
    pub value: i32,
    pub bound: Bound,
    /// A cell, not a frontier index: indices differ between positions
    pub best_move: Option<Cell>,
    pub depth: u32,
    pub nodes: u64,
}

/// Position hash to search result, private to one search run
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<StateHash, TranspositionEntry>,
    hits: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: &StateHash) -> Option<&TranspositionEntry> {
        self.entries.get(hash)
    }

    /// Insert, replacing an existing entry only if the new one is at least
    /// as deep
    pub fn store(&mut self, hash: StateHash, entry: TranspositionEntry) {
        match self.entries.get_mut(&hash) {
            Some(existing) if existing.depth > entry.depth => {}
            Some(existing) => *existing = entry,
            None => {
                self.entries.insert(hash, entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups that returned or tightened a value
    pub fn hits(&self) -> u64 {
        self.hits
    }
}

// ============================================================================
// STOP SIGNAL
// ============================================================================

/// Shared cancellation flag with an optional deadline
///
/// Once the deadline has passed, the first poll latches the flag.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Idempotent
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.request_stop();
            return true;
        }
        false
    }
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Walks the frontier by index, table move first
///
/// Indexing instead of borrowing lets the caller make and undo moves between
/// steps; every undo restores the frontier exactly.
struct MoveOrder {
    hint: Option<Cell>,
    hint_pending: bool,
    index: usize,
}

impl MoveOrder {
    fn new(hint: Option<Cell>) -> Self {
        Self {
            hint,
            hint_pending: hint.is_some(),
            index: 0,
        }
    }

    fn next(&mut self, state: &GameState) -> Option<Cell> {
        if self.hint_pending {
            self.hint_pending = false;
            return self.hint;
        }
        while let Some(spot) = state.frontier().get(self.index) {
            self.index += 1;
            if spot.available && Some(spot.cell) != self.hint {
                return Some(spot.cell);
            }
        }
        None
    }
}

// ============================================================================
// NEGAMAX WITH ALPHA-BETA
// ============================================================================

/// Search `state` to `depth` plies inside the window `(alpha, beta)`
///
/// `stop` is polled before each root move. When it fires, the result is
/// marked `cancelled`, holds the best of the fully searched root moves, and
/// nothing is stored for the root. `state` is unchanged on return.
pub fn search(
    state: &mut GameState,
    table: &mut TranspositionTable,
    depth: u32,
    alpha: i32,
    beta: i32,
    stop: &StopSignal,
) -> SearchResult {
    negamax(state, table, depth, alpha, beta, Some(stop))
}

/// One uncancellable full-window search with a fresh table
pub fn search_fixed_depth(state: &mut GameState, depth: u32) -> SearchResult {
    let mut table = TranspositionTable::new();
    negamax(state, &mut table, depth, -SEARCH_BOUND, SEARCH_BOUND, None)
}

fn negamax(
    state: &mut GameState,
    table: &mut TranspositionTable,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    stop: Option<&StopSignal>,
) -> SearchResult {
    if depth == 0 || state.is_end_game() {
        return SearchResult::leaf(state.evaluate());
    }

    let hash = *state.hash();
    let mut hint = None;
    if let Some(entry) = table.get(&hash).copied() {
        if entry.depth >= depth {
            match entry.bound {
                Bound::Exact => {
                    table.hits += 1;
                    return SearchResult {
                        value: entry.value,
                        best_move: entry.best_move,
                        nodes: 1,
                        depth,
                        cancelled: false,
                    };
                }
                Bound::Lower => alpha = alpha.max(entry.value),
                Bound::Upper => beta = beta.min(entry.value),
            }
            if alpha >= beta {
                table.hits += 1;
                return SearchResult {
                    value: entry.value,
                    best_move: entry.best_move,
                    nodes: 1,
                    depth,
                    cancelled: false,
                };
            }
        }
        if let Some(cell) = entry.best_move {
            assert!(
                state.is_free_spot(cell),
                "table move {cell} is not available in its own position"
            );
            hint = Some(cell);
        }
    }

    let window_alpha = alpha;
    let mut best_value = i32::MIN;
    let mut best_move = None;
    let mut nodes = 1;
    let mut cancelled = false;

    let mut order = MoveOrder::new(hint);
    while let Some(cell) = order.next(state) {
        if stop.is_some_and(StopSignal::is_stopped) {
            cancelled = true;
            break;
        }

        let child = {
            let mut guard = state.play(cell);
            negamax(&mut guard, table, depth - 1, -beta, -alpha, None)
        };
        nodes += child.nodes;

        let value = -child.value;
        if value > best_value {
            best_value = value;
            best_move = Some(cell);
        }
        alpha = alpha.max(value);
        if alpha >= beta {
            break;
        }
    }

    if best_move.is_none() {
        // No legal move, or stopped before the first one finished
        let mut result = SearchResult::leaf(state.evaluate());
        result.nodes = nodes;
        result.cancelled = cancelled;
        return result;
    }

    if !cancelled {
        let bound = if best_value <= window_alpha {
            Bound::Upper
        } else if best_value >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        table.store(
            hash,
            TranspositionEntry {
                value: best_value,
                bound,
                best_move,
                depth,
                nodes,
            },
        );
    }

    SearchResult {
        value: best_value,
        best_move,
        nodes,
        depth,
        cancelled,
    }
}

// ============================================================================
// TESTS
// ============================================================================
