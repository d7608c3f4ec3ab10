//! Background iterative deepening
//!
//! [`SearchControl`] owns the searched [`GameState`] for as long as the worker
//! runs and hands it back from [`SearchControl::wait`]. The caller polls for
//! the latest completed depth; results are published only between depths.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::board::Cell;
use crate::config::SearchConfig;
use crate::eval::MAX_SCORE;
use crate::game::GameState;
use crate::search::{search, SearchResult, StopSignal, TranspositionTable, SEARCH_BOUND};

/// Why the worker stopped deepening
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Every depth up to the configured maximum completed
    DepthLimit,
    /// A completed depth proved a win for the mover
    ForcedWin,
    /// Cancelled or out of time
    Stopped,
}

/// Final outcome of a background search
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub best_move: Option<Cell>,
    pub value: i32,
    /// Nodes of the last completed depth
    pub nodes: u64,
    pub depth_reached: u32,
    pub elapsed_ms: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug)]
struct Progress {
    result: SearchResult,
    depth_reached: u32,
    finished: Option<(Duration, StopReason)>,
}

fn lock(progress: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running search
///
/// Dropping the handle cancels the search and joins the worker.
pub struct SearchControl {
    stop: StopSignal,
    progress: Arc<Mutex<Progress>>,
    started: Instant,
    handle: Option<JoinHandle<GameState>>,
}

impl SearchControl {
    /// Start searching `state` on a background thread
    pub fn start(state: GameState, config: SearchConfig) -> Self {
        let started = Instant::now();
        let stop = match config.time_limit() {
            Some(limit) => StopSignal::with_deadline(started + limit),
            None => StopSignal::new(),
        };
        Self::spawn(state, config, stop, started)
    }

    /// Start with a caller-owned stop signal; `config.time_limit_ms` is
    /// ignored in favour of the signal's own deadline
    pub fn start_with_stop(state: GameState, config: SearchConfig, stop: StopSignal) -> Self {
        Self::spawn(state, config, stop, Instant::now())
    }

    fn spawn(state: GameState, config: SearchConfig, stop: StopSignal, started: Instant) -> Self {
        // Until a depth completes, answer with the first legal move
        let fallback = SearchResult {
            value: 0,
            best_move: state.legal_moves().next(),
            nodes: 0,
            depth: 0,
            cancelled: false,
        };
        let progress = Arc::new(Mutex::new(Progress {
            result: fallback,
            depth_reached: 0,
            finished: None,
        }));

        let handle = {
            let stop = stop.clone();
            let progress = Arc::clone(&progress);
            thread::spawn(move || deepen(state, config, &stop, &progress, started))
        };

        Self {
            stop,
            progress,
            started,
            handle: Some(handle),
        }
    }

    /// Ask the worker to stop at its next root move; idempotent
    pub fn request_cancel(&self) {
        self.stop.request_stop();
    }

    /// Enforce the deadline and return the latest published result
    pub fn tick(&self) -> SearchResult {
        self.stop.is_stopped();
        lock(&self.progress).result
    }

    pub fn is_finished(&self) -> bool {
        self.stop.is_stopped();
        lock(&self.progress).finished.is_some()
    }

    /// Latest published result
    pub fn result(&self) -> SearchResult {
        lock(&self.progress).result
    }

    pub fn depth_reached(&self) -> u32 {
        lock(&self.progress).depth_reached
    }

    /// Time spent so far, frozen once the worker finishes
    pub fn elapsed(&self) -> Duration {
        match lock(&self.progress).finished {
            Some((elapsed, _)) => elapsed,
            None => self.started.elapsed(),
        }
    }

    /// Block until the worker finishes; returns the position and the report
    ///
    /// # Panics
    /// Re-raises a panic from the worker thread.
    pub fn wait(mut self) -> (GameState, SearchReport) {
        let state = match self.handle.take().map(JoinHandle::join) {
            Some(Ok(state)) => state,
            Some(Err(payload)) => std::panic::resume_unwind(payload),
            None => unreachable!("search handle is only taken by wait"),
        };

        let progress = lock(&self.progress);
        let (elapsed, stop_reason) = progress
            .finished
            .unwrap_or((self.started.elapsed(), StopReason::Stopped));
        let report = SearchReport {
            best_move: progress.result.best_move,
            value: progress.result.value,
            nodes: progress.result.nodes,
            depth_reached: progress.depth_reached,
            elapsed_ms: elapsed.as_millis() as u64,
            stop_reason,
        };
        (state, report)
    }

    pub fn into_state(self) -> GameState {
        self.wait().0
    }
}

impl Drop for SearchControl {
    fn drop(&mut self) {
        self.stop.request_stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Worker loop: one full-window search per depth, sharing a table
fn deepen(
    mut state: GameState,
    config: SearchConfig,
    stop: &StopSignal,
    progress: &Mutex<Progress>,
    started: Instant,
) -> GameState {
    let mut table = TranspositionTable::new();
    let mut reason = StopReason::DepthLimit;

    for depth in 1..=config.max_depth {
        let result = search(&mut state, &mut table, depth, -SEARCH_BOUND, SEARCH_BOUND, stop);
        if result.cancelled {
            // A partial depth is never published
            reason = StopReason::Stopped;
            break;
        }

        {
            let mut progress = lock(progress);
            progress.result = SearchResult {
                best_move: result.best_move.or(progress.result.best_move),
                ..result
            };
            progress.depth_reached = depth;
        }
        tracing::debug!(
            depth,
            value = result.value,
            nodes = result.nodes,
            best_move = ?result.best_move,
            "depth complete"
        );

        if result.value == MAX_SCORE {
            reason = StopReason::ForcedWin;
            break;
        }
        if result.best_move.is_none() {
            // Finished game or no legal move: deeper searches change nothing
            break;
        }
    }

    let elapsed = started.elapsed();
    let depth_reached = {
        let mut progress = lock(progress);
        progress.finished = Some((elapsed, reason));
        progress.depth_reached
    };
    tracing::trace!(entries = table.len(), hits = table.hits(), "transposition table");
    tracing::info!(
        depth_reached,
        elapsed_ms = elapsed.as_millis() as u64,
        reason = ?reason,
        "search finished"
    );

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CENTER;
    use crate::game::tests::{c, random_game};
    use crate::search::search_fixed_depth;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn midgame(seed: u64) -> GameState {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        random_game(&mut rng, 8)
    }

    #[test]
    fn test_cancel_before_first_depth_uses_fallback() {
        let state = midgame(1);
        let first = state.legal_moves().next();
        let stop = StopSignal::new();
        stop.request_stop();

        let control = SearchControl::start_with_stop(state.clone(), SearchConfig::fixed_depth(6), stop);
        control.request_cancel();
        let (returned, report) = control.wait();

        assert_eq!(report.best_move, first);
        assert_eq!(report.value, 0);
        assert_eq!(report.nodes, 0);
        assert_eq!(report.depth_reached, 0);
        assert_eq!(report.stop_reason, StopReason::Stopped);
        assert_eq!(returned, state);
    }

    #[test]
    fn test_forced_win_stops_early() {
        let state = GameState::from_moves(&[
            CENTER,
            c(10, 11),
            c(11, 10),
            c(11, 11),
            c(12, 10),
            c(12, 11),
            c(13, 10),
            c(13, 11),
        ])
        .unwrap();
        let control = SearchControl::start(state, SearchConfig::fixed_depth(6));
        let (_, report) = control.wait();

        assert_eq!(report.stop_reason, StopReason::ForcedWin);
        assert_eq!(report.depth_reached, 1);
        assert_eq!(report.value, MAX_SCORE);
        assert_eq!(report.best_move, Some(c(14, 10)));
    }

    #[test]
    fn test_completed_depths_match_fixed_search() {
        let mut state = midgame(2);
        let expected = search_fixed_depth(&mut state, 3);

        let control = SearchControl::start(state.clone(), SearchConfig::fixed_depth(3));
        let (returned, report) = control.wait();

        assert_eq!(report.stop_reason, StopReason::DepthLimit);
        assert_eq!(report.depth_reached, 3);
        assert_eq!(report.value, expected.value);
        assert!(report.best_move.is_some());
        assert_eq!(returned, state);
    }

    #[test]
    fn test_deadline_stops_deep_search() {
        let state = midgame(3);
        let config = SearchConfig::default().with_max_depth(60).with_time_limit_ms(20);
        let control = SearchControl::start(state, config);
        while !control.is_finished() {
            let _ = control.tick();
            thread::sleep(Duration::from_millis(1));
        }

        assert!(control.depth_reached() < 60);
        assert!(control.result().best_move.is_some());
        let frozen = control.elapsed();
        assert_eq!(control.elapsed(), frozen);

        let (_, report) = control.wait();
        assert_eq!(report.stop_reason, StopReason::Stopped);
    }

    #[test]
    fn test_finished_game_keeps_fallback_move() {
        let state = GameState::from_moves(&[
            CENTER,
            c(10, 11),
            c(11, 10),
            c(11, 11),
            c(12, 10),
            c(12, 11),
            c(13, 10),
            c(13, 11),
            c(14, 10),
        ])
        .unwrap();
        assert!(state.is_end_game());
        let first = state.legal_moves().next();

        let (_, report) = SearchControl::start(state, SearchConfig::fixed_depth(4)).wait();
        assert_eq!(report.value, -MAX_SCORE);
        assert_eq!(report.best_move, first);
        assert_eq!(report.depth_reached, 1);
    }

    #[test]
    fn test_drop_cancels_and_joins() {
        let control = SearchControl::start(midgame(4), SearchConfig::fixed_depth(60));
        control.request_cancel();
        control.request_cancel();
        drop(control);
    }
}
