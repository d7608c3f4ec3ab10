//! Position evaluation

use crate::game::GameState;

/// Terminal score; heuristic values always stay strictly inside it
pub const MAX_SCORE: i32 = 800;

/// Weight of the longest-line difference
const LINE_WEIGHT: i32 = 10;

/// Weight of the open-window difference
const WINDOW_WEIGHT: i32 = 1;

/// Evaluate position from current player's perspective
///
/// A won position is `MAX_SCORE` for the winner and `-MAX_SCORE` for the
/// loser. Otherwise the line and window differences are weighed.
pub fn evaluate(state: &GameState) -> i32 {
    let score = state.score();
    let current = state.current_player();
    let opponent = current.opponent();

    if score.has_won(current) {
        return MAX_SCORE;
    }
    if score.has_won(opponent) {
        return -MAX_SCORE;
    }

    let lines = score.line(current) as i32 - score.line(opponent) as i32;
    let windows = score.open_windows(current) as i32 - score.open_windows(opponent) as i32;
    let value = LINE_WEIGHT * lines + WINDOW_WEIGHT * windows;
    value.clamp(-MAX_SCORE + 1, MAX_SCORE - 1)
}
