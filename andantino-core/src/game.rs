//! Game state with incremental make/undo

use crate::board::{Board, Cell, Direction, AXES, CENTER, DIRECTIONS, GRID_CELLS, LINE_LENGTH};
use crate::error::MoveError;
use crate::eval;
use crate::hash::StateHash;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    White = 0,
    Black = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    WhiteWins,
    BlackWins,
}

impl GameResult {
    fn win_for(player: Player) -> Self {
        match player {
            Player::White => GameResult::WhiteWins,
            Player::Black => GameResult::BlackWins,
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Ongoing => None,
            GameResult::WhiteWins => Some(Player::White),
            GameResult::BlackWins => Some(Player::Black),
        }
    }
}

/// A played stone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub cell: Cell,
    pub player: Player,
}

/// Per-cell bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StaticLocation {
    occupant: Option<Player>,
    /// Ply at which the stone was placed
    placed_at: Option<u16>,
    /// Position in the frontier list, if the cell has an entry
    frontier_index: Option<u16>,
    /// Occupied neighbours
    neighbours: u8,
}

/// Frontier entry
///
/// Entries are appended as the frontier grows and only ever removed from the
/// tail. A played entry stays in place with `available == false` until the
/// move is undone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSpot {
    pub cell: Cell,
    /// Ply after which the entry was appended (0 for the opening seed)
    pub added_at: u16,
    pub available: bool,
}

/// Score snapshot after a ply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Longest straight line per player
    pub line: [u8; 2],
    /// Closed encirclement per player
    pub circle: [bool; 2],
    /// Windows still free of opponent stones, per player
    pub open_windows: [u16; 2],
}

impl Score {
    fn initial() -> Self {
        let windows = Board::get().windows().len() as u16;
        Self {
            line: [0; 2],
            circle: [false; 2],
            open_windows: [windows; 2],
        }
    }

    pub fn line(&self, player: Player) -> u8 {
        self.line[player.index()]
    }

    pub fn has_circle(&self, player: Player) -> bool {
        self.circle[player.index()]
    }

    pub fn open_windows(&self, player: Player) -> u16 {
        self.open_windows[player.index()]
    }

    pub fn has_won(&self, player: Player) -> bool {
        self.has_circle(player) || self.line(player) as usize >= LINE_LENGTH
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Mutable game position
///
/// Mutated in place by paired [`GameState::make_move`] /
/// [`GameState::undo_move`] calls that must nest like a stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    current_player: Player,
    ply: u16,
    moves: Vec<Move>,
    frontier: Vec<FreeSpot>,
    locations: Vec<StaticLocation>,
    /// One snapshot per ply plus the initial one
    scores: Vec<Score>,
    hash: StateHash,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board; the only legal move is the centre
    pub fn new() -> Self {
        let mut state = Self {
            current_player: Player::White,
            ply: 0,
            moves: Vec::new(),
            frontier: Vec::new(),
            locations: vec![StaticLocation::default(); GRID_CELLS],
            scores: vec![Score::initial()],
            hash: StateHash::new(),
        };
        state.push_frontier(CENTER, 0);
        state
    }

    /// Replay a sequence of moves, validating each
    pub fn from_moves(cells: &[Cell]) -> Result<Self, MoveError> {
        let mut state = Self::new();
        for &cell in cells {
            state.try_make_move(cell)?;
        }
        Ok(state)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Player to move
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Number of stones played
    pub fn ply(&self) -> u16 {
        self.ply
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    /// Raw frontier list, including spent entries
    pub fn frontier(&self) -> &[FreeSpot] {
        &self.frontier
    }

    /// Currently playable cells, in frontier order
    pub fn legal_moves(&self) -> impl Iterator<Item = Cell> + '_ {
        self.frontier
            .iter()
            .filter(|spot| spot.available)
            .map(|spot| spot.cell)
    }

    /// Latest score snapshot
    pub fn score(&self) -> &Score {
        // Never empty: the initial snapshot is never popped
        &self.scores[self.scores.len() - 1]
    }

    pub fn hash(&self) -> &StateHash {
        &self.hash
    }

    /// Stone on a cell; `None` for empty and out-of-board cells
    pub fn occupant(&self, cell: Cell) -> Option<Player> {
        if Board::get().is_valid(cell) {
            self.locations[cell.slot()].occupant
        } else {
            None
        }
    }

    /// Ply at which the stone on `cell` was placed
    pub fn placed_at(&self, cell: Cell) -> Option<u16> {
        if Board::get().is_valid(cell) {
            self.locations[cell.slot()].placed_at
        } else {
            None
        }
    }

    /// Number of occupied neighbours of `cell`
    pub fn occupied_neighbours(&self, cell: Cell) -> u8 {
        if Board::get().is_valid(cell) {
            self.locations[cell.slot()].neighbours
        } else {
            0
        }
    }

    pub fn is_free_spot(&self, cell: Cell) -> bool {
        if !Board::get().is_valid(cell) {
            return false;
        }
        self.locations[cell.slot()]
            .frontier_index
            .is_some_and(|i| self.frontier[i as usize].available)
    }

    /// True once either player has five in a row or an encirclement
    pub fn is_end_game(&self) -> bool {
        let score = self.score();
        score.has_won(Player::White) || score.has_won(Player::Black)
    }

    pub fn result(&self) -> GameResult {
        let score = self.score();
        // The last mover is the only one whose fields just changed
        let last = self.current_player.opponent();
        if score.has_won(last) {
            GameResult::win_for(last)
        } else if score.has_won(last.opponent()) {
            GameResult::win_for(last.opponent())
        } else {
            GameResult::Ongoing
        }
    }

    /// Evaluation from the point of view of the player to move
    pub fn evaluate(&self) -> i32 {
        eval::evaluate(self)
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Validate and play a move coming from outside the engine
    pub fn try_make_move(&mut self, cell: Cell) -> Result<(), MoveError> {
        if self.is_end_game() {
            return Err(MoveError::GameOver);
        }
        if !Board::get().is_valid(cell) {
            return Err(MoveError::OutOfBounds(cell));
        }
        if self.occupant(cell).is_some() {
            return Err(MoveError::Occupied(cell));
        }
        if !self.is_free_spot(cell) {
            return Err(MoveError::NotOnFrontier(cell));
        }
        self.make_move(cell);
        Ok(())
    }

    /// Undo the last move, if any
    pub fn try_undo_move(&mut self) -> Result<Move, MoveError> {
        let last = self.last_move().ok_or(MoveError::NoHistory)?;
        self.undo_move();
        Ok(last)
    }

    /// Play `cell` and undo it when the guard is dropped
    pub fn play(&mut self, cell: Cell) -> MoveGuard<'_> {
        self.make_move(cell);
        MoveGuard { state: self }
    }

    /// Play a move
    ///
    /// # Panics
    /// If `cell` is not an available frontier entry.
    pub fn make_move(&mut self, cell: Cell) {
        let board = Board::get();
        let frontier_index = match self.frontier_index(cell) {
            Some(i) if self.frontier[i].available => i,
            _ => panic!("make_move: {cell} is not an available frontier cell"),
        };
        let player = self.current_player;

        self.moves.push(Move { cell, player });
        let location = &mut self.locations[cell.slot()];
        location.occupant = Some(player);
        location.placed_at = Some(self.ply);
        self.hash.set(player, linear_index(cell));
        self.frontier[frontier_index].available = false;

        self.ply += 1;
        self.current_player = player.opponent();

        // The opening stone's ring is only a temporary frontier; once the
        // second stone is down, the real frontier is cells touching two stones
        if self.moves.len() == 2 {
            self.truncate_frontier(1);
        }

        let opening = self.moves.len() == 1;
        for &neighbour in board.neighbours(cell) {
            if !board.is_valid(neighbour) {
                continue;
            }
            let location = &mut self.locations[neighbour.slot()];
            location.neighbours += 1;
            if location.occupant.is_none() && (opening || location.neighbours == 2) {
                self.push_frontier(neighbour, self.ply);
            }
        }

        let mut score = *self.score();
        let p = player.index();
        let o = player.opponent().index();
        score.line[p] = score.line[p].max(self.line_through(cell, player));
        let blocked = self.blocked_windows(cell, player);
        debug_assert!(score.open_windows[o] >= blocked);
        score.open_windows[o] = score.open_windows[o].saturating_sub(blocked);
        if !score.circle[p] && self.makes_circle(cell) {
            score.circle[p] = true;
        }
        self.scores.push(score);
    }

    /// Undo the last move
    ///
    /// # Panics
    /// If no move has been played.
    pub fn undo_move(&mut self) {
        let board = Board::get();
        let Some(&last) = self.moves.last() else {
            panic!("undo_move: no move to undo");
        };

        self.scores.pop();

        if self.moves.len() == 2 {
            self.truncate_frontier(1);
            self.release_neighbours(last.cell);
            for &neighbour in board.neighbours(self.moves[0].cell) {
                if board.is_valid(neighbour) {
                    self.push_frontier(neighbour, 1);
                }
            }
        } else {
            while let Some(&spot) = self.frontier.last() {
                if spot.added_at != self.ply {
                    break;
                }
                self.locations[spot.cell.slot()].frontier_index = None;
                self.frontier.pop();
            }
            let Some(index) = self.frontier_index(last.cell) else {
                panic!("undo_move: {} lost its frontier entry", last.cell);
            };
            self.frontier[index].available = true;
            self.release_neighbours(last.cell);
        }

        self.ply -= 1;
        self.current_player = last.player;

        let location = &mut self.locations[last.cell.slot()];
        location.occupant = None;
        location.placed_at = None;
        self.hash.unset(last.player, linear_index(last.cell));
        self.moves.pop();
    }

    // ========================================================================
    // FRONTIER HELPERS
    // ========================================================================

    fn frontier_index(&self, cell: Cell) -> Option<usize> {
        if !Board::get().is_valid(cell) {
            return None;
        }
        self.locations[cell.slot()].frontier_index.map(usize::from)
    }

    fn push_frontier(&mut self, cell: Cell, added_at: u16) {
        self.locations[cell.slot()].frontier_index = Some(self.frontier.len() as u16);
        self.frontier.push(FreeSpot {
            cell,
            added_at,
            available: true,
        });
    }

    fn truncate_frontier(&mut self, len: usize) {
        while self.frontier.len() > len {
            if let Some(spot) = self.frontier.pop() {
                self.locations[spot.cell.slot()].frontier_index = None;
            }
        }
    }

    fn release_neighbours(&mut self, cell: Cell) {
        let board = Board::get();
        for &neighbour in board.neighbours(cell) {
            if board.is_valid(neighbour) {
                self.locations[neighbour.slot()].neighbours -= 1;
            }
        }
    }

    // ========================================================================
    // SCORING
    // ========================================================================

    /// Consecutive stones of `player` starting next to `cell`
    fn run_length(&self, cell: Cell, direction: Direction, player: Player) -> u8 {
        let board = Board::get();
        let mut count = 0;
        let mut current = board.neighbour(cell, direction);
        while self.occupant(current) == Some(player) {
            count += 1;
            current = board.neighbour(current, direction);
        }
        count
    }

    /// Longest line of `player` through `cell` over the three axes
    fn line_through(&self, cell: Cell, player: Player) -> u8 {
        AXES.iter()
            .map(|&axis| {
                1 + self.run_length(cell, axis, player)
                    + self.run_length(cell, axis.opposite(), player)
            })
            .max()
            .unwrap_or(1)
    }

    /// Opponent windows through `cell` that had no stone of `player` yet
    ///
    /// Along each axis, `a` and `b` are the in-board cells free of `player`
    /// on either side (at most four each); exactly `a + b - 3` windows of
    /// five fit in that span and contain `cell`.
    fn blocked_windows(&self, cell: Cell, player: Player) -> u16 {
        let board = Board::get();
        let reach = |direction: Direction| {
            let mut count = 0i32;
            let mut current = cell;
            while count < LINE_LENGTH as i32 - 1 {
                current = board.neighbour(current, direction);
                if !board.is_valid(current) || self.occupant(current) == Some(player) {
                    break;
                }
                count += 1;
            }
            count
        };
        AXES.iter()
            .map(|&axis| {
                let span = reach(axis) + reach(axis.opposite());
                (span - (LINE_LENGTH as i32 - 2)).max(0) as u16
            })
            .sum()
    }

    /// Whether the stone just placed on `start` closes a loop around at
    /// least one opponent stone
    ///
    /// For every side of `start` facing a non-owned cell, follow the wall
    /// of own stones keeping that region on the same hand. Stepping onto an
    /// own stone turns one way (+1), rotating in place turns the other (-1).
    /// Returning to the starting side with a net +6 means the walk went once
    /// around the inside of a closed loop; the region behind the start side
    /// is then flood-filled for an opponent stone.
    pub(crate) fn makes_circle(&self, start: Cell) -> bool {
        let board = Board::get();
        let Some(player) = self.occupant(start) else {
            return false;
        };
        let mut covered = [false; 6];

        for first in DIRECTIONS {
            if covered[first.index()] {
                continue;
            }
            if self.occupant(board.neighbour(start, first)) != Some(player) {
                let mut current = start;
                let mut side = first;
                let mut turns = 0i32;
                loop {
                    let ahead = board.neighbour(current, side.ccw());
                    if self.occupant(ahead) == Some(player) {
                        turns += 1;
                        current = ahead;
                        side = side.cw();
                    } else {
                        turns -= 1;
                        side = side.ccw();
                    }
                    if current == start {
                        covered[side.index()] = true;
                        if side == first {
                            break;
                        }
                    }
                }

                if turns == 6 && self.encloses(board.neighbour(start, first), player.opponent()) {
                    return true;
                }
            }
            covered[first.index()] = true;
        }

        false
    }

    /// Flood-fill over empty cells from `from`, looking for a `target` stone
    fn encloses(&self, from: Cell, target: Player) -> bool {
        let board = Board::get();
        let mut visited = vec![false; GRID_CELLS];
        let mut stack = vec![from];
        while let Some(cell) = stack.pop() {
            if !board.is_valid(cell) || visited[cell.slot()] {
                continue;
            }
            visited[cell.slot()] = true;
            match self.occupant(cell) {
                Some(p) if p == target => return true,
                Some(_) => {}
                None => stack.extend(board.neighbours(cell).iter().copied()),
            }
        }
        false
    }
}

fn linear_index(cell: Cell) -> usize {
    match Board::get().linear_index(cell) {
        Some(index) => index,
        None => panic!("{cell} is outside the board"),
    }
}

// ============================================================================
// MOVE GUARD
// ============================================================================

/// A played move that is undone when dropped
pub struct MoveGuard<'a> {
    state: &'a mut GameState,
}

impl Deref for MoveGuard<'_> {
    type Target = GameState;

    fn deref(&self) -> &GameState {
        self.state
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut GameState {
        self.state
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.state.undo_move();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::eval::MAX_SCORE;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;

    pub(crate) fn c(x: i8, y: i8) -> Cell {
        Cell::new(x, y)
    }

    /// Play `n` random legal moves, stopping early at game end
    pub(crate) fn random_game(rng: &mut ChaCha8Rng, n: usize) -> GameState {
        let mut state = GameState::new();
        for _ in 0..n {
            if state.is_end_game() {
                break;
            }
            let moves: Vec<_> = state.legal_moves().collect();
            let cell = *moves.choose(rng).unwrap();
            state.make_move(cell);
        }
        state
    }

    /// Stones placed directly, bypassing the frontier
    fn with_stones(stones: &[(Cell, Player)]) -> GameState {
        let mut state = GameState::new();
        for &(cell, player) in stones {
            state.locations[cell.slot()].occupant = Some(player);
        }
        state
    }

    fn ring(center: Cell) -> Vec<Cell> {
        Board::get().neighbours(center).to_vec()
    }

    #[test]
    fn test_opening_frontier() {
        let mut game = GameState::new();
        assert_eq!(game.legal_moves().collect::<Vec<_>>(), vec![CENTER]);
        assert_eq!(game.current_player(), Player::White);

        game.make_move(CENTER);
        let legal: BTreeSet<_> = game.legal_moves().collect();
        let expected: BTreeSet<_> = ring(CENTER).into_iter().collect();
        assert_eq!(legal, expected);
        assert_eq!(game.current_player(), Player::Black);
        assert!(!game.is_free_spot(CENTER));
    }

    #[test]
    fn test_second_move_collapses_frontier() {
        let mut game = GameState::new();
        game.make_move(CENTER);
        game.make_move(c(11, 10));
        // Only the two cells touching both stones remain
        let legal: BTreeSet<_> = game.legal_moves().collect();
        assert_eq!(legal, [c(10, 9), c(10, 11)].into_iter().collect());
        assert_eq!(game.frontier()[0].cell, CENTER);
        assert!(!game.frontier()[0].available);
    }

    #[test]
    fn test_undo_second_move_restores_ring() {
        let mut game = GameState::new();
        game.make_move(CENTER);
        let before = game.clone();
        game.make_move(c(9, 11));
        game.undo_move();
        assert_eq!(game, before);
        game.undo_move();
        assert_eq!(game, GameState::new());
    }

    #[test]
    fn test_make_undo_is_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let mut game = GameState::new();
            let mut snapshots = vec![game.clone()];
            while !game.is_end_game() && game.ply() < 60 {
                let moves: Vec<_> = game.legal_moves().collect();
                for &cell in &moves {
                    let before = game.clone();
                    game.make_move(cell);
                    game.undo_move();
                    assert_eq!(game, before);
                }
                game.make_move(*moves.choose(&mut rng).unwrap());
                snapshots.push(game.clone());
            }
            // Unwind the whole game
            snapshots.pop();
            while let Some(expected) = snapshots.pop() {
                game.undo_move();
                assert_eq!(game, expected);
            }
        }
    }

    #[test]
    fn test_hash_ignores_move_order() {
        let a = GameState::from_moves(&[
            CENTER,
            c(11, 10),
            c(10, 9),
            c(11, 9),
            c(9, 9),
            c(10, 11),
        ])
        .unwrap();
        let b = GameState::from_moves(&[
            CENTER,
            c(11, 10),
            c(10, 9),
            c(10, 11),
            c(9, 9),
            c(11, 9),
        ])
        .unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.score(), b.score());
        let la: BTreeSet<_> = a.legal_moves().collect();
        let lb: BTreeSet<_> = b.legal_moves().collect();
        assert_eq!(la, lb);

        let other = GameState::from_moves(&[CENTER, c(11, 10), c(10, 11)]).unwrap();
        assert_ne!(a.hash(), other.hash());
    }

    #[test]
    fn test_frontier_invariant() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let game = random_game(&mut rng, 40);
        let board = Board::get();
        for &cell in board.cells() {
            if game.is_free_spot(cell) {
                assert!(game.occupant(cell).is_none());
                assert!(game.occupied_neighbours(cell) >= 2);
            } else if game.occupant(cell).is_none() && game.ply() >= 2 {
                assert!(game.occupied_neighbours(cell) < 2);
            }
        }
    }

    #[test]
    fn test_five_in_a_row() {
        let mut game = GameState::new();
        let moves = [
            CENTER,
            c(10, 11),
            c(11, 10),
            c(11, 11),
            c(12, 10),
            c(12, 11),
            c(13, 10),
            c(13, 11),
        ];
        for cell in moves {
            game.try_make_move(cell).unwrap();
            assert!(!game.is_end_game());
        }
        assert_eq!(game.score().line(Player::White), 4);
        assert_eq!(game.score().line(Player::Black), 4);
        assert!(game.evaluate().abs() < MAX_SCORE);

        game.try_make_move(c(14, 10)).unwrap();
        assert!(game.is_end_game());
        assert_eq!(game.result(), GameResult::WhiteWins);
        assert_eq!(game.current_player(), Player::Black);
        assert_eq!(game.evaluate(), -MAX_SCORE);
        assert_eq!(game.try_make_move(c(14, 11)), Err(MoveError::GameOver));

        game.undo_move();
        assert!(!game.is_end_game());
        assert_eq!(game.result(), GameResult::Ongoing);
    }

    #[test]
    fn test_filling_gap_into_six_wins() {
        let mut game = GameState::new();
        let moves = [
            CENTER,
            c(10, 11),
            c(11, 10),
            c(11, 11),
            c(11, 12),
            c(12, 12),
            c(12, 11),
            c(13, 12),
            c(13, 11),
            c(9, 11),
            c(13, 10),
            c(14, 12),
            c(14, 10),
            c(14, 11),
            c(15, 10),
            c(9, 10),
        ];
        for cell in moves {
            game.try_make_move(cell).unwrap();
            assert!(!game.is_end_game());
        }
        assert_eq!(game.score().line(Player::White), 3);

        // (10..=11, 10) and (13..=15, 10) join into an overline
        game.try_make_move(c(12, 10)).unwrap();
        assert_eq!(game.score().line(Player::White), 6);
        assert!(game.is_end_game());
        assert_eq!(game.result(), GameResult::WhiteWins);
        assert_eq!(game.evaluate(), -MAX_SCORE);
    }

    #[test]
    fn test_circle_around_stone() {
        // White rings the black stone on (11, 10)
        let mut game = GameState::new();
        let moves = [
            CENTER,
            c(11, 10),
            c(10, 9),
            c(9, 9),
            c(11, 9),
            c(9, 10),
            c(12, 10),
            c(9, 11),
            c(11, 11),
            c(8, 11),
        ];
        for cell in moves {
            game.try_make_move(cell).unwrap();
            assert!(!game.score().has_circle(Player::White));
            assert!(!game.score().has_circle(Player::Black));
        }
        game.try_make_move(c(10, 11)).unwrap();
        assert!(game.score().has_circle(Player::White));
        assert!(!game.score().has_circle(Player::Black));
        assert_eq!(game.result(), GameResult::WhiteWins);
        assert_eq!(game.evaluate(), -MAX_SCORE);
    }

    #[test]
    fn test_circle_needs_opponent_inside() {
        let inside = c(11, 10);
        let stones: Vec<_> = ring(inside).into_iter().map(|c| (c, Player::White)).collect();
        let game = with_stones(&stones);
        for &(cell, _) in &stones {
            assert!(!game.makes_circle(cell));
        }

        let mut with_black = stones.clone();
        with_black.push((inside, Player::Black));
        let game = with_stones(&with_black);
        for &(cell, _) in &stones {
            assert!(game.makes_circle(cell));
        }
    }

    #[test]
    fn test_open_ring_is_not_circle() {
        let inside = c(11, 10);
        let mut stones: Vec<_> = ring(inside).into_iter().map(|c| (c, Player::White)).collect();
        stones.pop();
        stones.push((inside, Player::Black));
        let game = with_stones(&stones);
        for &(cell, player) in &stones {
            if player == Player::White {
                assert!(!game.makes_circle(cell));
            }
        }
    }

    #[test]
    fn test_circle_with_larger_interior() {
        let ring_cells = [
            c(11, 9),
            c(10, 9),
            c(10, 10),
            c(10, 11),
            c(11, 11),
            c(13, 10),
            c(12, 9),
            c(12, 11),
        ];
        let mut stones: Vec<_> = ring_cells.iter().map(|&c| (c, Player::White)).collect();
        // Interior: (11, 10) empty, (12, 10) black
        stones.push((c(12, 10), Player::Black));
        let game = with_stones(&stones);
        assert!(game.makes_circle(c(13, 10)));
        assert!(game.makes_circle(c(10, 10)));

        // Same ring with an empty interior
        let game = with_stones(&stones[..ring_cells.len()]);
        assert!(!game.makes_circle(c(13, 10)));
    }

    #[test]
    fn test_open_windows() {
        let total = Board::get().windows().len() as u16;
        let mut game = GameState::new();
        game.make_move(CENTER);
        // The centre sits in 5 windows per axis
        assert_eq!(game.score().open_windows(Player::Black), total - 15);
        assert_eq!(game.score().open_windows(Player::White), total);

        game.make_move(c(11, 10));
        // Black had no stones yet, so all 15 windows through (11, 10) are newly blocked
        assert_eq!(game.score().open_windows(Player::White), total - 15);
    }

    #[test]
    fn test_open_windows_match_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let game = random_game(&mut rng, 50);
        for player in [Player::White, Player::Black] {
            let open = Board::get()
                .windows()
                .iter()
                .filter(|w| w.iter().all(|&c| game.occupant(c) != Some(player.opponent())))
                .count();
            assert_eq!(game.score().open_windows(player) as usize, open);
        }
    }

    #[test]
    fn test_try_make_move_errors() {
        let mut game = GameState::new();
        assert_eq!(game.try_undo_move(), Err(MoveError::NoHistory));
        assert_eq!(
            game.try_make_move(c(0, 0)),
            Err(MoveError::OutOfBounds(c(0, 0)))
        );
        assert_eq!(
            game.try_make_move(c(11, 10)),
            Err(MoveError::NotOnFrontier(c(11, 10)))
        );
        game.try_make_move(CENTER).unwrap();
        assert_eq!(game.try_make_move(CENTER), Err(MoveError::Occupied(CENTER)));
        assert_eq!(
            game.try_undo_move(),
            Ok(Move {
                cell: CENTER,
                player: Player::White
            })
        );
    }

    #[test]
    #[should_panic(expected = "not an available frontier cell")]
    fn test_make_move_off_frontier_panics() {
        let mut game = GameState::new();
        game.make_move(c(5, 5));
    }

    #[test]
    #[should_panic(expected = "no move to undo")]
    fn test_undo_empty_panics() {
        GameState::new().undo_move();
    }

    #[test]
    fn test_move_guard_undoes() {
        let mut game = GameState::new();
        game.make_move(CENTER);
        let before = game.clone();
        {
            let mut guard = game.play(c(10, 9));
            assert_eq!(guard.ply(), 2);
            let inner: Vec<_> = guard.legal_moves().collect();
            let _nested = guard.play(inner[0]);
        }
        assert_eq!(game, before);
    }

    #[test]
    fn test_placed_at() {
        let game = GameState::from_moves(&[CENTER, c(10, 9)]).unwrap();
        assert_eq!(game.placed_at(CENTER), Some(0));
        assert_eq!(game.placed_at(c(10, 9)), Some(1));
        assert_eq!(game.placed_at(c(10, 11)), None);
        assert_eq!(game.occupant(c(10, 9)), Some(Player::Black));
    }
}
