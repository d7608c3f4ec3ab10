//! Hex board geometry with offset coordinates
//!
//! The playable area is a side-10 hexagon (271 cells) embedded in a 21x21
//! array. Odd rows are shifted half a cell to the right. A one-cell padding
//! ring guarantees that every in-bounds cell has all six neighbours inside
//! the array, so walks never need to clip at the array edge.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ParseCellError;

/// Cells per side of the playable hexagon
pub const BOARD_SIDE: i8 = 10;

/// Width and height of the backing array (hexagon diameter plus padding)
pub const GRID_SIZE: usize = 2 * BOARD_SIDE as usize + 1;

/// Number of array slots, in-bounds or not
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Number of playable cells: 3 * side * (side - 1) + 1
pub const CELL_COUNT: usize = 271;

/// Length of a winning line
pub const LINE_LENGTH: usize = 5;

/// Offset coordinates into the backing array
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i8,
    pub y: i8,
}

/// The fixed opening cell
pub const CENTER: Cell = Cell::new(BOARD_SIDE, BOARD_SIDE);

impl Cell {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Slot in the backing array (row major)
    #[inline]
    pub fn slot(self) -> usize {
        self.y as usize * GRID_SIZE + self.x as usize
    }

    fn from_slot(slot: usize) -> Self {
        Cell::new((slot % GRID_SIZE) as i8, (slot / GRID_SIZE) as i8)
    }

    fn in_array(self) -> bool {
        (0..GRID_SIZE as i8).contains(&self.x) && (0..GRID_SIZE as i8).contains(&self.y)
    }

    /// Check if this cell lies inside the playable hexagon
    ///
    /// Top and bottom edges are whole rows; the four slanted edges are
    /// bounds on the axial column `dq` and on `dq + dr`.
    pub fn is_valid(self) -> bool {
        if !self.in_array() {
            return false;
        }
        let radius = BOARD_SIDE - 1;
        let dr = self.y - BOARD_SIDE;
        let dq = self.x - self.y / 2 - BOARD_SIDE / 2;
        dr.abs() <= radius
            && dq >= -radius
            && dq <= radius
            && dq + dr >= -radius
            && dq + dr <= radius
    }

    /// Hex distance from the centre cell
    pub fn distance_to_center(self) -> i8 {
        let dr = self.y - BOARD_SIDE;
        let dq = self.x - self.y / 2 - BOARD_SIDE / 2;
        (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
    }

    /// Raw neighbour in a direction, without any bounds check
    fn step(self, direction: Direction) -> Cell {
        let even = self.y % 2 == 0;
        let (dx, dy) = match direction {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::TopRight => (if even { 0 } else { 1 }, -1),
            Direction::TopLeft => (if even { -1 } else { 0 }, -1),
            Direction::BottomLeft => (if even { -1 } else { 0 }, 1),
            Direction::BottomRight => (if even { 0 } else { 1 }, 1),
        };
        Cell::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Cell {
    type Err = ParseCellError;

    /// Parse `"x,y"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .trim()
            .split_once(',')
            .ok_or_else(|| ParseCellError::Format(s.to_string()))?;
        let x = x
            .trim()
            .parse::<i8>()
            .map_err(|_| ParseCellError::Format(s.to_string()))?;
        let y = y
            .trim()
            .parse::<i8>()
            .map_err(|_| ParseCellError::Format(s.to_string()))?;
        let cell = Cell::new(x, y);
        if !cell.is_valid() {
            return Err(ParseCellError::OutOfBounds(cell));
        }
        Ok(cell)
    }
}

/// Neighbour directions in counter-clockwise order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right = 0,
    TopRight = 1,
    TopLeft = 2,
    Left = 3,
    BottomLeft = 4,
    BottomRight = 5,
}

pub const DIRECTIONS: [Direction; 6] = [
    Direction::Right,
    Direction::TopRight,
    Direction::TopLeft,
    Direction::Left,
    Direction::BottomLeft,
    Direction::BottomRight,
];

/// One direction per undirected axis, used for windows and line walks
pub const AXES: [Direction; 3] = [
    Direction::Right,
    Direction::BottomRight,
    Direction::BottomLeft,
];

impl Direction {
    #[inline]
    pub fn from_index(index: usize) -> Self {
        DIRECTIONS[index % 6]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Next direction counter-clockwise
    pub fn ccw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Next direction clockwise
    pub fn cw(self) -> Self {
        Self::from_index(self.index() + 5)
    }
}

/// A straight run of five in-bounds cells
pub type Window = [Cell; LINE_LENGTH];

/// Precomputed board structure, shared read-only by every game
#[derive(Debug)]
pub struct Board {
    neighbours: Vec<[Cell; 6]>,
    valid: Vec<bool>,
    index: Vec<Option<u16>>,
    cells: Vec<Cell>,
    windows: Vec<Window>,
}

static BOARD: OnceLock<Board> = OnceLock::new();

impl Board {
    /// The process-wide board, built on first use
    pub fn get() -> &'static Board {
        BOARD.get_or_init(Board::new)
    }

    fn new() -> Self {
        let mut neighbours = vec![[Cell::new(0, 0); 6]; GRID_CELLS];
        let mut valid = vec![false; GRID_CELLS];
        let mut index = vec![None; GRID_CELLS];
        let mut cells = Vec::with_capacity(CELL_COUNT);

        for slot in 0..GRID_CELLS {
            let cell = Cell::from_slot(slot);
            if !cell.is_valid() {
                continue;
            }
            valid[slot] = true;
            index[slot] = Some(cells.len() as u16);
            cells.push(cell);
            for direction in DIRECTIONS {
                neighbours[slot][direction.index()] = cell.step(direction);
            }
        }
        debug_assert_eq!(cells.len(), CELL_COUNT);

        let mut board = Self {
            neighbours,
            valid,
            index,
            cells,
            windows: Vec::new(),
        };
        board.windows = board.collect_windows();
        board
    }

    fn collect_windows(&self) -> Vec<Window> {
        let mut windows = Vec::new();
        for &start in &self.cells {
            for axis in AXES {
                let mut window = [start; LINE_LENGTH];
                let mut len = 1;
                let mut current = start;
                while len < LINE_LENGTH {
                    current = self.neighbour(current, axis);
                    if !self.is_valid(current) {
                        break;
                    }
                    window[len] = current;
                    len += 1;
                }
                if len == LINE_LENGTH {
                    windows.push(window);
                }
            }
        }
        windows
    }

    /// Neighbour of an in-bounds cell. May itself be out of bounds.
    #[inline]
    pub fn neighbour(&self, cell: Cell, direction: Direction) -> Cell {
        self.neighbours[cell.slot()][direction.index()]
    }

    /// All six neighbours of an in-bounds cell, in direction order
    #[inline]
    pub fn neighbours(&self, cell: Cell) -> &[Cell; 6] {
        &self.neighbours[cell.slot()]
    }

    #[inline]
    pub fn is_valid(&self, cell: Cell) -> bool {
        cell.in_array() && self.valid[cell.slot()]
    }

    /// Dense index in `0..CELL_COUNT` for in-bounds cells
    #[inline]
    pub fn linear_index(&self, cell: Cell) -> Option<usize> {
        if !cell.in_array() {
            return None;
        }
        self.index[cell.slot()].map(usize::from)
    }

    /// Every playable cell, row by row
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_count() {
        let board = Board::get();
        assert_eq!(board.cells().len(), CELL_COUNT);
        for (i, &cell) in board.cells().iter().enumerate() {
            assert_eq!(board.linear_index(cell), Some(i));
        }
    }

    #[test]
    fn test_cell_validity() {
        assert!(CENTER.is_valid());
        // Widest row spans the whole array except the padding
        assert!(Cell::new(1, 10).is_valid());
        assert!(Cell::new(19, 10).is_valid());
        assert!(!Cell::new(0, 10).is_valid());
        assert!(!Cell::new(20, 10).is_valid());
        // Top row has ten cells
        let top: Vec<_> = (0..GRID_SIZE as i8)
            .map(|x| Cell::new(x, 1))
            .filter(|c| c.is_valid())
            .collect();
        assert_eq!(top.len(), BOARD_SIDE as usize);
        assert!(!Cell::new(10, 0).is_valid());
        assert!(!Cell::new(10, 20).is_valid());
        assert!(!Cell::new(-1, 3).is_valid());
    }

    #[test]
    fn test_board_is_symmetric() {
        // Every ring around the centre is complete
        let board = Board::get();
        let max = board
            .cells()
            .iter()
            .map(|c| c.distance_to_center())
            .max()
            .unwrap();
        assert_eq!(max, BOARD_SIDE - 1);
        let ring = board
            .cells()
            .iter()
            .filter(|c| c.distance_to_center() == BOARD_SIDE - 1)
            .count();
        assert_eq!(ring, 6 * (BOARD_SIDE as usize - 1));
    }

    #[test]
    fn test_neighbours_are_mutual() {
        let board = Board::get();
        for &cell in board.cells() {
            for direction in DIRECTIONS {
                let n = board.neighbour(cell, direction);
                if board.is_valid(n) {
                    assert_eq!(board.neighbour(n, direction.opposite()), cell);
                }
            }
        }
    }

    #[test]
    fn test_adjacent_directions_touch() {
        // The neighbour at d+1, seen from the neighbour at d, sits at d+2
        let board = Board::get();
        for direction in DIRECTIONS {
            let a = board.neighbour(CENTER, direction);
            let b = board.neighbour(CENTER, direction.ccw());
            assert_eq!(board.neighbour(a, direction.ccw().ccw()), b);
            assert_eq!(board.neighbour(b, direction.cw()), a);
        }
    }

    #[test]
    fn test_windows() {
        let board = Board::get();
        assert_eq!(board.windows().len(), 585);
        for window in board.windows() {
            assert!(window.iter().all(|&c| board.is_valid(c)));
        }
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!("10,10".parse::<Cell>().unwrap(), CENTER);
        assert_eq!(" 11 , 9 ".parse::<Cell>().unwrap(), Cell::new(11, 9));
        assert!(matches!("10".parse::<Cell>(), Err(ParseCellError::Format(_))));
        assert!(matches!("0,0".parse::<Cell>(), Err(ParseCellError::OutOfBounds(_))));
        assert_eq!(CENTER.to_string(), "10,10");
    }
}
