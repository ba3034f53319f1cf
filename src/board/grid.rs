//! The fixed 3x5 board.
//!
//! Cells are stored row-major in a fixed-size array, so the grid is `Copy`
//! and needs no allocation. Adjacency is 4-neighbour Manhattan distance 1
//! with no wraparound.

use std::ops::{Index, IndexMut};

use super::cell::{Cell, Seat};
use super::troops::Troops;

pub const ROWS: usize = 3;
pub const COLS: usize = 5;
pub const CELL_COUNT: usize = ROWS * COLS;

/// The contested column whose cells grant income.
pub const MIDDLE_COL: usize = COLS / 2;

/// A position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Creates a coordinate, returning `None` if it lies off the board.
    pub fn new(row: usize, col: usize) -> Option<Coord> {
        (row < ROWS && col < COLS).then_some(Coord { row, col })
    }

    /// True if the two coordinates share an edge.
    pub fn is_adjacent(self, other: Coord) -> bool {
        is_adjacent(self.row, self.col, other.row, other.col)
    }

    /// The cell `dc` columns away in the same row, if on the board.
    pub fn offset_col(self, dc: isize) -> Option<Coord> {
        let col = self.col.checked_add_signed(dc)?;
        Coord::new(self.row, col)
    }

    /// All on-board orthogonal neighbours.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        const DELTAS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        DELTAS.into_iter().filter_map(move |(dr, dc)| {
            let row = self.row.checked_add_signed(dr)?;
            let col = self.col.checked_add_signed(dc)?;
            Coord::new(row, col)
        })
    }

    /// Every coordinate in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Coord { row, col }))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Returns true when `(r1, c1)` and `(r2, c2)` are orthogonal neighbours.
pub fn is_adjacent(r1: usize, c1: usize, r2: usize, c2: usize) -> bool {
    r1.abs_diff(r2) + c1.abs_diff(c2) == 1
}

/// The board: 15 cells addressed by `Coord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grid {
    cells: [[Cell; COLS]; ROWS],
}

impl Grid {
    pub fn empty() -> Self {
        Grid {
            cells: [[Cell::EMPTY; COLS]; ROWS],
        }
    }

    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        Coord::all().map(move |c| (c, &self[c]))
    }

    /// Folds each of `seat`'s moved troops back into its unmoved stack.
    pub fn reset_moved_troops(&mut self, seat: Seat) {
        for row in self.cells.iter_mut() {
            for cell in row.iter_mut().filter(|c| c.is_owned_by(seat)) {
                cell.troops += cell.moved;
                cell.moved = Troops::ZERO;
            }
        }
    }

    /// Number of cells in `col` owned by `seat`.
    pub fn owned_in_column(&self, seat: Seat, col: usize) -> usize {
        (0..ROWS)
            .filter(|&row| self.cells[row][col].is_owned_by(seat))
            .count()
    }

    /// True if `seat` owns any cell with unmoved troops.
    pub fn has_movable(&self, seat: Seat) -> bool {
        self.iter()
            .any(|(_, c)| c.is_owned_by(seat) && !c.troops.is_zero())
    }

    /// Returns the first cell whose ownership and troop count disagree.
    pub fn find_inconsistency(&self) -> Option<Coord> {
        self.iter().find(|(_, c)| !c.is_consistent()).map(|(c, _)| c)
    }
}

impl Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, at: Coord) -> &Cell {
        &self.cells[at.row][at.col]
    }
}

impl IndexMut<Coord> for Grid {
    fn index_mut(&mut self, at: Coord) -> &mut Cell {
        &mut self.cells[at.row][at.col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    #[test]
    fn coord_bounds() {
        assert!(Coord::new(2, 4).is_some());
        assert!(Coord::new(3, 0).is_none());
        assert!(Coord::new(0, 5).is_none());
        assert_eq!(Coord::all().count(), CELL_COUNT);
    }

    #[test]
    fn adjacency_is_orthogonal_only() {
        assert!(is_adjacent(1, 1, 0, 1));
        assert!(is_adjacent(1, 1, 1, 2));
        assert!(!is_adjacent(1, 1, 0, 0));
        assert!(!is_adjacent(1, 1, 1, 1));
        assert!(!is_adjacent(0, 0, 0, 2));
    }

    #[test]
    fn corner_has_two_neighbors() {
        let n: Vec<Coord> = at(0, 0).neighbors().collect();
        assert_eq!(n.len(), 2);
        assert!(n.contains(&at(1, 0)));
        assert!(n.contains(&at(0, 1)));
        assert_eq!(at(1, 2).neighbors().count(), 4);
    }

    #[test]
    fn offset_col_stays_on_board() {
        assert_eq!(at(1, 3).offset_col(1), Some(at(1, 4)));
        assert_eq!(at(1, 4).offset_col(1), None);
        assert_eq!(at(1, 0).offset_col(-1), None);
    }

    #[test]
    fn reset_moved_troops_only_touches_owner() {
        let mut grid = Grid::empty();
        grid[at(0, 0)] = Cell {
            owner: Some(Seat::One),
            troops: Troops::whole(1),
            moved: Troops::whole(2),
        };
        grid[at(0, 4)] = Cell {
            owner: Some(Seat::Two),
            troops: Troops::ZERO,
            moved: Troops::whole(4),
        };
        grid.reset_moved_troops(Seat::One);
        assert_eq!(grid[at(0, 0)].troops, Troops::whole(3));
        assert_eq!(grid[at(0, 0)].moved, Troops::ZERO);
        assert_eq!(grid[at(0, 4)].moved, Troops::whole(4));
    }

    #[test]
    fn movable_and_inconsistency_checks() {
        let mut grid = Grid::empty();
        assert!(!grid.has_movable(Seat::One));
        assert_eq!(grid.find_inconsistency(), None);

        grid[at(2, 2)] = Cell {
            owner: Some(Seat::One),
            troops: Troops::ZERO,
            moved: Troops::whole(2),
        };
        assert!(!grid.has_movable(Seat::One));
        assert_eq!(grid.owned_in_column(Seat::One, MIDDLE_COL), 1);

        grid[at(1, 1)].troops = Troops::ONE;
        assert_eq!(grid.find_inconsistency(), Some(at(1, 1)));
    }
}
