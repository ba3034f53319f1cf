//! Seats and grid cells.
//!
//! A cell is either unclaimed and empty, or owned by one seat and holding
//! at least some troops. Troops are split into the unmoved stack, which may
//! still act this turn, and the moved stack, which is locked until the
//! owner's next turn begins.

use super::troops::Troops;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Seat {
    One = 1,
    Two = 2,
}

/// Both seats in turn order.
pub const ALL_SEATS: [Seat; 2] = [Seat::One, Seat::Two];

impl Seat {
    pub const fn opponent(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    /// The seat number used on the wire (1 or 2).
    pub const fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Seat> {
        match n {
            1 => Some(Seat::One),
            2 => Some(Seat::Two),
            _ => None,
        }
    }

    /// Zero-based index for per-seat arrays.
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// The column where this seat deploys reserves and takes damage.
    pub const fn deployment_column(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => super::grid::COLS - 1,
        }
    }

    /// Column offset pointing at the opponent's side of the board.
    pub const fn forward(self) -> isize {
        match self {
            Seat::One => 1,
            Seat::Two => -1,
        }
    }
}

/// One node on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub owner: Option<Seat>,
    /// Unmoved troops, eligible to move this turn.
    pub troops: Troops,
    /// Troops that already moved this turn.
    pub moved: Troops,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        owner: None,
        troops: Troops::ZERO,
        moved: Troops::ZERO,
    };

    pub fn total(&self) -> Troops {
        self.troops + self.moved
    }

    pub fn is_owned_by(&self, seat: Seat) -> bool {
        self.owner == Some(seat)
    }

    /// True if `seat` may deploy here: owned by `seat` or unclaimed.
    pub fn is_open_to(&self, seat: Seat) -> bool {
        self.owner.map_or(true, |o| o == seat)
    }

    /// Resets the cell to unclaimed and empty.
    pub fn clear(&mut self) {
        *self = Cell::EMPTY;
    }

    /// Ownership and troop presence agree.
    pub fn is_consistent(&self) -> bool {
        self.owner.is_none() == self.total().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_numbers_roundtrip() {
        for seat in ALL_SEATS {
            assert_eq!(Seat::from_number(seat.number()), Some(seat));
        }
        assert_eq!(Seat::from_number(0), None);
        assert_eq!(Seat::from_number(3), None);
    }

    #[test]
    fn deployment_columns_face_each_other() {
        assert_eq!(Seat::One.deployment_column(), 0);
        assert_eq!(Seat::Two.deployment_column(), 4);
        assert_eq!(Seat::One.opponent(), Seat::Two);
        assert_eq!(Seat::One.forward(), -Seat::Two.forward());
    }

    #[test]
    fn empty_cell_is_consistent() {
        assert!(Cell::EMPTY.is_consistent());
        assert!(Cell::EMPTY.is_open_to(Seat::One));
        assert!(Cell::EMPTY.is_open_to(Seat::Two));
    }

    #[test]
    fn ownerless_troops_are_inconsistent() {
        let cell = Cell {
            owner: None,
            troops: Troops::ONE,
            moved: Troops::ZERO,
        };
        assert!(!cell.is_consistent());

        let cell = Cell {
            owner: Some(Seat::Two),
            troops: Troops::ZERO,
            moved: Troops::ZERO,
        };
        assert!(!cell.is_consistent());
    }

    #[test]
    fn total_counts_both_stacks() {
        let cell = Cell {
            owner: Some(Seat::One),
            troops: Troops::whole(2),
            moved: Troops::whole(3),
        };
        assert_eq!(cell.total(), Troops::whole(5));
        assert!(!cell.is_open_to(Seat::Two));
    }
}
