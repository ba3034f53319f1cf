//! Move and attack resolution.
//!
//! A move takes troops off a source cell's unmoved stack and delivers them
//! to an adjacent cell. Friendly or empty destinations are reinforced;
//! enemy destinations fight by straight troop-count comparison. Delivered
//! troops always land in the moved stack, so they cannot act again this
//! turn.

use crate::board::{Coord, Grid, Seat, Troops};

/// Reasons a move can be refused before any state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("source {0} is not yours")]
    NotOwned(Coord),

    #[error("troops at {0} have already moved this turn")]
    AlreadyMoved(Coord),

    #[error("source {0} has no troops that can move")]
    NoMovableTroops(Coord),

    #[error("{to} is not adjacent to {from}")]
    NotAdjacent { from: Coord, to: Coord },

    #[error("cannot move {requested}: only {available} available")]
    InvalidAmount { requested: Troops, available: Troops },
}

/// What happened at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// The destination was empty or friendly and received the troops.
    Reinforced { amount: Troops },
    /// The attacker won and holds the cell with the survivors.
    Captured { attacker: Troops, defender: Troops, survivors: Troops },
    /// The defender held with the survivors.
    Repelled { attacker: Troops, defender: Troops, survivors: Troops },
    /// Equal forces destroyed each other; the cell is empty.
    MutualDestruction { amount: Troops },
}

impl std::fmt::Display for CombatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            CombatOutcome::Reinforced { amount } => write!(f, "moved {}", amount),
            CombatOutcome::Captured { attacker, defender, survivors } => write!(
                f,
                "battle {} vs {}: attacker wins with {} left",
                attacker, defender, survivors
            ),
            CombatOutcome::Repelled { attacker, defender, survivors } => write!(
                f,
                "battle {} vs {}: defender holds with {} left",
                attacker, defender, survivors
            ),
            CombatOutcome::MutualDestruction { amount } => {
                write!(f, "battle {} vs {}: mutual destruction", amount, amount)
            }
        }
    }
}

/// Checks that `seat` may move `amount` troops from `from` to `to`.
pub fn validate_move(
    grid: &Grid,
    seat: Seat,
    from: Coord,
    to: Coord,
    amount: Troops,
) -> Result<(), MoveError> {
    let src = &grid[from];
    if !src.is_owned_by(seat) {
        return Err(MoveError::NotOwned(from));
    }
    if src.troops.is_zero() {
        return Err(if src.moved.is_zero() {
            MoveError::NoMovableTroops(from)
        } else {
            MoveError::AlreadyMoved(from)
        });
    }
    if !from.is_adjacent(to) {
        return Err(MoveError::NotAdjacent { from, to });
    }
    if amount.is_zero() || amount > src.troops {
        return Err(MoveError::InvalidAmount {
            requested: amount,
            available: src.troops,
        });
    }
    Ok(())
}

/// Moves `amount` troops from `from` to `to` on behalf of `seat`.
///
/// The grid is untouched if validation fails.
pub fn resolve_move(
    grid: &mut Grid,
    seat: Seat,
    from: Coord,
    to: Coord,
    amount: Troops,
) -> Result<CombatOutcome, MoveError> {
    validate_move(grid, seat, from, to, amount)?;

    let src = &mut grid[from];
    src.troops -= amount;
    if src.total().is_zero() {
        src.clear();
    }

    let dst = &mut grid[to];
    let defender_seat = dst.owner;
    let outcome = match defender_seat {
        None => {
            dst.owner = Some(seat);
            dst.moved += amount;
            CombatOutcome::Reinforced { amount }
        }
        Some(owner) if owner == seat => {
            dst.moved += amount;
            CombatOutcome::Reinforced { amount }
        }
        Some(_) => {
            let defender = dst.total();
            let survivors = amount.abs_diff(defender);
            if amount > defender {
                dst.owner = Some(seat);
                dst.troops = Troops::ZERO;
                dst.moved = survivors;
                CombatOutcome::Captured { attacker: amount, defender, survivors }
            } else if amount < defender {
                dst.troops = survivors;
                dst.moved = Troops::ZERO;
                CombatOutcome::Repelled { attacker: amount, defender, survivors }
            } else {
                dst.clear();
                CombatOutcome::MutualDestruction { amount }
            }
        }
    };

    tracing::debug!(?seat, %from, %to, %amount, ?outcome, "move resolved");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn at(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn cell(owner: Seat, troops: u32, moved: u32) -> Cell {
        Cell {
            owner: Some(owner),
            troops: Troops::whole(troops),
            moved: Troops::whole(moved),
        }
    }

    #[test]
    fn move_into_empty_cell_marks_moved() {
        let mut grid = Grid::empty();
        grid[at(1, 0)] = cell(Seat::One, 4, 0);

        let outcome = resolve_move(&mut grid, Seat::One, at(1, 0), at(1, 1), Troops::whole(3)).unwrap();
        assert_eq!(outcome, CombatOutcome::Reinforced { amount: Troops::whole(3) });
        assert_eq!(grid[at(1, 0)], cell(Seat::One, 1, 0));
        assert_eq!(grid[at(1, 1)], cell(Seat::One, 0, 3));
    }

    #[test]
    fn reinforcing_friendly_cell_adds_to_moved_stack() {
        let mut grid = Grid::empty();
        grid[at(0, 0)] = cell(Seat::One, 2, 0);
        grid[at(0, 1)] = cell(Seat::One, 1, 1);

        resolve_move(&mut grid, Seat::One, at(0, 0), at(0, 1), Troops::whole(2)).unwrap();
        assert_eq!(grid[at(0, 0)], Cell::EMPTY);
        assert_eq!(grid[at(0, 1)], cell(Seat::One, 1, 3));
    }

    #[test]
    fn attacker_wins_keeps_difference() {
        let mut grid = Grid::empty();
        grid[at(0, 0)] = cell(Seat::One, 5, 0);
        grid[at(0, 1)] = cell(Seat::Two, 1, 2);

        let outcome = resolve_move(&mut grid, Seat::One, at(0, 0), at(0, 1), Troops::whole(5)).unwrap();
        assert_eq!(
            outcome,
            CombatOutcome::Captured {
                attacker: Troops::whole(5),
                defender: Troops::whole(3),
                survivors: Troops::whole(2),
            }
        );
        assert_eq!(grid[at(0, 1)], cell(Seat::One, 0, 2));
        assert_eq!(grid[at(0, 0)], Cell::EMPTY);
    }

    #[test]
    fn defender_wins_keeps_unmoved_difference() {
        let mut grid = Grid::empty();
        grid[at(0, 0)] = cell(Seat::One, 2, 0);
        grid[at(0, 1)] = cell(Seat::Two, 0, 5);

        resolve_move(&mut grid, Seat::One, at(0, 0), at(0, 1), Troops::whole(2)).unwrap();
        assert_eq!(grid[at(0, 1)], cell(Seat::Two, 3, 0));
    }

    #[test]
    fn equal_forces_destroy_each_other() {
        let mut grid = Grid::empty();
        grid[at(0, 0)] = cell(Seat::One, 3, 1);
        grid[at(0, 1)] = cell(Seat::Two, 3, 0);

        let outcome = resolve_move(&mut grid, Seat::One, at(0, 0), at(0, 1), Troops::whole(3)).unwrap();
        assert_eq!(outcome, CombatOutcome::MutualDestruction { amount: Troops::whole(3) });
        assert_eq!(grid[at(0, 1)], Cell::EMPTY);
        // The moved stack keeps the source owned.
        assert_eq!(grid[at(0, 0)], cell(Seat::One, 0, 1));
    }

    #[test]
    fn rejects_invalid_moves_without_mutation() {
        let mut grid = Grid::empty();
        grid[at(0, 0)] = cell(Seat::One, 2, 0);
        grid[at(1, 1)] = cell(Seat::One, 0, 2);
        let before = grid;

        assert_eq!(
            resolve_move(&mut grid, Seat::Two, at(0, 0), at(0, 1), Troops::ONE),
            Err(MoveError::NotOwned(at(0, 0)))
        );
        assert_eq!(
            resolve_move(&mut grid, Seat::One, at(1, 1), at(1, 2), Troops::ONE),
            Err(MoveError::AlreadyMoved(at(1, 1)))
        );
        assert_eq!(
            resolve_move(&mut grid, Seat::One, at(0, 0), at(1, 1), Troops::ONE),
            Err(MoveError::NotAdjacent { from: at(0, 0), to: at(1, 1) })
        );
        assert!(matches!(
            resolve_move(&mut grid, Seat::One, at(0, 0), at(0, 1), Troops::whole(3)),
            Err(MoveError::InvalidAmount { .. })
        ));
        assert!(matches!(
            resolve_move(&mut grid, Seat::One, at(0, 0), at(0, 1), Troops::ZERO),
            Err(MoveError::InvalidAmount { .. })
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn half_troops_resolve_exactly() {
        let mut grid = Grid::empty();
        grid[at(2, 2)] = Cell {
            owner: Some(Seat::Two),
            troops: Troops::from_halves(5),
            moved: Troops::ZERO,
        };
        grid[at(2, 3)] = Cell {
            owner: Some(Seat::One),
            troops: Troops::whole(2),
            moved: Troops::ZERO,
        };
        resolve_move(&mut grid, Seat::Two, at(2, 2), at(2, 3), Troops::from_halves(5)).unwrap();
        assert_eq!(grid[at(2, 3)].owner, Some(Seat::Two));
        assert_eq!(grid[at(2, 3)].moved, Troops::HALF);
    }
}
