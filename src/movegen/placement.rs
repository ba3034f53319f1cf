//! Placement generation.
//!
//! Enumerates the deployment cells open to a seat and how much of its
//! reserve it may place at the configured precision.

use crate::board::{Coord, GameState, Precision, Seat, Troops, ROWS};

/// Deployment-column cells owned by `seat` or unclaimed, top to bottom.
pub fn deployable_cells(state: &GameState, seat: Seat) -> Vec<Coord> {
    let col = seat.deployment_column();
    (0..ROWS)
        .map(|row| Coord { row, col })
        .filter(|&at| state.grid[at].is_open_to(seat))
        .collect()
}

/// Largest amount `seat` may place, rounded down to the precision step.
pub fn placeable_reserves(state: &GameState, seat: Seat, precision: Precision) -> Troops {
    state.player(seat).reserves.floor_to(precision)
}

/// True if `seat` has at least one step of reserves and somewhere to put it.
pub fn can_place(state: &GameState, seat: Seat, precision: Precision) -> bool {
    placeable_reserves(state, seat, precision) >= precision.step()
        && !deployable_cells(state, seat).is_empty()
}
