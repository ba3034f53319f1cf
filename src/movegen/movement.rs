//! Move generation.
//!
//! Enumerates the cells a seat can move from and the cells each source
//! can reach this turn.

use crate::board::{Coord, Grid, Seat};

/// Cells owned by `seat` that still hold unmoved troops, in row-major order.
pub fn movable_sources(grid: &Grid, seat: Seat) -> Vec<Coord> {
    grid.iter()
        .filter(|(_, c)| c.is_owned_by(seat) && !c.troops.is_zero())
        .map(|(at, _)| at)
        .collect()
}

/// Every adjacent cell is a legal destination; combat decides the rest.
pub fn move_targets(from: Coord) -> Vec<Coord> {
    from.neighbors().collect()
}

/// All `(source, destination)` pairs available to `seat`.
pub fn legal_moves(grid: &Grid, seat: Seat) -> Vec<(Coord, Coord)> {
    movable_sources(grid, seat)
        .into_iter()
        .flat_map(|from| move_targets(from).into_iter().map(move |to| (from, to)))
        .collect()
}
