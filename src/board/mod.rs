//! Board representation and game-state types.
//!
//! Contains the core data structures for troop amounts, cells, the grid,
//! player inputs, and the overall game state.

pub mod cell;
pub mod grid;
pub mod input;
pub mod state;
pub mod troops;

pub use cell::{Cell, Seat, ALL_SEATS};
pub use grid::{is_adjacent, Coord, Grid, CELL_COUNT, COLS, MIDDLE_COL, ROWS};
pub use input::Input;
pub use state::{
    ActionKind, AmountRequest, GameMode, GameState, Phase, PendingIntent, PlayerState,
};
pub use troops::{Precision, Troops, TroopsError};
