//! Player inputs.
//!
//! The full vocabulary the turn state machine accepts from a front end.
//! Inputs arrive already parsed but are re-validated by the engine against
//! the current phase.

use super::grid::Coord;
use super::state::ActionKind;
use super::troops::Troops;

/// A single discrete input to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    /// Choose the turn action: `move`, `place`, or `farm`.
    Action(ActionKind),

    /// Select a cell during a move or place sub-phase.
    Select(Coord),

    /// Confirm an amount for the open amount selection.
    Amount(Troops),

    /// End the current turn.
    EndTurn,

    /// Back out of the current selection.
    Cancel,
}

impl Input {
    /// Parses a named action as delivered by a front end.
    ///
    /// Accepts `move`, `place`, `farm`, `end_turn`, and `cancel`.
    pub fn from_action_name(name: &str) -> Option<Input> {
        match name {
            "end_turn" => Some(Input::EndTurn),
            "cancel" => Some(Input::Cancel),
            other => ActionKind::from_name(other).map(Input::Action),
        }
    }
}
