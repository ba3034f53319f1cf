//! Legal action generation.
//!
//! Generates the actions available to a seat in the current state and a
//! seeded random policy built on top of them. The random policy emits the
//! same inputs a front end would, so the engine re-validates every step.

pub mod movement;
pub mod placement;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{ActionKind, GameState, Input, Precision, Seat, Troops};

pub use movement::{legal_moves, movable_sources, move_targets};
pub use placement::{can_place, deployable_cells, placeable_reserves};

/// Action kinds `seat` may choose right now. Farming is always available.
pub fn legal_actions(state: &GameState, seat: Seat, precision: Precision) -> Vec<ActionKind> {
    let mut actions = Vec::with_capacity(3);
    if state.grid.has_movable(seat) {
        actions.push(ActionKind::Move);
    }
    if can_place(state, seat, precision) {
        actions.push(ActionKind::Place);
    }
    actions.push(ActionKind::Farm);
    actions
}

/// Picks a random amount in `[step, max]` that is a multiple of `step`.
fn random_amount(max: Troops, precision: Precision, rng: &mut impl Rng) -> Troops {
    let step = precision.step().halves();
    let steps = (max.floor_to(precision).halves() / step).max(1);
    Troops::from_halves(rng.gen_range(1..=steps) * step)
}

/// Generates one random but legal turn for `seat` as a sequence of inputs.
///
/// Move and place turns perform a single step and then end the turn; farm
/// ends the turn on its own.
pub fn random_turn(
    state: &GameState,
    seat: Seat,
    precision: Precision,
    rng: &mut impl Rng,
) -> Vec<Input> {
    let actions = legal_actions(state, seat, precision);
    let action = actions.choose(rng).copied().unwrap_or(ActionKind::Farm);

    match action {
        ActionKind::Move => {
            let moves = legal_moves(&state.grid, seat);
            match moves.choose(rng) {
                Some(&(from, to)) => {
                    let amount = random_amount(state.grid[from].troops, precision, rng);
                    vec![
                        Input::Action(ActionKind::Move),
                        Input::Select(from),
                        Input::Select(to),
                        Input::Amount(amount),
                        Input::EndTurn,
                    ]
                }
                None => vec![Input::Action(ActionKind::Farm)],
            }
        }
        ActionKind::Place => {
            let cells = deployable_cells(state, seat);
            match cells.choose(rng) {
                Some(&at) => {
                    let amount =
                        random_amount(placeable_reserves(state, seat, precision), precision, rng);
                    vec![
                        Input::Action(ActionKind::Place),
                        Input::Select(at),
                        Input::Amount(amount),
                        Input::EndTurn,
                    ]
                }
                None => vec![Input::Action(ActionKind::Farm)],
            }
        }
        ActionKind::Farm => vec![Input::Action(ActionKind::Farm)],
    }
}
