//! Placing reserves and farming.
//!
//! Placed troops go onto the unmoved stack, so they can still move in the
//! same turn. Farming spends the whole turn to advance the farm counter.

use crate::board::{ActionKind, Coord, GameState, Seat, Troops};

use super::counter::{check_counter, CounterBonus};
use super::economy::{calculate_farm_bonus, next_farm_group, FarmGroup};

/// Reasons a placement can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("{0} is outside your deployment column")]
    OutsideDeployment(Coord),

    #[error("{0} is held by the enemy")]
    EnemyHeld(Coord),

    #[error("cannot place {requested}: only {available} in reserve")]
    InsufficientReserves { requested: Troops, available: Troops },
}

/// True if `seat` may deploy onto `at`.
pub fn is_deployable(state: &GameState, seat: Seat, at: Coord) -> bool {
    at.col == seat.deployment_column() && state.grid[at].is_open_to(seat)
}

/// Moves `amount` troops from `seat`'s reserves onto `at`.
pub fn place_troops(
    state: &mut GameState,
    seat: Seat,
    at: Coord,
    amount: Troops,
) -> Result<(), PlaceError> {
    if at.col != seat.deployment_column() {
        return Err(PlaceError::OutsideDeployment(at));
    }
    if !state.grid[at].is_open_to(seat) {
        return Err(PlaceError::EnemyHeld(at));
    }
    let available = state.player(seat).reserves;
    if amount.is_zero() || amount > available {
        return Err(PlaceError::InsufficientReserves {
            requested: amount,
            available,
        });
    }

    state.player_mut(seat).reserves -= amount;
    let cell = &mut state.grid[at];
    cell.owner = Some(seat);
    cell.troops += amount;
    tracing::debug!(?seat, %at, %amount, "troops placed");
    Ok(())
}

/// Result of a farm action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmReport {
    pub farm_count: u32,
    /// Income bonus per turn after this farm.
    pub bonus: u32,
    pub group: FarmGroup,
    pub counter: Option<CounterBonus>,
}

impl std::fmt::Display for FarmReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "farm (bonus +{}/turn, progress {}/{})",
            self.bonus, self.group.progress, self.group.group_size
        )
    }
}

/// Runs the counter check for a farm and advances `seat`'s farm counter.
pub fn farm(state: &mut GameState, seat: Seat) -> FarmReport {
    let counter = check_counter(state, seat, ActionKind::Farm);
    let player = state.player_mut(seat);
    player.farm_count += 1;
    let farm_count = player.farm_count;
    FarmReport {
        farm_count,
        bonus: calculate_farm_bonus(state.mode, farm_count),
        group: next_farm_group(state.mode, farm_count),
        counter,
    }
}
