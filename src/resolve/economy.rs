//! Income and the farm economy.
//!
//! Farming advances a counter; the counter is consumed in groups of
//! growing size, and every fully consumed group adds one troop of income
//! per turn. The bonus and the in-progress group are derived from one
//! shared consumption walk so they can never disagree.

use crate::board::{GameMode, GameState, Seat, Troops, MIDDLE_COL};

/// Base income every turn.
pub const BASE_INCOME: Troops = Troops::ONE;

/// Income per owned cell in the middle column.
pub const MIDDLE_CELL_INCOME: Troops = Troops::HALF;

/// Size of the farm group at `index` for the given mode.
///
/// Classic: 1, 2, 3, 4, 4, 4, ... Competitive: 2, 3, 4, 5, 6, ...
pub fn farm_group_size(mode: GameMode, index: u32) -> u32 {
    match mode {
        GameMode::Classic => (index + 1).min(4),
        GameMode::Competitive => index + 2,
    }
}

/// The farm group currently being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmGroup {
    pub group_size: u32,
    /// Farms already counted toward this group; always below `group_size`.
    pub progress: u32,
}

/// Walks the group sequence, returning the number of completed groups and
/// the group still in progress.
fn consume_farm_groups(mode: GameMode, farm_count: u32) -> (u32, FarmGroup) {
    let mut consumed = 0;
    let mut index = 0;
    loop {
        let group_size = farm_group_size(mode, index);
        if consumed + group_size > farm_count {
            return (
                index,
                FarmGroup {
                    group_size,
                    progress: farm_count - consumed,
                },
            );
        }
        consumed += group_size;
        index += 1;
    }
}

/// Per-turn income bonus earned from `farm_count` farms.
pub fn calculate_farm_bonus(mode: GameMode, farm_count: u32) -> u32 {
    consume_farm_groups(mode, farm_count).0
}

/// The in-progress farm group for `farm_count` farms.
pub fn next_farm_group(mode: GameMode, farm_count: u32) -> FarmGroup {
    consume_farm_groups(mode, farm_count).1
}

/// Components of one turn's income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeBreakdown {
    pub base: Troops,
    pub middle: Troops,
    pub farm: Troops,
}

impl IncomeBreakdown {
    pub fn total(&self) -> Troops {
        self.base + self.middle + self.farm
    }
}

impl std::fmt::Display for IncomeBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "base +{}", self.base)?;
        if !self.middle.is_zero() {
            write!(f, " territory +{}", self.middle)?;
        }
        if !self.farm.is_zero() {
            write!(f, " farm +{}", self.farm)?;
        }
        write!(f, " = +{}", self.total())
    }
}

/// Computes `seat`'s income without crediting it.
pub fn income_breakdown(state: &GameState, seat: Seat) -> IncomeBreakdown {
    let middle_cells = state.grid.owned_in_column(seat, MIDDLE_COL) as u32;
    let farm = calculate_farm_bonus(state.mode, state.player(seat).farm_count);
    IncomeBreakdown {
        base: BASE_INCOME,
        middle: Troops::from_halves(MIDDLE_CELL_INCOME.halves() * middle_cells),
        farm: Troops::whole(farm),
    }
}

/// Credits `seat`'s income to its reserves and returns the breakdown.
pub fn credit_income(state: &mut GameState, seat: Seat) -> IncomeBreakdown {
    let income = income_breakdown(state, seat);
    state.player_mut(seat).reserves += income.total();
    income
}
