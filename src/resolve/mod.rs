//! Rule resolution.
//!
//! Pure state transitions for every rule in the game: moves and combat,
//! placement and farming, the counter mechanic, the farm economy, and
//! turn sequencing. Phase validation lives in the engine; these functions
//! only check the rule preconditions they need to keep the grid sound.

pub mod combat;
pub mod counter;
pub mod deploy;
pub mod economy;
pub mod turn;

pub use combat::{resolve_move, validate_move, CombatOutcome, MoveError};
pub use counter::{check_counter, CounterBonus};
pub use deploy::{farm, is_deployable, place_troops, FarmReport, PlaceError};
pub use economy::{
    calculate_farm_bonus, credit_income, farm_group_size, income_breakdown, next_farm_group,
    FarmGroup, IncomeBreakdown,
};
pub use turn::{apply_damage, next_turn, DamageReport, TurnStart};
