//! Turn sequencing.
//!
//! Hands play to the other seat and runs the start-of-turn effects in
//! order: moved-troop reset, deployment-column damage, then income. Both
//! seats skip damage and income on their first turn of the game.

use crate::board::{Coord, GameState, Phase, Seat, Troops, ROWS};
use crate::config::DamagePolicy;

use super::economy::{credit_income, IncomeBreakdown};

/// Damage taken by a seat at the start of its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageReport {
    pub seat: Seat,
    pub damage: Troops,
    pub remaining_hp: Troops,
    pub defeated: bool,
}

/// Applies damage from enemy troops standing in `seat`'s deployment column.
///
/// Hit points clamp at zero. Under `DamagePolicy::Kamikaze` the attacking
/// troops are removed after dealing damage. If `seat` is reduced to zero the
/// game ends with the opponent as winner.
pub fn apply_damage(state: &mut GameState, seat: Seat, policy: DamagePolicy) -> DamageReport {
    let opponent = seat.opponent();
    let col = seat.deployment_column();
    let mut damage = Troops::ZERO;

    for row in 0..ROWS {
        let at = Coord { row, col };
        let cell = &mut state.grid[at];
        if cell.is_owned_by(opponent) {
            damage += cell.total();
            if policy == DamagePolicy::Kamikaze {
                cell.clear();
            }
        }
    }

    let player = state.player_mut(seat);
    player.hp = player.hp.saturating_sub(damage);
    let remaining_hp = player.hp;
    let defeated = remaining_hp.is_zero();
    if defeated {
        state.finish(opponent);
    }

    DamageReport {
        seat,
        damage,
        remaining_hp,
        defeated,
    }
}

/// Start-of-turn effects produced by `next_turn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnStart {
    pub seat: Seat,
    pub turn: u32,
    /// `None` on the seat's first turn.
    pub damage: Option<DamageReport>,
    /// `None` on the seat's first turn or when the seat was defeated.
    pub income: Option<IncomeBreakdown>,
}

/// Ends the current turn and starts the opponent's.
pub fn next_turn(state: &mut GameState, policy: DamagePolicy) -> TurnStart {
    let seat = state.current.opponent();
    state.current = seat;
    if seat == Seat::One {
        state.turn += 1;
    }
    state.reset_selection();
    state.grid.reset_moved_troops(seat);

    // Seat two's opening turn still falls inside the first round.
    let first_turn = state.is_first_turn && seat == Seat::Two;
    if state.is_first_turn && seat == Seat::One {
        state.is_first_turn = false;
    }

    if first_turn {
        state.phase = Phase::Action;
        return TurnStart {
            seat,
            turn: state.turn,
            damage: None,
            income: None,
        };
    }

    let damage = apply_damage(state, seat, policy);
    if damage.defeated {
        return TurnStart {
            seat,
            turn: state.turn,
            damage: Some(damage),
            income: None,
        };
    }

    let income = credit_income(state, seat);
    state.phase = Phase::Action;
    TurnStart {
        seat,
        turn: state.turn,
        damage: Some(damage),
        income: Some(income),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, GameMode};

    fn at(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn fresh() -> GameState {
        GameState::new(
            GameMode::Classic,
            [Troops::whole(6), Troops::whole(6)],
            Troops::whole(50),
        )
    }

    fn enemy(seat: Seat, troops: u32, moved: u32) -> Cell {
        Cell {
            owner: Some(seat),
            troops: Troops::whole(troops),
            moved: Troops::whole(moved),
        }
    }

    #[test]
    fn damage_sums_enemy_troops_and_kamikazes() {
        let mut state = fresh();
        state.grid[at(0, 0)] = enemy(Seat::Two, 2, 1);
        state.grid[at(2, 0)] = enemy(Seat::Two, 0, 2);
        state.grid[at(1, 0)] = enemy(Seat::One, 4, 0);

        let report = apply_damage(&mut state, Seat::One, DamagePolicy::Kamikaze);
        assert_eq!(report.damage, Troops::whole(5));
        assert_eq!(report.remaining_hp, Troops::whole(45));
        assert!(!report.defeated);
        assert_eq!(state.grid[at(0, 0)], Cell::EMPTY);
        assert_eq!(state.grid[at(2, 0)], Cell::EMPTY);
        assert_eq!(state.grid[at(1, 0)], enemy(Seat::One, 4, 0));
    }

    #[test]
    fn persist_policy_leaves_attackers() {
        let mut state = fresh();
        state.grid[at(1, 4)] = enemy(Seat::One, 3, 0);
        let report = apply_damage(&mut state, Seat::Two, DamagePolicy::Persist);
        assert_eq!(report.damage, Troops::whole(3));
        assert_eq!(state.grid[at(1, 4)], enemy(Seat::One, 3, 0));
    }

    #[test]
    fn lethal_damage_clamps_and_ends_game() {
        let mut state = fresh();
        state.player_mut(Seat::One).hp = Troops::whole(3);
        state.grid[at(0, 0)] = enemy(Seat::Two, 5, 0);

        let report = apply_damage(&mut state, Seat::One, DamagePolicy::Kamikaze);
        assert!(report.defeated);
        assert_eq!(state.player(Seat::One).hp, Troops::ZERO);
        assert!(state.game_over);
        assert_eq!(state.winner, Some(Seat::Two));
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn first_round_skips_income_for_both_seats() {
        let mut state = fresh();
        let start = next_turn(&mut state, DamagePolicy::Kamikaze);
        assert_eq!(start.seat, Seat::Two);
        assert_eq!(start.turn, 1);
        assert_eq!(start.income, None);
        assert_eq!(state.player(Seat::Two).reserves, Troops::whole(6));

        let start = next_turn(&mut state, DamagePolicy::Kamikaze);
        assert_eq!(start.seat, Seat::One);
        assert_eq!(start.turn, 2);
        assert!(!state.is_first_turn);
        assert_eq!(start.income.map(|i| i.total()), Some(Troops::ONE));
        assert_eq!(state.player(Seat::One).reserves, Troops::whole(7));

        let start = next_turn(&mut state, DamagePolicy::Kamikaze);
        assert_eq!(start.seat, Seat::Two);
        assert_eq!(start.turn, 2);
        assert_eq!(state.player(Seat::Two).reserves, Troops::whole(7));
    }

    #[test]
    fn next_turn_resets_new_seats_moved_troops_first() {
        let mut state = fresh();
        state.is_first_turn = false;
        state.grid[at(1, 3)] = enemy(Seat::Two, 1, 2);
        state.grid[at(1, 1)] = enemy(Seat::One, 0, 2);

        next_turn(&mut state, DamagePolicy::Kamikaze);
        assert_eq!(state.current, Seat::Two);
        assert_eq!(state.grid[at(1, 3)], enemy(Seat::Two, 3, 0));
        assert_eq!(state.grid[at(1, 1)], enemy(Seat::One, 0, 2));
        assert_eq!(state.phase, Phase::Action);
    }

    #[test]
    fn defeat_skips_income() {
        let mut state = fresh();
        state.is_first_turn = false;
        state.player_mut(Seat::Two).hp = Troops::ONE;
        state.grid[at(0, 4)] = enemy(Seat::One, 2, 0);

        let start = next_turn(&mut state, DamagePolicy::Kamikaze);
        assert!(start.damage.unwrap().defeated);
        assert_eq!(start.income, None);
        assert_eq!(state.player(Seat::Two).reserves, Troops::whole(6));
        assert_eq!(state.winner, Some(Seat::One));
    }
}
