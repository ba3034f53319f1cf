//! The competitive-mode counter mechanic.
//!
//! Picking a different action type than the opponent just played is a
//! counter. Each counter raises the player's counter tally and pays a
//! reserve bonus of half a troop per counter earned so far.

use crate::board::{ActionKind, GameState, Seat, Troops};

/// A counter that paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterBonus {
    pub action: ActionKind,
    pub countered: ActionKind,
    /// The acting player's counter tally after this counter.
    pub count: u32,
    pub bonus: Troops,
}

impl std::fmt::Display for CounterBonus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "counter! {} beats {}: +{} reserves ({} counters)",
            self.action.name(),
            self.countered.name(),
            self.bonus,
            self.count
        )
    }
}

/// Runs the counter check for `seat` choosing `action`, then records
/// `action` as the seat's last action.
///
/// Only competitive mode compares actions; classic mode just records.
pub fn check_counter(state: &mut GameState, seat: Seat, action: ActionKind) -> Option<CounterBonus> {
    let opponent_last = state.player(seat.opponent()).last_action;
    let counters = state.mode.counters_enabled();
    let player = state.player_mut(seat);

    let result = match opponent_last {
        Some(countered) if counters && countered != action => {
            player.counter_count += 1;
            let bonus = Troops::from_halves(player.counter_count);
            player.reserves += bonus;
            Some(CounterBonus {
                action,
                countered,
                count: player.counter_count,
                bonus,
            })
        }
        _ => None,
    };

    player.last_action = Some(action);
    result
}
