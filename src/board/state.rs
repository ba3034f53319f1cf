//! Game state representation.
//!
//! Holds the complete snapshot of a game at a given point in time: the
//! grid, both players' economies, whose turn it is, and where the turn
//! state machine currently sits.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::cell::Seat;
use super::grid::{Coord, Grid};
use super::troops::Troops;

/// Rule set selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
    Competitive,
}

impl GameMode {
    pub const fn name(self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Competitive => "competitive",
        }
    }

    pub fn from_name(s: &str) -> Option<GameMode> {
        match s {
            "classic" => Some(GameMode::Classic),
            "competitive" => Some(GameMode::Competitive),
            _ => None,
        }
    }

    /// Whether choosing a different action type than the opponent pays out.
    pub const fn counters_enabled(self) -> bool {
        matches!(self, GameMode::Competitive)
    }
}

/// The three turn actions a player can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Place,
    Farm,
}

impl ActionKind {
    pub const fn name(self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Place => "place",
            ActionKind::Farm => "farm",
        }
    }

    pub fn from_name(s: &str) -> Option<ActionKind> {
        match s {
            "move" => Some(ActionKind::Move),
            "place" => Some(ActionKind::Place),
            "farm" => Some(ActionKind::Farm),
            _ => None,
        }
    }
}

/// Per-seat economy and health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Undeployed troop pool.
    pub reserves: Troops,
    pub farm_count: u32,
    pub hp: Troops,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<ActionKind>,
    pub counter_count: u32,
}

impl PlayerState {
    pub fn new(reserves: Troops, hp: Troops) -> Self {
        PlayerState {
            reserves,
            farm_count: 0,
            hp,
            last_action: None,
            counter_count: 0,
        }
    }
}

/// What an amount selection will do once confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingIntent {
    Move { from: Coord, to: Coord },
    Place { at: Coord },
}

/// An open amount selection bounded by `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmountRequest {
    pub min: Troops,
    pub max: Troops,
    pub intent: PendingIntent,
}

impl AmountRequest {
    /// Clamps a confirmed amount into the request's bounds.
    pub fn clamp(&self, amount: Troops) -> Troops {
        amount.clamp(self.min, self.max)
    }
}

/// Where the turn state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Choosing move, place, or farm.
    Action,
    MoveSource,
    MoveTarget,
    PlaceTarget,
    AwaitingAmount(AmountRequest),
    GameOver,
}

impl Phase {
    pub const fn name(&self) -> &'static str {
        match self {
            Phase::Action => "action",
            Phase::MoveSource => "move_source",
            Phase::MoveTarget => "move_target",
            Phase::PlaceTarget => "place_target",
            Phase::AwaitingAmount(_) => "awaiting_amount",
            Phase::GameOver => "game_over",
        }
    }
}

/// Complete game state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub grid: Grid,
    /// Indexed by `Seat::index`.
    pub players: [PlayerState; 2],
    pub current: Seat,
    /// Round counter, incremented whenever play wraps back to seat one.
    pub turn: u32,
    pub phase: Phase,
    /// The action chosen for the current turn, if it has sub-steps.
    pub turn_action: Option<ActionKind>,
    pub selected: Option<Coord>,
    pub target: Option<Coord>,
    /// True until seat one begins its second turn.
    pub is_first_turn: bool,
    pub game_over: bool,
    pub winner: Option<Seat>,
    pub mode: GameMode,
    /// Most recent log lines, oldest first.
    pub log: VecDeque<String>,
}

impl GameState {
    /// Creates the opening position: empty grid, seat one to act.
    pub fn new(mode: GameMode, reserves: [Troops; 2], hp: Troops) -> Self {
        GameState {
            grid: Grid::empty(),
            players: [
                PlayerState::new(reserves[0], hp),
                PlayerState::new(reserves[1], hp),
            ],
            current: Seat::One,
            turn: 1,
            phase: Phase::Action,
            turn_action: None,
            selected: None,
            target: None,
            is_first_turn: true,
            game_over: false,
            winner: None,
            mode,
            log: VecDeque::new(),
        }
    }

    pub fn player(&self, seat: Seat) -> &PlayerState {
        &self.players[seat.index()]
    }

    pub fn player_mut(&mut self, seat: Seat) -> &mut PlayerState {
        &mut self.players[seat.index()]
    }

    /// Appends a turn-stamped log line, dropping the oldest beyond `limit`.
    pub fn push_log(&mut self, message: &str, limit: usize) {
        self.log.push_back(format!("[Turn {}] {}", self.turn, message));
        while self.log.len() > limit {
            self.log.pop_front();
        }
    }

    /// Clears any in-progress selection and returns to action choice.
    pub fn reset_selection(&mut self) {
        self.turn_action = None;
        self.selected = None;
        self.target = None;
    }

    /// Marks the game finished with `winner`.
    pub fn finish(&mut self, winner: Seat) {
        self.game_over = true;
        self.winner = Some(winner);
        self.phase = Phase::GameOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> GameState {
        GameState::new(
            GameMode::Classic,
            [Troops::whole(6), Troops::whole(6)],
            Troops::whole(50),
        )
    }

    #[test]
    fn new_state_is_opening_position() {
        let state = fresh();
        assert_eq!(state.current, Seat::One);
        assert_eq!(state.turn, 1);
        assert_eq!(state.phase, Phase::Action);
        assert!(state.is_first_turn);
        assert!(!state.game_over);
        assert_eq!(state.winner, None);
        assert_eq!(state.player(Seat::Two).hp, Troops::whole(50));
        assert_eq!(state.grid.find_inconsistency(), None);
    }

    #[test]
    fn log_is_bounded() {
        let mut state = fresh();
        for i in 0..5 {
            state.push_log(&format!("entry {}", i), 3);
        }
        assert_eq!(state.log.len(), 3);
        assert_eq!(state.log.front().map(String::as_str), Some("[Turn 1] entry 2"));
    }

    #[test]
    fn amount_request_clamps() {
        let req = AmountRequest {
            min: Troops::ONE,
            max: Troops::whole(4),
            intent: PendingIntent::Place {
                at: Coord::new(0, 0).unwrap(),
            },
        };
        assert_eq!(req.clamp(Troops::ZERO), Troops::ONE);
        assert_eq!(req.clamp(Troops::whole(9)), Troops::whole(4));
        assert_eq!(req.clamp(Troops::whole(2)), Troops::whole(2));
    }

    #[test]
    fn names_roundtrip() {
        for mode in [GameMode::Classic, GameMode::Competitive] {
            assert_eq!(GameMode::from_name(mode.name()), Some(mode));
        }
        for kind in [ActionKind::Move, ActionKind::Place, ActionKind::Farm] {
            assert_eq!(ActionKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ActionKind::from_name("attack"), None);
    }

    #[test]
    fn finish_sets_terminal_phase() {
        let mut state = fresh();
        state.finish(Seat::Two);
        assert!(state.game_over);
        assert_eq!(state.winner, Some(Seat::Two));
        assert_eq!(state.phase, Phase::GameOver);
    }
}
