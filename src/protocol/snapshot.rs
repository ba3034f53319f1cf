//! Transport-safe game snapshots.
//!
//! A snapshot is the JSON document two online peers exchange after every
//! turn. It never contains nulls: an unowned cell has owner `0`, "no
//! winner" is `0`, and an absent last action is omitted. Selection and
//! phase are not carried; loading a snapshot always lands in the action
//! phase (or game over).
//!
//! Example:
//!
//! ```text
//! {"grid":[[{"owner":1,"troops":3,"movedTroops":0}, ...], ...],
//!  "players":{"1":{"reserves":3,"farmCount":0,"hp":50,"counterCount":0},
//!             "2":{...}},
//!  "currentPlayer":2,"turn":1,"isFirstTurn":true,"gameOver":false,
//!  "winner":0,"gameMode":"classic","log":["[Turn 1] ..."]}
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::{
    Cell, Coord, GameMode, GameState, Grid, Phase, PlayerState, Seat, Troops, COLS, ROWS,
};

/// Log entries carried in a snapshot.
pub const SNAPSHOT_LOG_LEN: usize = 20;

/// Errors from decoding or validating a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid owner {owner} at {at}")]
    InvalidOwner { at: Coord, owner: u8 },

    #[error("cell {0} breaks the owner/troops invariant")]
    InconsistentCell(Coord),

    #[error("invalid current player {0}")]
    InvalidCurrentPlayer(u8),

    #[error("invalid winner {0}")]
    InvalidWinner(u8),

    #[error("troop total at {0} is out of range")]
    TroopsOverflow(Coord),

    #[error("game over flag {game_over} disagrees with winner {winner}")]
    WinnerMismatch { game_over: bool, winner: u8 },

    #[error("turn must be at least 1")]
    InvalidTurn,
}

/// A cell on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    pub owner: u8,
    pub troops: Troops,
    pub moved_troops: Troops,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            owner: cell.owner.map_or(0, Seat::number),
            troops: cell.troops,
            moved_troops: cell.moved,
        }
    }
}

/// Both players, keyed by seat number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersSnapshot {
    #[serde(rename = "1")]
    pub one: PlayerState,
    #[serde(rename = "2")]
    pub two: PlayerState,
}

/// The full serialized game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub grid: [[CellSnapshot; COLS]; ROWS],
    pub players: PlayersSnapshot,
    pub current_player: u8,
    pub turn: u32,
    pub is_first_turn: bool,
    pub game_over: bool,
    /// `0` when there is no winner.
    pub winner: u8,
    pub game_mode: GameMode,
    #[serde(default)]
    pub log: Vec<String>,
}

impl Snapshot {
    /// Captures `state`, keeping only the most recent log entries.
    pub fn from_state(state: &GameState) -> Self {
        let rows = state.grid.rows();
        let grid = std::array::from_fn(|r| std::array::from_fn(|c| CellSnapshot::from(&rows[r][c])));
        let skip = state.log.len().saturating_sub(SNAPSHOT_LOG_LEN);

        Snapshot {
            grid,
            players: PlayersSnapshot {
                one: state.player(Seat::One).clone(),
                two: state.player(Seat::Two).clone(),
            },
            current_player: state.current.number(),
            turn: state.turn,
            is_first_turn: state.is_first_turn,
            game_over: state.game_over,
            winner: state.winner.map_or(0, Seat::number),
            game_mode: state.mode,
            log: state.log.iter().skip(skip).cloned().collect(),
        }
    }

    /// Checks every field that the type system cannot.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for (r, row) in self.grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let at = Coord { row: r, col: c };
                if cell.owner > 2 {
                    return Err(SnapshotError::InvalidOwner {
                        at,
                        owner: cell.owner,
                    });
                }
                let total = cell
                    .troops
                    .checked_add(cell.moved_troops)
                    .filter(|t| *t <= Troops::MAX)
                    .ok_or(SnapshotError::TroopsOverflow(at))?;
                let empty = total.is_zero();
                if (cell.owner == 0) != empty {
                    return Err(SnapshotError::InconsistentCell(at));
                }
            }
        }
        if Seat::from_number(self.current_player).is_none() {
            return Err(SnapshotError::InvalidCurrentPlayer(self.current_player));
        }
        if self.winner != 0 && Seat::from_number(self.winner).is_none() {
            return Err(SnapshotError::InvalidWinner(self.winner));
        }
        if self.game_over != (self.winner != 0) {
            return Err(SnapshotError::WinnerMismatch {
                game_over: self.game_over,
                winner: self.winner,
            });
        }
        if self.turn == 0 {
            return Err(SnapshotError::InvalidTurn);
        }
        Ok(())
    }

    /// Rebuilds a game state. Selection is cleared and the phase is the
    /// action phase unless the game is over.
    pub fn to_state(&self) -> Result<GameState, SnapshotError> {
        self.validate()?;

        let mut grid = Grid::empty();
        for (r, row) in self.grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                grid[Coord { row: r, col: c }] = Cell {
                    owner: Seat::from_number(cell.owner),
                    troops: cell.troops,
                    moved: cell.moved_troops,
                };
            }
        }

        let current = Seat::from_number(self.current_player)
            .ok_or(SnapshotError::InvalidCurrentPlayer(self.current_player))?;
        let winner = Seat::from_number(self.winner);

        Ok(GameState {
            grid,
            players: [self.players.one.clone(), self.players.two.clone()],
            current,
            turn: self.turn,
            phase: if self.game_over {
                Phase::GameOver
            } else {
                Phase::Action
            },
            turn_action: None,
            selected: None,
            target: None,
            is_first_turn: self.is_first_turn,
            game_over: self.game_over,
            winner,
            mode: self.game_mode,
            log: self.log.iter().cloned().collect::<VecDeque<_>>(),
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes and validates a snapshot.
    pub fn from_json(s: &str) -> Result<Snapshot, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(s)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
