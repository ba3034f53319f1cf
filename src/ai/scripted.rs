//! The scripted opponent.
//!
//! A fixed, greedy priority list with no lookahead:
//!
//! 1. Advance the unmoved stack closest to the enemy one column forward.
//! 2. Otherwise deploy all whole reserves on the best deployment row.
//! 3. Otherwise farm.
//!
//! Every decision ends the turn.

use crate::board::{Coord, GameState, Precision, Seat, Troops, COLS, ROWS};
use crate::movegen::deployable_cells;

/// One full AI turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiDecision {
    /// Move the whole unmoved stack at `from` one column forward.
    Advance { from: Coord, to: Coord, amount: Troops },
    /// Place `amount` reserves at `at`.
    Deploy { at: Coord, amount: Troops },
    Farm,
}

/// Columns that have a forward neighbour, nearest to the enemy first.
fn advance_columns(seat: Seat) -> Vec<usize> {
    match seat {
        Seat::One => (0..COLS - 1).rev().collect(),
        Seat::Two => (1..COLS).collect(),
    }
}

/// Finds the first stack to push forward.
fn find_advance(state: &GameState, seat: Seat) -> Option<AiDecision> {
    for col in advance_columns(seat) {
        for row in 0..ROWS {
            let from = Coord { row, col };
            let cell = &state.grid[from];
            if !cell.is_owned_by(seat) || cell.troops.is_zero() {
                continue;
            }
            let to = from.offset_col(seat.forward())?;
            return Some(AiDecision::Advance {
                from,
                to,
                amount: cell.troops,
            });
        }
    }
    None
}

/// Scores a deployment row; higher is better.
fn deploy_score(state: &GameState, seat: Seat, at: Coord) -> u32 {
    let mut score = 1;
    if let Some(ahead) = at.offset_col(seat.forward()) {
        match state.grid[ahead].owner {
            Some(owner) if owner != seat => score += 3,
            None => score += 2,
            Some(_) => {}
        }
    }
    if state.grid[at].owner.is_none() {
        score += 1;
    }
    score
}

/// Picks the best deployment row, keeping the first on ties.
fn find_deploy(state: &GameState, seat: Seat) -> Option<AiDecision> {
    let amount = state.player(seat).reserves.floor_to(Precision::Whole);
    if amount.is_zero() {
        return None;
    }

    let mut best: Option<(Coord, u32)> = None;
    for at in deployable_cells(state, seat) {
        let score = deploy_score(state, seat, at);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((at, score));
        }
    }
    best.map(|(at, _)| AiDecision::Deploy { at, amount })
}

/// Decides `seat`'s whole turn.
pub fn decide(state: &GameState, seat: Seat) -> AiDecision {
    find_advance(state, seat)
        .or_else(|| find_deploy(state, seat))
        .unwrap_or(AiDecision::Farm)
}
