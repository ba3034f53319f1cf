//! Presentation seams.
//!
//! The engine never draws anything itself. After every mutation it hands
//! the full state to a `RenderSink`, and prompts or rejection reasons go to
//! the same sink as plain text. Sinks must tolerate repeated renders of an
//! unchanged state.

use std::io::Write;

use crate::board::{Coord, GameState, Phase, Seat, ALL_SEATS, COLS, ROWS};
use crate::resolve::{calculate_farm_bonus, income_breakdown, next_farm_group};

/// Receives state updates and human-readable messages from the engine.
pub trait RenderSink {
    fn render(&mut self, state: &GameState);
    fn message(&mut self, text: &str);
}

/// Discards everything. Used for headless play.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _state: &GameState) {}
    fn message(&mut self, _text: &str) {}
}

/// Keeps every message and counts renders.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub renders: usize,
    pub messages: Vec<String>,
}

impl RecordingSink {
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, _state: &GameState) {
        self.renders += 1;
    }

    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}

/// Formats one cell as `owner:troops`, with `+moved` when some troops are
/// locked, or `.` when unclaimed.
fn format_cell(state: &GameState, at: Coord) -> String {
    let cell = &state.grid[at];
    match cell.owner {
        None => ".".to_string(),
        Some(owner) if cell.moved.is_zero() => format!("{}:{}", owner.number(), cell.troops),
        Some(owner) => format!("{}:{}+{}", owner.number(), cell.troops, cell.moved),
    }
}

/// Marker shown next to a cell: `*` selected, `>` target.
fn cell_marker(state: &GameState, at: Coord) -> char {
    if state.selected == Some(at) {
        '*'
    } else if state.target == Some(at) {
        '>'
    } else {
        ' '
    }
}

fn format_player(state: &GameState, seat: Seat) -> String {
    let player = state.player(seat);
    let group = next_farm_group(state.mode, player.farm_count);
    let mut line = format!(
        "player {} hp {} reserves {} income +{} farms {} (+{}/turn, {}/{})",
        seat.number(),
        player.hp,
        player.reserves,
        income_breakdown(state, seat).total(),
        player.farm_count,
        calculate_farm_bonus(state.mode, player.farm_count),
        group.progress,
        group.group_size,
    );
    if state.mode.counters_enabled() {
        line.push_str(&format!(" counters {}", player.counter_count));
    }
    line
}

/// Renders the whole state as a fixed-width text block.
pub fn format_board(state: &GameState) -> String {
    let mut out = format!(
        "turn {} mode {} player {} phase {}\n",
        state.turn,
        state.mode.name(),
        state.current.number(),
        state.phase.name()
    );

    out.push_str("   ");
    for col in 0..COLS {
        out.push_str(&format!(" {:<8}", col));
    }
    out.push('\n');
    for row in 0..ROWS {
        out.push_str(&format!("{:<3}", row));
        for col in 0..COLS {
            let at = Coord { row, col };
            out.push(cell_marker(state, at));
            out.push_str(&format!("{:<8}", format_cell(state, at)));
        }
        out.push('\n');
    }

    for seat in ALL_SEATS {
        out.push_str(&format_player(state, seat));
        out.push('\n');
    }

    if let Phase::AwaitingAmount(req) = state.phase {
        out.push_str(&format!("amount {} ~ {}\n", req.min, req.max));
    }
    if let Some(winner) = state.winner.filter(|_| state.game_over) {
        out.push_str(&format!("winner {}\n", winner.number()));
    }
    out
}

/// Writes the board and messages as text, one block per render.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// The underlying writer, for replies that bypass rendering.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "render output failed");
        }
    }
}

impl<W: Write> RenderSink for TextRenderer<W> {
    fn render(&mut self, state: &GameState) {
        let board = format_board(state);
        self.emit(&board);
    }

    fn message(&mut self, text: &str) {
        self.emit(&format!("message {}\n", text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, GameMode, Troops};

    fn fresh() -> GameState {
        GameState::new(
            GameMode::Competitive,
            [Troops::whole(6), Troops::whole(7)],
            Troops::whole(50),
        )
    }

    #[test]
    fn board_shows_cells_and_players() {
        let mut state = fresh();
        state.grid[Coord::new(0, 0).unwrap()] = Cell {
            owner: Some(Seat::One),
            troops: Troops::whole(3),
            moved: Troops::ZERO,
        };
        state.grid[Coord::new(1, 3).unwrap()] = Cell {
            owner: Some(Seat::Two),
            troops: Troops::ONE,
            moved: Troops::from_halves(3),
        };
        state.selected = Coord::new(0, 0);
        let text = format_board(&state);

        assert!(text.starts_with("turn 1 mode competitive player 1 phase action\n"));
        assert!(text.contains("*1:3"));
        assert!(text.contains("2:1+1.5"));
        assert!(text.contains("player 2 hp 50 reserves 7"));
        assert!(text.contains("counters 0"));
        assert_eq!(text.lines().count(), 1 + 1 + ROWS + 2);
    }

    #[test]
    fn text_renderer_prefixes_messages() {
        let mut sink = TextRenderer::new(Vec::new());
        sink.message("choose an action");
        sink.render(&fresh());
        let text = String::from_utf8(sink.get_ref().clone()).unwrap();
        assert!(text.starts_with("message choose an action\n"));
        assert!(text.contains("phase action"));
    }

    #[test]
    fn recording_sink_counts() {
        let mut sink = RecordingSink::default();
        sink.render(&fresh());
        sink.render(&fresh());
        sink.message("hi");
        assert_eq!(sink.renders, 2);
        assert_eq!(sink.last_message(), Some("hi"));
    }
}
