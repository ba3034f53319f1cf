//! Text command parser.
//!
//! Parses lines from the front end into `Command` variants that the main
//! loop dispatches on. Malformed arguments for known commands produce
//! `None` after a warning; the loop simply skips them.

use crate::board::{Coord, Input, Troops};

/// A parsed front-end command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Protocol handshake; the engine replies with its id and options.
    Gwi,

    /// Synchronization ping; the engine must reply `readyok`.
    IsReady,

    /// Set an option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a new game with the current options.
    NewGame,

    /// A player input: `select`, `action`, `amount`, `end` or `cancel`.
    Play(Input),

    /// Let the scripted policy play the current seat's turn.
    Go,

    /// Print the board.
    State,

    /// Print the state as a JSON snapshot.
    Snapshot,

    /// Terminate the process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines, unknown commands and malformed
/// arguments.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&head, args) = tokens.split_first()?;

    match head {
        "gwi" => Some(Command::Gwi),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "go" => Some(Command::Go),
        "state" => Some(Command::State),
        "snapshot" => Some(Command::Snapshot),
        "end" => Some(Command::Play(Input::EndTurn)),
        "cancel" => Some(Command::Play(Input::Cancel)),

        "setoption" => parse_setoption(args),
        "select" => parse_select(args),
        "action" => parse_action(args),
        "amount" => parse_amount(args),

        other => {
            tracing::warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    if args.len() < 2 || args[0] != "name" {
        tracing::warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let rest = &args[1..];
    let (name_parts, value_parts) = match rest.iter().position(|&t| t == "value") {
        Some(vi) => (&rest[..vi], &rest[vi + 1..]),
        None => (rest, &rest[rest.len()..]),
    };
    if name_parts.is_empty() {
        tracing::warn!("malformed setoption: empty name");
        return None;
    }

    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
    Some(Command::SetOption {
        name: name_parts.join(" "),
        value,
    })
}

/// Parses `select <row> <col>`.
fn parse_select(args: &[&str]) -> Option<Command> {
    let coord = match args {
        [row, col] => row
            .parse()
            .ok()
            .zip(col.parse().ok())
            .and_then(|(r, c)| Coord::new(r, c)),
        _ => None,
    };
    if coord.is_none() {
        tracing::warn!(?args, "malformed select: expected 'select <row> <col>' on the board");
    }
    coord.map(|at| Command::Play(Input::Select(at)))
}

/// Parses `action <move|place|farm|end_turn|cancel>`.
fn parse_action(args: &[&str]) -> Option<Command> {
    let input = args.first().and_then(|name| Input::from_action_name(name));
    if input.is_none() {
        tracing::warn!(?args, "malformed action: expected move, place, farm, end_turn or cancel");
    }
    input.map(Command::Play)
}

/// Parses `amount <n>`, where `n` is a multiple of 0.5.
fn parse_amount(args: &[&str]) -> Option<Command> {
    match args.first().map(|s| s.parse::<Troops>()) {
        Some(Ok(amount)) => Some(Command::Play(Input::Amount(amount))),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "malformed amount");
            None
        }
        None => {
            tracing::warn!("malformed amount: expected 'amount <n>'");
            None
        }
    }
}
