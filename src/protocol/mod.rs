//! Text protocol and wire formats.
//!
//! The command parser for the interactive main loop, and the JSON snapshot
//! format shared by online peers and self-play records.

pub mod parser;
pub mod snapshot;

pub use parser::{parse_command, Command};
pub use snapshot::{CellSnapshot, PlayersSnapshot, Snapshot, SnapshotError, SNAPSHOT_LOG_LEN};
