//! Computer opponents.
//!
//! The scripted policy plays a whole turn from a single decision. It is
//! deterministic, so a given position always produces the same turn.

pub mod scripted;

pub use scripted::{decide, AiDecision};
