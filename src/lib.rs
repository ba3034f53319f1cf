//! Grid War engine library.
//!
//! Exposes the board representation, rule resolution, move generation, the
//! turn state machine, and the protocol and sync layers for use by
//! integration tests and the binary entry points.

pub mod ai;
pub mod board;
pub mod config;
pub mod engine;
pub mod movegen;
pub mod protocol;
pub mod render;
pub mod resolve;
pub mod selfplay;
pub mod sync;
