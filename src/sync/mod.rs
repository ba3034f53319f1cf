//! Remote state synchronization.
//!
//! Online play shares one snapshot per room. Each peer pushes the full
//! snapshot after finishing a turn and receives every write to the room,
//! its own echoes included. The store keeps only the latest write and
//! makes no ordering promises; the engine filters what it applies.

pub mod memory;

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use rand::Rng;

use crate::board::Seat;

pub use memory::{MemoryChannel, RoomInfo, RoomStatus};

/// Lowest room code.
pub const ROOM_CODE_MIN: u16 = 1000;
/// Highest room code.
pub const ROOM_CODE_MAX: u16 = 9999;

/// Errors from the remote channel or lobby.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("room {0} does not exist")]
    UnknownRoom(RoomCode),

    #[error("room {0} is already in play")]
    RoomInPlay(RoomCode),

    #[error("room code collision, try again")]
    RoomCollision,

    #[error("room code must be four digits, got '{0}'")]
    InvalidRoomCode(String),

    #[error("channel lock poisoned")]
    LockPoisoned,
}

/// A four-digit room code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(u16);

impl RoomCode {
    pub fn new(code: u16) -> Option<RoomCode> {
        (ROOM_CODE_MIN..=ROOM_CODE_MAX)
            .contains(&code)
            .then_some(RoomCode(code))
    }

    /// Draws a code uniformly from the four-digit range.
    pub fn random(rng: &mut impl Rng) -> RoomCode {
        RoomCode(rng.gen_range(ROOM_CODE_MIN..=ROOM_CODE_MAX))
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomCode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 4 {
            return Err(SyncError::InvalidRoomCode(s.to_string()));
        }
        s.parse::<u16>()
            .ok()
            .and_then(RoomCode::new)
            .ok_or_else(|| SyncError::InvalidRoomCode(s.to_string()))
    }
}

/// A shared store of serialized snapshots, one per room.
pub trait RemoteChannel: Send + Sync {
    /// Replaces the room's snapshot and notifies every subscriber.
    fn push_state(&self, room: RoomCode, payload: String) -> Result<(), SyncError>;

    /// Subscribes to every future write to `room`. The current snapshot, if
    /// any, is delivered first.
    fn subscribe(&self, room: RoomCode) -> Result<Receiver<String>, SyncError>;
}

/// An engine's connection to an online room.
pub struct OnlineSession {
    pub channel: Arc<dyn RemoteChannel>,
    pub room: RoomCode,
    /// The seat this peer plays.
    pub seat: Seat,
    inbox: Receiver<String>,
}

impl OnlineSession {
    /// Subscribes to `room` and binds the session to `seat`.
    pub fn connect(
        channel: Arc<dyn RemoteChannel>,
        room: RoomCode,
        seat: Seat,
    ) -> Result<OnlineSession, SyncError> {
        let inbox = channel.subscribe(room)?;
        Ok(OnlineSession {
            channel,
            room,
            seat,
            inbox,
        })
    }

    /// Writes a snapshot payload to the room.
    pub fn push(&self, payload: String) -> Result<(), SyncError> {
        self.channel.push_state(self.room, payload)
    }

    /// Drains every payload received since the last call.
    pub fn drain(&self) -> Vec<String> {
        self.inbox.try_iter().collect()
    }
}

impl fmt::Debug for OnlineSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnlineSession")
            .field("room", &self.room)
            .field("seat", &self.seat)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn room_codes_are_four_digits() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..200 {
            let code = RoomCode::random(&mut rng);
            assert_eq!(code.to_string().len(), 4);
        }
        assert_eq!(RoomCode::new(999), None);
        assert_eq!(RoomCode::new(10000), None);
    }

    #[test]
    fn room_codes_parse() {
        assert_eq!("4821".parse::<RoomCode>(), Ok(RoomCode(4821)));
        assert!(matches!(
            "482".parse::<RoomCode>(),
            Err(SyncError::InvalidRoomCode(_))
        ));
        assert!(matches!(
            "0999".parse::<RoomCode>(),
            Err(SyncError::InvalidRoomCode(_))
        ));
        assert!("48a1".parse::<RoomCode>().is_err());
    }
}
