//! In-process remote channel.
//!
//! Rooms live in a mutex-guarded map. A push overwrites the room's latest
//! payload and fans it out to every live subscriber; subscribers whose
//! receiver was dropped are pruned on the next push.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

use rand::Rng;

use super::{RemoteChannel, RoomCode, SyncError};

/// Attempts at drawing an unused room code before giving up.
const CREATE_ATTEMPTS: usize = 16;

/// Lobby status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// The host is waiting for a guest.
    Waiting,
    Playing,
}

/// Lobby metadata for a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub host: String,
    pub guest: Option<String>,
}

struct Room {
    info: RoomInfo,
    latest: Option<String>,
    subscribers: Vec<Sender<String>>,
}

/// Latest-write-wins snapshot store shared by peers in one process.
#[derive(Default)]
pub struct MemoryChannel {
    rooms: Mutex<HashMap<RoomCode, Room>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn rooms(&self) -> Result<MutexGuard<'_, HashMap<RoomCode, Room>>, SyncError> {
        self.rooms.lock().map_err(|_| SyncError::LockPoisoned)
    }

    /// Opens a room hosted by `host`, who plays seat one.
    pub fn create_room(&self, host: &str, rng: &mut impl Rng) -> Result<RoomCode, SyncError> {
        let mut rooms = self.rooms()?;
        for _ in 0..CREATE_ATTEMPTS {
            let code = RoomCode::random(rng);
            if rooms.contains_key(&code) {
                continue;
            }
            rooms.insert(
                code,
                Room {
                    info: RoomInfo {
                        code,
                        status: RoomStatus::Waiting,
                        host: host.to_string(),
                        guest: None,
                    },
                    latest: None,
                    subscribers: Vec::new(),
                },
            );
            tracing::info!(%code, host, "room created");
            return Ok(code);
        }
        Err(SyncError::RoomCollision)
    }

    /// Joins a waiting room as seat two.
    pub fn join_room(&self, code: RoomCode, guest: &str) -> Result<RoomInfo, SyncError> {
        let mut rooms = self.rooms()?;
        let room = rooms.get_mut(&code).ok_or(SyncError::UnknownRoom(code))?;
        if room.info.status != RoomStatus::Waiting {
            return Err(SyncError::RoomInPlay(code));
        }
        room.info.status = RoomStatus::Playing;
        room.info.guest = Some(guest.to_string());
        tracing::info!(%code, guest, "room joined");
        Ok(room.info.clone())
    }

    pub fn room_info(&self, code: RoomCode) -> Result<RoomInfo, SyncError> {
        let rooms = self.rooms()?;
        rooms
            .get(&code)
            .map(|room| room.info.clone())
            .ok_or(SyncError::UnknownRoom(code))
    }

    /// Removes a room. Subscribers see their channel close.
    pub fn close_room(&self, code: RoomCode) -> Result<(), SyncError> {
        let mut rooms = self.rooms()?;
        rooms
            .remove(&code)
            .map(|_| ())
            .ok_or(SyncError::UnknownRoom(code))
    }

    /// The room's most recent payload.
    pub fn latest(&self, code: RoomCode) -> Result<Option<String>, SyncError> {
        let rooms = self.rooms()?;
        let room = rooms.get(&code).ok_or(SyncError::UnknownRoom(code))?;
        Ok(room.latest.clone())
    }
}

impl RemoteChannel for MemoryChannel {
    fn push_state(&self, room: RoomCode, payload: String) -> Result<(), SyncError> {
        let mut rooms = self.rooms()?;
        let entry = rooms.get_mut(&room).ok_or(SyncError::UnknownRoom(room))?;
        entry
            .subscribers
            .retain(|tx| tx.send(payload.clone()).is_ok());
        tracing::debug!(%room, subscribers = entry.subscribers.len(), "state pushed");
        entry.latest = Some(payload);
        Ok(())
    }

    fn subscribe(&self, room: RoomCode) -> Result<Receiver<String>, SyncError> {
        let mut rooms = self.rooms()?;
        let entry = rooms.get_mut(&room).ok_or(SyncError::UnknownRoom(room))?;
        let (tx, rx) = mpsc::channel();
        if let Some(latest) = &entry.latest {
            // The receiver is still in scope, so this cannot fail.
            let _ = tx.send(latest.clone());
        }
        entry.subscribers.push(tx);
        Ok(rx)
    }
}
