use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    models::{PlayerInfo, RoomSnapshot},
    websocket::messages::ServerMessage,
};

/// Two players per game
pub const ROOM_CAPACITY: usize = 2;
/// Allowed characters for room codes - excludes I, O, 0, 1 for readability
pub const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of generated room codes
pub const ROOM_CODE_LENGTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room does not exist")]
    NotFound,

    #[error("room is full")]
    Full,

    #[error("already in room")]
    AlreadyJoined,

    #[error("not a member of room {0}")]
    NotMember(String),
}

/// Connection state for a room player
#[derive(Debug, Clone)]
pub enum PlayerConnectionState {
    /// Player has an open WebSocket
    Connected,
    /// Player's WebSocket closed. The player stays listed so the opponent
    /// can still see who left; there is no reconnection.
    Disconnected { since: Instant },
}

/// A player seated in a room
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub info: PlayerInfo,
    pub tx: mpsc::Sender<ServerMessage>,
    pub connection_state: PlayerConnectionState,
}

impl RoomPlayer {
    pub fn new(id: Uuid, username: impl Into<String>, tx: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            info: PlayerInfo {
                id,
                username: username.into(),
            },
            tx,
            connection_state: PlayerConnectionState::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection_state, PlayerConnectionState::Connected)
    }
}

/// A game room pairing two players
#[derive(Debug)]
pub struct Room {
    pub room_id: String,
    /// Seat order: the creator first
    pub players: Vec<RoomPlayer>,
    pub created_at: DateTime<Utc>,
    /// When the last connected player left (for cleanup grace period)
    pub empty_since: Option<Instant>,
}

impl Room {
    fn new(room_id: String, creator: RoomPlayer) -> Self {
        Self {
            room_id,
            players: vec![creator],
            created_at: Utc::now(),
            empty_since: None,
        }
    }

    pub fn connected_player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected()).count()
    }

    pub fn has_player(&self, player_id: Uuid) -> bool {
        self.players.iter().any(|p| p.info.id == player_id)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            players: self.players.iter().map(|p| p.info.clone()).collect(),
            created_at: self.created_at,
        }
    }
}

/// All live rooms keyed by room code
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Open a room with `creator` in the first seat and return its code
    pub fn create_room(&self, creator: RoomPlayer) -> String {
        loop {
            let code = generate_room_code();
            if let Entry::Vacant(slot) = self.rooms.entry(code.clone()) {
                slot.insert(Room::new(code.clone(), creator));
                return code;
            }
        }
    }

    pub fn join_room(&self, room_id: &str, player: RoomPlayer) -> Result<RoomSnapshot, RoomError> {
        let room_id = normalize_room_id(room_id);
        let mut room = self.rooms.get_mut(&room_id).ok_or(RoomError::NotFound)?;

        if room.has_player(player.info.id) {
            return Err(RoomError::AlreadyJoined);
        }
        // Abandoned rooms only wait for the sweep
        if room.connected_player_count() == 0 {
            return Err(RoomError::NotFound);
        }
        if room.players.len() >= ROOM_CAPACITY {
            return Err(RoomError::Full);
        }

        room.players.push(player);
        room.empty_since = None;
        Ok(room.snapshot())
    }

    pub fn snapshot(&self, room_id: &str) -> Option<RoomSnapshot> {
        self.rooms
            .get(&normalize_room_id(room_id))
            .map(|room| room.snapshot())
    }

    pub fn list(&self) -> Vec<RoomSnapshot> {
        let mut rooms: Vec<RoomSnapshot> = self.rooms.iter().map(|r| r.snapshot()).collect();
        rooms.sort_by_key(|r| r.created_at);
        rooms
    }

    pub fn is_member(&self, room_id: &str, player_id: Uuid) -> bool {
        self.rooms
            .get(&normalize_room_id(room_id))
            .is_some_and(|room| room.has_player(player_id))
    }

    /// Outbound channels of connected members, optionally skipping one player.
    /// Collected up front so no map guard is held while sending.
    pub fn recipients(&self, room_id: &str, except: Option<Uuid>) -> Vec<mpsc::Sender<ServerMessage>> {
        self.rooms
            .get(&normalize_room_id(room_id))
            .map(|room| {
                room.players
                    .iter()
                    .filter(|p| p.is_connected() && Some(p.info.id) != except)
                    .map(|p| p.tx.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Update the display name of a player in every room they sit in
    pub fn rename_player(&self, player_id: Uuid, username: &str) {
        for mut room in self.rooms.iter_mut() {
            for player in room.players.iter_mut().filter(|p| p.info.id == player_id) {
                player.info.username = username.to_string();
            }
        }
    }

    /// Mark the player disconnected everywhere. Returns the affected room ids
    /// together with the player's public info.
    pub fn disconnect(&self, player_id: Uuid) -> Vec<(String, PlayerInfo)> {
        let now = Instant::now();
        let mut affected = Vec::new();

        for mut room in self.rooms.iter_mut() {
            let Some(player) = room.players.iter_mut().find(|p| p.info.id == player_id) else {
                continue;
            };
            player.connection_state = PlayerConnectionState::Disconnected { since: now };
            let info = player.info.clone();

            if room.connected_player_count() == 0 {
                room.empty_since = Some(now);
            }
            affected.push((room.room_id.clone(), info));
        }

        affected
    }

    pub fn close_room(&self, room_id: &str) -> Option<Room> {
        self.rooms
            .remove(&normalize_room_id(room_id))
            .map(|(_, room)| room)
    }

    /// Drop rooms that have had no connected player for longer than `grace`
    pub fn remove_expired(&self, now: Instant, grace: Duration) -> Vec<String> {
        let mut removed = Vec::new();
        self.rooms.retain(|room_id, room| {
            let expired = room
                .empty_since
                .is_some_and(|since| now.duration_since(since) > grace);
            if expired {
                removed.push(room_id.clone());
            }
            !expired
        });
        removed
    }
}

/// Room codes are matched case-insensitively
pub fn normalize_room_id(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Generate a short, readable room code (6 alphanumeric characters)
fn generate_room_code() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ROOM_CODE_CHARSET.len());
            ROOM_CODE_CHARSET[idx] as char
        })
        .collect()
}
