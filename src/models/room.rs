use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player as seen by other clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Uuid,
    pub username: String,
}

/// Public view of a room, sent on join and from the rooms API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub players: Vec<PlayerInfo>,
    pub created_at: DateTime<Utc>,
}

impl RoomSnapshot {
    pub fn is_full(&self) -> bool {
        self.players.len() >= crate::rooms::ROOM_CAPACITY
    }
}
