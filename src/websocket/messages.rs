use serde::{Deserialize, Serialize};

use crate::models::{ChessMove, PlayerInfo};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Username {
        username: String,
    },
    CreateRoom,
    JoinRoom {
        room_id: String,
    },
    Move {
        room: String,
        #[serde(rename = "move")]
        mv: ChessMove,
    },
    CloseRoom {
        room_id: String,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        room_id: String,
    },
    RoomJoined {
        room_id: String,
        players: Vec<PlayerInfo>,
    },
    JoinError {
        message: String,
    },
    OpponentJoined {
        room_id: String,
        players: Vec<PlayerInfo>,
    },
    Move {
        #[serde(rename = "move")]
        mv: ChessMove,
    },
    PlayerDisconnected {
        player: PlayerInfo,
    },
    CloseRoom {
        room_id: String,
    },
    Error {
        message: String,
    },
}
