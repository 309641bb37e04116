use crate::{
    client::GameView,
    models::Color,
    websocket::messages::{ClientMessage, ServerMessage},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingRequest {
    Create,
    Join,
}

/// What a server reply meant for the lobby
#[derive(Debug)]
pub enum LobbyEvent {
    /// A room was created or joined; the game starts
    Entered(GameView),
    /// Joining failed, with the message to show the user
    JoinFailed(String),
    /// Not a lobby reply
    Ignored,
}

/// Pre-game state: starting a game or joining one by room id
#[derive(Debug, Clone)]
pub struct Lobby {
    username: String,
    pending: Option<PendingRequest>,
    room_error: Option<String>,
}

impl Lobby {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            pending: None,
            room_error: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) -> ClientMessage {
        self.username = username.into();
        ClientMessage::Username {
            username: self.username.clone(),
        }
    }

    /// "Start a game"
    pub fn create_room(&mut self) -> ClientMessage {
        self.pending = Some(PendingRequest::Create);
        ClientMessage::CreateRoom
    }

    /// "Join a game". Blank input sends nothing.
    pub fn join_room(&mut self, input: &str) -> Option<ClientMessage> {
        let room_id = input.trim();
        if room_id.is_empty() {
            return None;
        }
        self.pending = Some(PendingRequest::Join);
        Some(ClientMessage::JoinRoom {
            room_id: room_id.to_string(),
        })
    }

    /// The helper text shown under the room id field after a failed join
    pub fn room_error(&self) -> Option<String> {
        self.room_error
            .as_ref()
            .map(|message| format!("Invalid room ID: {}", message))
    }

    pub fn apply(&mut self, msg: &ServerMessage) -> LobbyEvent {
        match (msg, self.pending) {
            (ServerMessage::RoomCreated { room_id }, Some(PendingRequest::Create)) => {
                self.reset();
                LobbyEvent::Entered(GameView::new(
                    room_id.clone(),
                    Color::White,
                    self.username.clone(),
                    Vec::new(),
                ))
            }
            (ServerMessage::RoomJoined { room_id, players }, Some(PendingRequest::Join)) => {
                self.reset();
                LobbyEvent::Entered(GameView::new(
                    room_id.clone(),
                    Color::Black,
                    self.username.clone(),
                    players.clone(),
                ))
            }
            (ServerMessage::JoinError { message }, Some(PendingRequest::Join)) => {
                self.pending = None;
                self.room_error = Some(message.clone());
                LobbyEvent::JoinFailed(self.room_error().unwrap_or_default())
            }
            _ => LobbyEvent::Ignored,
        }
    }

    fn reset(&mut self) {
        self.pending = None;
        self.room_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerInfo;
    use uuid::Uuid;

    #[test]
    fn test_creator_plays_white() {
        let mut lobby = Lobby::new("alice");
        assert_eq!(lobby.create_room(), ClientMessage::CreateRoom);

        let event = lobby.apply(&ServerMessage::RoomCreated {
            room_id: "ABC234".to_string(),
        });
        match event {
            LobbyEvent::Entered(view) => {
                assert_eq!(view.room(), "ABC234");
                assert_eq!(view.orientation(), Color::White);
                assert!(view.players().is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_joiner_plays_black() {
        let mut lobby = Lobby::new("bob");
        lobby.join_room(" abc234 ").unwrap();

        let players = vec![
            PlayerInfo {
                id: Uuid::new_v4(),
                username: "alice".to_string(),
            },
            PlayerInfo {
                id: Uuid::new_v4(),
                username: "bob".to_string(),
            },
        ];
        let event = lobby.apply(&ServerMessage::RoomJoined {
            room_id: "ABC234".to_string(),
            players,
        });
        match event {
            LobbyEvent::Entered(view) => {
                assert_eq!(view.orientation(), Color::Black);
                assert_eq!(view.opponent_name(), Some("alice"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_blank_room_id_sends_nothing() {
        let mut lobby = Lobby::new("bob");
        assert!(lobby.join_room("   ").is_none());
    }

    #[test]
    fn test_join_error_is_shown() {
        let mut lobby = Lobby::new("bob");
        lobby.join_room("NOPE42").unwrap();

        let event = lobby.apply(&ServerMessage::JoinError {
            message: "room does not exist".to_string(),
        });
        assert!(
            matches!(event, LobbyEvent::JoinFailed(ref text) if text == "Invalid room ID: room does not exist")
        );
        assert_eq!(
            lobby.room_error().as_deref(),
            Some("Invalid room ID: room does not exist")
        );
    }

    #[test]
    fn test_unrequested_reply_ignored() {
        let mut lobby = Lobby::new("alice");
        let event = lobby.apply(&ServerMessage::RoomCreated {
            room_id: "ABC234".to_string(),
        });
        assert!(matches!(event, LobbyEvent::Ignored));
    }
}
