use crate::{
    game::{ChessGame, PlayedMove},
    models::{ChessMove, Color, MoveLogEntry, PlayerInfo, PromotionPiece},
    rooms::{normalize_room_id, ROOM_CAPACITY},
    websocket::messages::ClientMessage,
};

/// Client-side state of one game: the board, the move log and the
/// game-over message. Every rules question goes to `ChessGame`.
#[derive(Debug, Clone)]
pub struct GameView {
    game: ChessGame,
    room: String,
    orientation: Color,
    username: String,
    players: Vec<PlayerInfo>,
    /// Empty while the game is running
    over: String,
    log: Vec<MoveLogEntry>,
}

impl GameView {
    pub fn new(
        room: impl Into<String>,
        orientation: Color,
        username: impl Into<String>,
        players: Vec<PlayerInfo>,
    ) -> Self {
        Self {
            game: ChessGame::new(),
            room: room.into(),
            orientation,
            username: username.into(),
            players,
            over: String::new(),
            log: Vec::new(),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn orientation(&self) -> Color {
        self.orientation
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn fen(&self) -> String {
        self.game.fen()
    }

    pub fn game(&self) -> &ChessGame {
        &self.game
    }

    /// The game-over message, if the game has ended
    pub fn over(&self) -> Option<&str> {
        (!self.over.is_empty()).then_some(self.over.as_str())
    }

    pub fn log(&self) -> &[MoveLogEntry] {
        &self.log
    }

    /// Numbered move log lines, e.g. `1. White: e2 e4`
    pub fn log_lines(&self) -> Vec<String> {
        self.log
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {}", i + 1, entry))
            .collect()
    }

    /// The opponent sits in the other seat: the creator plays white and
    /// takes the first seat.
    pub fn opponent_name(&self) -> Option<&str> {
        let seat = match self.orientation {
            Color::White => 1,
            Color::Black => 0,
        };
        self.players.get(seat).map(|p| p.username.as_str())
    }

    pub fn is_my_turn(&self) -> bool {
        self.game.turn() == self.orientation
    }

    fn make_a_move(&mut self, mv: &ChessMove) -> Option<PlayedMove> {
        let played = self.game.try_move(mv)?;
        if let Some(outcome) = self.game.outcome() {
            self.over = outcome.to_string();
        }
        Some(played)
    }

    /// A piece was dropped on the board. Returns the message to send to the
    /// relay, or `None` when the move is refused.
    pub fn on_drop(&mut self, from: &str, to: &str) -> Option<ClientMessage> {
        if self.over().is_some() {
            return None;
        }
        if !self.is_my_turn() {
            return None;
        }
        if self.players.len() < ROOM_CAPACITY {
            return None;
        }

        let request =
            ChessMove::new(self.game.turn(), from, to).with_promotion(PromotionPiece::Queen);
        let played = self.make_a_move(&request)?.to_chess_move();
        self.log.push(MoveLogEntry::from(&played));

        Some(ClientMessage::Move {
            room: self.room.clone(),
            mv: played,
        })
    }

    /// Apply a move received from the opponent. Returns false if the rules
    /// rejected it.
    pub fn on_remote_move(&mut self, mv: &ChessMove) -> bool {
        match self.make_a_move(mv) {
            Some(_) => {
                self.log.push(MoveLogEntry::from(mv));
                true
            }
            None => {
                tracing::warn!(
                    "Ignoring move {}{} from opponent in room {}",
                    mv.from,
                    mv.to,
                    self.room
                );
                false
            }
        }
    }

    pub fn on_opponent_joined(&mut self, players: Vec<PlayerInfo>) {
        self.players = players;
    }

    pub fn on_player_disconnected(&mut self, player: &PlayerInfo) {
        self.over = format!("{} has disconnected", player.username);
    }

    /// True when the close notice concerns this game
    pub fn on_close_room(&self, room_id: &str) -> bool {
        normalize_room_id(room_id) == normalize_room_id(&self.room)
    }

    /// Dismissing the game-over dialog closes the room for both players
    pub fn continue_after_over(&self) -> ClientMessage {
        ClientMessage::CloseRoom {
            room_id: self.room.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(name: &str) -> PlayerInfo {
        PlayerInfo {
            id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn white_view() -> GameView {
        GameView::new(
            "ABC234",
            Color::White,
            "alice",
            vec![player("alice"), player("bob")],
        )
    }

    #[test]
    fn test_drop_refused_while_waiting_for_opponent() {
        let mut view = GameView::new("ABC234", Color::White, "alice", vec![]);
        assert!(view.on_drop("e2", "e4").is_none());
        assert!(view.log().is_empty());
        assert_eq!(view.opponent_name(), None);
    }

    #[test]
    fn test_drop_refused_out_of_turn() {
        let mut view = GameView::new(
            "ABC234",
            Color::Black,
            "bob",
            vec![player("alice"), player("bob")],
        );
        assert!(view.on_drop("e7", "e5").is_none());
    }

    #[test]
    fn test_drop_emits_move_and_logs_it() {
        let mut view = white_view();
        let msg = view.on_drop("e2", "e4").unwrap();

        match msg {
            ClientMessage::Move { room, mv } => {
                assert_eq!(room, "ABC234");
                assert_eq!(mv.from, "e2");
                assert_eq!(mv.to, "e4");
                assert_eq!(mv.color, Color::White);
                assert_eq!(mv.san.as_deref(), Some("e4"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(view.log_lines(), vec!["1. White: e2 e4"]);
        assert!(!view.is_my_turn());
    }

    #[test]
    fn test_illegal_drop_is_refused() {
        let mut view = white_view();
        assert!(view.on_drop("e2", "e5").is_none());
        assert!(view.log().is_empty());
        assert!(view.is_my_turn());
    }

    #[test]
    fn test_remote_move_applied() {
        let mut view = white_view();
        view.on_drop("e2", "e4").unwrap();

        assert!(view.on_remote_move(&ChessMove::new(Color::Black, "e7", "e5")));
        assert_eq!(view.log_lines()[1], "2. Black: e7 e5");
        assert!(view.is_my_turn());

        // Not the opponent's turn any more
        assert!(!view.on_remote_move(&ChessMove::new(Color::Black, "d7", "d5")));
        assert_eq!(view.log().len(), 2);
    }

    #[test]
    fn test_checkmate_sets_over_message() {
        let mut view = GameView::new(
            "ABC234",
            Color::Black,
            "bob",
            vec![player("alice"), player("bob")],
        );
        assert!(view.on_remote_move(&ChessMove::new(Color::White, "f2", "f3")));
        view.on_drop("e7", "e5").unwrap();
        assert!(view.on_remote_move(&ChessMove::new(Color::White, "g2", "g4")));
        assert!(view.over().is_none());
        view.on_drop("d8", "h4").unwrap();

        assert_eq!(view.over(), Some("Checkmate! black wins!"));
        assert!(view.on_drop("a7", "a6").is_none());
    }

    #[test]
    fn test_disconnect_sets_over_message() {
        let mut view = white_view();
        view.on_player_disconnected(&player("bob"));
        assert_eq!(view.over(), Some("bob has disconnected"));
    }

    #[test]
    fn test_drop_refused_after_opponent_disconnects() {
        let mut view = white_view();
        view.on_player_disconnected(&player("bob"));
        assert!(view.on_drop("e2", "e4").is_none());
        assert!(view.log().is_empty());
        assert_eq!(
            view.fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn test_opponent_by_seat() {
        let view = white_view();
        assert_eq!(view.opponent_name(), Some("bob"));

        let view = GameView::new(
            "ABC234",
            Color::Black,
            "bob",
            vec![player("alice"), player("bob")],
        );
        assert_eq!(view.opponent_name(), Some("alice"));
    }

    #[test]
    fn test_opponent_joined_enables_moves() {
        let mut view = GameView::new("ABC234", Color::White, "alice", vec![]);
        view.on_opponent_joined(vec![player("alice"), player("bob")]);
        assert!(view.on_drop("d2", "d4").is_some());
    }

    #[test]
    fn test_close_room_matching() {
        let view = white_view();
        assert!(view.on_close_room("abc234"));
        assert!(!view.on_close_room("XYZ999"));
        assert_eq!(
            view.continue_after_over(),
            ClientMessage::CloseRoom {
                room_id: "ABC234".to_string()
            }
        );
    }
}
