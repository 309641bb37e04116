//! Game state on top of shakmaty.
//!
//! shakmaty owns legality, check detection and FEN handling. `ChessGame`
//! adds the bits a two-player session needs on top: the move history,
//! repetition counting and the game-over decision.

use std::collections::HashMap;

use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, EnPassantMode, Position, Rank, Role,
    Square,
};
use thiserror::Error;

use super::Outcome;
use crate::models::{ChessMove, Color, PromotionPiece};

/// Halfmove clock value at which the fifty-move rule ends the game
const FIFTY_MOVE_HALFMOVES: u32 = 100;

#[derive(Debug, Error)]
pub enum ChessError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("it is {0}'s turn")]
    NotYourTurn(Color),

    #[error("game is already over")]
    GameOver,
}

/// A move that was accepted and applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub color: Color,
    pub from: String,
    pub to: String,
    pub promotion: Option<PromotionPiece>,
    /// SAN including the `+` / `#` suffix
    pub san: String,
    /// Position after the move
    pub fen: String,
}

impl PlayedMove {
    /// The form sent to the opponent through the relay
    pub fn to_chess_move(&self) -> ChessMove {
        ChessMove {
            color: self.color,
            from: self.from.clone(),
            to: self.to.clone(),
            promotion: self.promotion,
            san: Some(self.san.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChessGame {
    position: Chess,
    /// Occurrences of each position, keyed by the first four FEN fields
    seen: HashMap<String, u32>,
    history: Vec<PlayedMove>,
}

impl ChessGame {
    pub fn new() -> Self {
        Self::with_position(Chess::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| ChessError::InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| ChessError::InvalidFen(format!("{e}")))?;
        Ok(Self::with_position(position))
    }

    fn with_position(position: Chess) -> Self {
        let mut game = Self {
            position,
            seen: HashMap::new(),
            history: Vec::new(),
        };
        game.record_position();
        game
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.position.turn().into()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    /// Validate `mv` against the current position and play it.
    ///
    /// A requested promotion is only used when a pawn reaches the last rank;
    /// a pawn reaching it without one becomes a queen.
    pub fn make_move(&mut self, mv: &ChessMove) -> Result<PlayedMove, ChessError> {
        if self.is_game_over() {
            return Err(ChessError::GameOver);
        }

        let turn = self.turn();
        if mv.color != turn {
            return Err(ChessError::NotYourTurn(turn));
        }

        let from = parse_square(&mv.from)?;
        let to = parse_square(&mv.to)?;
        let promotion = self.promotion_for(from, to, mv.promotion);

        let uci = UciMove::Normal {
            from,
            to,
            promotion: promotion.map(PromotionPiece::role),
        };
        let legal = uci
            .to_move(&self.position)
            .map_err(|_| ChessError::IllegalMove(format!("{}{}", mv.from, mv.to)))?;

        let san = San::from_move(&self.position, legal.clone()).to_string();
        self.position.play_unchecked(legal);
        self.record_position();

        let suffix = if self.position.is_checkmate() {
            "#"
        } else if self.position.is_check() {
            "+"
        } else {
            ""
        };

        let played = PlayedMove {
            color: turn,
            from: from.to_string(),
            to: to.to_string(),
            promotion,
            san: format!("{san}{suffix}"),
            fen: self.fen(),
        };
        self.history.push(played.clone());

        Ok(played)
    }

    /// Like `make_move`, but returns `None` for anything the rules reject
    pub fn try_move(&mut self, mv: &ChessMove) -> Option<PlayedMove> {
        match self.make_move(mv) {
            Ok(played) => Some(played),
            Err(e) => {
                tracing::debug!("Rejected move {}{}: {}", mv.from, mv.to, e);
                None
            }
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.position.is_checkmate() {
            // The side to move is mated
            Some(Outcome::Checkmate {
                winner: self.turn().opposite(),
            })
        } else if self.position.is_stalemate() {
            Some(Outcome::Stalemate)
        } else if self.position.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            Some(Outcome::FiftyMoveRule)
        } else if self.repetitions() >= 3 {
            Some(Outcome::ThreefoldRepetition)
        } else {
            None
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn is_draw(&self) -> bool {
        self.outcome().is_some_and(Outcome::is_draw)
    }

    /// Legal moves in UCI notation
    pub fn legal_moves(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| UciMove::from_move(m.clone(), CastlingMode::Standard).to_string())
            .collect()
    }

    /// How many times the current position has occurred
    fn repetitions(&self) -> u32 {
        self.seen.get(&self.position_key()).copied().unwrap_or(0)
    }

    fn record_position(&mut self) {
        *self.seen.entry(self.position_key()).or_insert(0) += 1;
    }

    /// Placement, side to move, castling rights and en passant square
    fn position_key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn promotion_for(
        &self,
        from: Square,
        to: Square,
        requested: Option<PromotionPiece>,
    ) -> Option<PromotionPiece> {
        let is_pawn = self
            .position
            .board()
            .piece_at(from)
            .is_some_and(|piece| piece.role == Role::Pawn);
        let last_rank = matches!(to.rank(), Rank::First | Rank::Eighth);

        if is_pawn && last_rank {
            Some(requested.unwrap_or(PromotionPiece::Queen))
        } else {
            None
        }
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_square(square: &str) -> Result<Square, ChessError> {
    square
        .parse()
        .map_err(|_| ChessError::InvalidSquare(square.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut ChessGame, color: Color, from: &str, to: &str) -> PlayedMove {
        game.make_move(&ChessMove::new(color, from, to)).unwrap()
    }

    #[test]
    fn test_starting_position() {
        let game = ChessGame::new();
        assert_eq!(
            game.fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(game.turn(), Color::White);
        assert!(!game.is_game_over());
        assert_eq!(game.legal_moves().len(), 20);
    }

    #[test]
    fn test_make_move_updates_fen_and_turn() {
        let mut game = ChessGame::new();
        let played = play(&mut game, Color::White, "e2", "e4");
        assert_eq!(played.san, "e4");
        assert_eq!(game.turn(), Color::Black);
        assert!(game.fen().starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_illegal_move_leaves_position_untouched() {
        let mut game = ChessGame::new();
        let before = game.fen();
        let result = game.make_move(&ChessMove::new(Color::White, "e2", "e5"));
        assert!(matches!(result, Err(ChessError::IllegalMove(_))));
        assert_eq!(game.fen(), before);
        assert!(game.try_move(&ChessMove::new(Color::White, "e2", "e5")).is_none());
    }

    #[test]
    fn test_wrong_color_rejected() {
        let mut game = ChessGame::new();
        let result = game.make_move(&ChessMove::new(Color::Black, "e7", "e5"));
        assert!(matches!(result, Err(ChessError::NotYourTurn(Color::White))));
    }

    #[test]
    fn test_invalid_square_rejected() {
        let mut game = ChessGame::new();
        let result = game.make_move(&ChessMove::new(Color::White, "z9", "e4"));
        assert!(matches!(result, Err(ChessError::InvalidSquare(_))));
    }

    #[test]
    fn test_invalid_fen() {
        assert!(matches!(
            ChessGame::from_fen("not a fen"),
            Err(ChessError::InvalidFen(_))
        ));
    }

    #[test]
    fn test_fools_mate() {
        let mut game = ChessGame::new();
        play(&mut game, Color::White, "f2", "f3");
        play(&mut game, Color::Black, "e7", "e5");
        play(&mut game, Color::White, "g2", "g4");
        let mate = play(&mut game, Color::Black, "d8", "h4");

        assert_eq!(mate.san, "Qh4#");
        assert_eq!(
            game.outcome(),
            Some(Outcome::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(game.outcome().unwrap().to_string(), "Checkmate! black wins!");
        assert!(!game.is_draw());
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let mut game = ChessGame::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        let result = game.make_move(&ChessMove::new(Color::White, "e1", "e2"));
        assert!(matches!(result, Err(ChessError::GameOver)));
    }

    #[test]
    fn test_stalemate() {
        let game = ChessGame::from_fen("8/8/8/8/8/6q1/5k2/7K w - - 0 1").unwrap();
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
        assert!(game.is_draw());
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_insufficient_material() {
        let game = ChessGame::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game.outcome(), Some(Outcome::InsufficientMaterial));
    }

    #[test]
    fn test_fifty_move_rule() {
        let mut game = ChessGame::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 99 80").unwrap();
        assert!(!game.is_game_over());
        play(&mut game, Color::White, "a1", "a2");
        assert_eq!(game.outcome(), Some(Outcome::FiftyMoveRule));
    }

    #[test]
    fn test_threefold_repetition() {
        let mut game = ChessGame::new();
        for _ in 0..2 {
            play(&mut game, Color::White, "g1", "f3");
            play(&mut game, Color::Black, "g8", "f6");
            play(&mut game, Color::White, "f3", "g1");
            assert!(!game.is_game_over());
            play(&mut game, Color::Black, "f6", "g8");
        }
        assert_eq!(game.outcome(), Some(Outcome::ThreefoldRepetition));
        assert_eq!(game.outcome().unwrap().to_string(), "Draw");
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut game = ChessGame::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let played = play(&mut game, Color::White, "a7", "a8");
        assert_eq!(played.promotion, Some(PromotionPiece::Queen));
        assert_eq!(played.san, "a8=Q+");
    }

    #[test]
    fn test_underpromotion() {
        let mut game = ChessGame::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let played = game
            .make_move(
                &ChessMove::new(Color::White, "a7", "a8").with_promotion(PromotionPiece::Knight),
            )
            .unwrap();
        assert_eq!(played.san, "a8=N");
    }

    #[test]
    fn test_promotion_ignored_for_ordinary_moves() {
        let mut game = ChessGame::new();
        let played = game
            .make_move(
                &ChessMove::new(Color::White, "e2", "e4").with_promotion(PromotionPiece::Queen),
            )
            .unwrap();
        assert_eq!(played.promotion, None);
        assert_eq!(played.to_chess_move().san.as_deref(), Some("e4"));
    }

    #[test]
    fn test_castling_by_king_squares() {
        let mut game =
            ChessGame::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let played = play(&mut game, Color::White, "e1", "g1");
        assert_eq!(played.san, "O-O");
    }
}
