use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the board. Serialized as `w` / `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Lowercase name, also used as board orientation
    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl From<shakmaty::Color> for Color {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionPiece {
    #[serde(rename = "q")]
    Queen,
    #[serde(rename = "r")]
    Rook,
    #[serde(rename = "b")]
    Bishop,
    #[serde(rename = "n")]
    Knight,
}

impl PromotionPiece {
    pub fn role(self) -> shakmaty::Role {
        match self {
            PromotionPiece::Queen => shakmaty::Role::Queen,
            PromotionPiece::Rook => shakmaty::Role::Rook,
            PromotionPiece::Bishop => shakmaty::Role::Bishop,
            PromotionPiece::Knight => shakmaty::Role::Knight,
        }
    }

    pub fn from_role(role: shakmaty::Role) -> Option<Self> {
        match role {
            shakmaty::Role::Queen => Some(PromotionPiece::Queen),
            shakmaty::Role::Rook => Some(PromotionPiece::Rook),
            shakmaty::Role::Bishop => Some(PromotionPiece::Bishop),
            shakmaty::Role::Knight => Some(PromotionPiece::Knight),
            _ => None,
        }
    }
}

/// A move as exchanged between clients through the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessMove {
    pub color: Color,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
    /// Filled in by the mover's rules library, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
}

impl ChessMove {
    pub fn new(color: Color, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            color,
            from: from.into(),
            to: to.into(),
            promotion: None,
            san: None,
        }
    }

    pub fn with_promotion(mut self, piece: PromotionPiece) -> Self {
        self.promotion = Some(piece);
        self
    }
}

/// One line of the move log shown next to the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLogEntry {
    pub color: Color,
    pub from: String,
    pub to: String,
}

impl From<&ChessMove> for MoveLogEntry {
    fn from(mv: &ChessMove) -> Self {
        Self {
            color: mv.color,
            from: mv.from.clone(),
            to: mv.to.clone(),
        }
    }
}

impl fmt::Display for MoveLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.color {
            Color::White => "White",
            Color::Black => "Black",
        };
        write!(f, "{}: {} {}", side, self.from, self.to)
    }
}
